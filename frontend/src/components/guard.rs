use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;
use crate::services::session::SessionStore;

#[derive(Properties, PartialEq)]
pub struct RequireSessionProps {
    pub children: Html,
}

/// Gate for the dashboard routes. Any stored role string counts as logged
/// in; this only steers navigation, the backend decides what each request
/// may actually do.
#[function_component(RequireSession)]
pub fn require_session(props: &RequireSessionProps) -> Html {
    if SessionStore::role_present() {
        props.children.clone()
    } else {
        html! { <Redirect<Route> to={Route::Landing} /> }
    }
}
