use shared::Role;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;
use crate::services::session::SessionCtx;

#[function_component(NavBar)]
pub fn nav_bar() -> Html {
    let ctx = use_context::<SessionCtx>().expect("session context not mounted");
    let navigator = use_navigator().expect("navigator not available");

    let on_logout = {
        let on_logout = ctx.on_logout.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_logout.emit(());
            navigator.push(&Route::PatientLogin);
        })
    };

    html! {
        <nav class="top-nav">
            <h1 class="top-nav-brand">{"Hospital Management System"}</h1>
            <div class="top-nav-links">
                {if let Some(session) = &ctx.session {
                    html! {
                        <>
                            <Link<Route> to={Route::Landing}>{"Home"}</Link<Route>>
                            <a href="/login" onclick={on_logout}>{"Logout"}</a>
                            {match session.role {
                                Role::Doctor => html! {
                                    <Link<Route> to={Route::DoctorDashboard}>{"Doctor Dashboard"}</Link<Route>>
                                },
                                Role::Patient => html! {
                                    <Link<Route> to={Route::PatientDashboard}>{"Patient Dashboard"}</Link<Route>>
                                },
                            }}
                        </>
                    }
                } else {
                    html! {
                        <>
                            <Link<Route> to={Route::PatientLogin}>{"Login"}</Link<Route>>
                            <Link<Route> to={Route::Signup}>{"Signup"}</Link<Route>>
                        </>
                    }
                }}
            </div>
        </nav>
    }
}
