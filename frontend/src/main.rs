use shared::Session;
use yew::prelude::*;
use yew_router::prelude::*;

mod components;
mod hooks;
mod routes;
mod services;

use components::nav::NavBar;
use routes::{switch, Route};
use services::session::{SessionCtx, SessionStore};

/// Root shell: loads the stored session once at mount, owns it for the rest
/// of the page's life, and hands it to every view through [`SessionCtx`].
/// Views never read or write browser storage themselves.
#[function_component(App)]
fn app() -> Html {
    let session = use_state(SessionStore::load);

    let on_login = {
        let session = session.clone();
        Callback::from(move |new_session: Session| {
            SessionStore::store(&new_session);
            session.set(Some(new_session));
        })
    };

    let on_logout = {
        let session = session.clone();
        Callback::from(move |()| {
            SessionStore::clear();
            session.set(None);
        })
    };

    let ctx = SessionCtx {
        session: (*session).clone(),
        on_login,
        on_logout,
    };

    html! {
        <BrowserRouter>
            <ContextProvider<SessionCtx> context={ctx}>
                <NavBar />
                <main class="app-content">
                    <Switch<Route> render={switch} />
                </main>
                <footer class="app-footer">
                    <p>{"Hospital Management System"}</p>
                </footer>
            </ContextProvider<SessionCtx>>
        </BrowserRouter>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
