use gloo::timers::future::TimeoutFuture;
use shared::{form_error_text, LoginRequest, Session};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::hooks::use_mounted;
use crate::routes::Route;
use crate::services::api::ApiClient;
use crate::services::logging::Logger;
use crate::services::session::SessionCtx;

const REDIRECT_DELAY_MS: u32 = 2_500;

#[function_component(DoctorLogin)]
pub fn doctor_login() -> Html {
    let username = use_state(String::new);
    let password = use_state(String::new);
    let show_password = use_state(|| false);
    let is_submitting = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);
    let welcome_message = use_state(|| Option::<String>::None);
    let alive = use_mounted();
    let navigator = use_navigator().expect("navigator not available");
    let ctx = use_context::<SessionCtx>().expect("session context not mounted");
    let api = ApiClient::new();

    let bind = |field: &UseStateHandle<String>| {
        let field = field.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            field.set(input.value());
        })
    };

    let toggle_password = {
        let show_password = show_password.clone();
        Callback::from(move |_: MouseEvent| show_password.set(!*show_password))
    };

    let on_submit = {
        let username = username.clone();
        let password = password.clone();
        let is_submitting = is_submitting.clone();
        let error_message = error_message.clone();
        let welcome_message = welcome_message.clone();
        let alive = alive.clone();
        let navigator = navigator.clone();
        let on_login = ctx.on_login.clone();
        let api = api.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let request = LoginRequest {
                username: (*username).trim().to_string(),
                password: (*password).clone(),
            };

            is_submitting.set(true);
            error_message.set(None);

            let is_submitting = is_submitting.clone();
            let error_message = error_message.clone();
            let welcome_message = welcome_message.clone();
            let alive = alive.clone();
            let navigator = navigator.clone();
            let on_login = on_login.clone();
            let api = api.clone();

            spawn_local(async move {
                match api.login_doctor(&request).await {
                    Ok(response) => {
                        let session = Session::doctor(request.username.clone(), response.doctor_id);
                        on_login.emit(session);
                        welcome_message
                            .set(Some(format!("Welcome back, Dr. {}!", request.username)));
                        TimeoutFuture::new(REDIRECT_DELAY_MS).await;
                        if alive.get() {
                            navigator.push(&Route::DoctorDashboard);
                        }
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "doctor-login",
                            &format!("login failed: {}", e),
                        );
                        is_submitting.set(false);
                        error_message.set(Some(form_error_text(&e)));
                    }
                }
            });
        })
    };

    html! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>{"Doctor Login"}</h2>
                <form onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="doctor-login-username">{"Username"}</label>
                        <input
                            id="doctor-login-username"
                            type="text"
                            placeholder="Enter username"
                            value={(*username).clone()}
                            onchange={bind(&username)}
                            disabled={*is_submitting}
                            required=true
                        />
                    </div>
                    <div class="form-group">
                        <label for="doctor-login-password">{"Password"}</label>
                        <div class="password-field">
                            <input
                                id="doctor-login-password"
                                type={if *show_password { "text" } else { "password" }}
                                placeholder="Enter password"
                                value={(*password).clone()}
                                onchange={bind(&password)}
                                disabled={*is_submitting}
                                required=true
                            />
                            <button
                                type="button"
                                class="password-toggle"
                                onclick={toggle_password}
                            >
                                {if *show_password { "Hide" } else { "Show" }}
                            </button>
                        </div>
                    </div>

                    {if let Some(error) = (*error_message).clone() {
                        html! { <p class="form-error">{error}</p> }
                    } else {
                        html! {}
                    }}
                    {if let Some(welcome) = (*welcome_message).clone() {
                        html! { <p class="form-success">{welcome}</p> }
                    } else {
                        html! {}
                    }}

                    <button type="submit" disabled={*is_submitting}>
                        {if *is_submitting { "Logging in..." } else { "Login" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
