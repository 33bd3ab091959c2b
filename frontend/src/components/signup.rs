use gloo::timers::future::TimeoutFuture;
use shared::{form_error_text, SignupPatient, SignupRequest, SignupUser};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::hooks::use_mounted;
use crate::routes::Route;
use crate::services::api::ApiClient;
use crate::services::logging::Logger;

/// How long the success message stays up before moving to the login page.
const REDIRECT_DELAY_MS: u32 = 2_500;

#[function_component(Signup)]
pub fn signup() -> Html {
    let username = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let birth_date = use_state(String::new);
    let phone_number = use_state(String::new);
    let is_submitting = use_state(|| false);
    let error_message = use_state(|| Option::<String>::None);
    let success_message = use_state(|| Option::<String>::None);
    let alive = use_mounted();
    let navigator = use_navigator().expect("navigator not available");
    let api = ApiClient::new();

    let bind = |field: &UseStateHandle<String>| {
        let field = field.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            field.set(input.value());
        })
    };

    let on_submit = {
        let username = username.clone();
        let email = email.clone();
        let password = password.clone();
        let birth_date = birth_date.clone();
        let phone_number = phone_number.clone();
        let is_submitting = is_submitting.clone();
        let error_message = error_message.clone();
        let success_message = success_message.clone();
        let alive = alive.clone();
        let navigator = navigator.clone();
        let api = api.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let request = SignupRequest {
                user: SignupUser {
                    username: (*username).trim().to_string(),
                    email: (*email).trim().to_string(),
                    password: (*password).clone(),
                },
                patient: SignupPatient {
                    birth_date: (*birth_date).clone(),
                    phone_number: (*phone_number).trim().to_string(),
                },
            };

            is_submitting.set(true);
            error_message.set(None);

            let is_submitting = is_submitting.clone();
            let error_message = error_message.clone();
            let success_message = success_message.clone();
            let alive = alive.clone();
            let navigator = navigator.clone();
            let api = api.clone();

            spawn_local(async move {
                match api.signup_patient(&request).await {
                    Ok(_) => {
                        // Signup never logs the patient in; they go through
                        // the login form like everyone else.
                        success_message
                            .set(Some("Signup successful! Redirecting to login...".to_string()));
                        TimeoutFuture::new(REDIRECT_DELAY_MS).await;
                        if alive.get() {
                            navigator.push(&Route::PatientLogin);
                        }
                    }
                    Err(e) => {
                        Logger::error_with_component("signup", &format!("signup failed: {}", e));
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
                <h2>{"Patient Signup"}</h2>
                <form onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="signup-username">{"Username"}</label>
                        <input
                            id="signup-username"
                            type="text"
                            placeholder="Enter username"
                            value={(*username).clone()}
                            onchange={bind(&username)}
                            disabled={*is_submitting}
                            required=true
                        />
                    </div>
                    <div class="form-group">
                        <label for="signup-email">{"Email"}</label>
                        <input
                            id="signup-email"
                            type="email"
                            placeholder="Enter email"
                            value={(*email).clone()}
                            onchange={bind(&email)}
                            disabled={*is_submitting}
                            required=true
                        />
                    </div>
                    <div class="form-group">
                        <label for="signup-password">{"Password"}</label>
                        <input
                            id="signup-password"
                            type="password"
                            placeholder="Enter password"
                            value={(*password).clone()}
                            onchange={bind(&password)}
                            disabled={*is_submitting}
                            required=true
                        />
                    </div>
                    <div class="form-group">
                        <label for="signup-birth-date">{"Birth Date"}</label>
                        <input
                            id="signup-birth-date"
                            type="date"
                            value={(*birth_date).clone()}
                            onchange={bind(&birth_date)}
                            disabled={*is_submitting}
                            required=true
                        />
                    </div>
                    <div class="form-group">
                        <label for="signup-phone">{"Phone Number"}</label>
                        <input
                            id="signup-phone"
                            type="tel"
                            placeholder="Enter phone number"
                            value={(*phone_number).clone()}
                            onchange={bind(&phone_number)}
                            disabled={*is_submitting}
                            required=true
                        />
                    </div>

                    {if let Some(error) = (*error_message).clone() {
                        html! { <p class="form-error">{error}</p> }
                    } else {
                        html! {}
                    }}
                    {if let Some(success) = (*success_message).clone() {
                        html! { <p class="form-success">{success}</p> }
                    } else {
                        html! {}
                    }}

                    <button type="submit" disabled={*is_submitting}>
                        {if *is_submitting { "Signing up..." } else { "Signup" }}
                    </button>
                </form>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::SessionStore;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[function_component(Harness)]
    fn harness() -> Html {
        html! {
            <yew_router::BrowserRouter>
                <Signup />
            </yew_router::BrowserRouter>
        }
    }

    // Signing up never logs the patient in: the view has no path that
    // touches the session store, so storage stays empty from mount through
    // the redirect to the login form.
    #[wasm_bindgen_test]
    async fn signup_never_writes_a_session() {
        SessionStore::clear();
        let document = gloo::utils::document();
        let root = document.create_element("div").unwrap();
        document.body().unwrap().append_child(&root).unwrap();
        yew::Renderer::<Harness>::with_root(root).render();
        TimeoutFuture::new(50).await;
        assert!(!SessionStore::role_present());
        assert_eq!(SessionStore::load(), None);
    }
}
