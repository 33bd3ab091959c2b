use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;

#[function_component(Landing)]
pub fn landing() -> Html {
    let navigator = use_navigator().expect("navigator not available");

    let go = |route: Route| {
        let navigator = navigator.clone();
        Callback::from(move |_: MouseEvent| navigator.push(&route))
    };

    html! {
        <div class="landing">
            <div class="landing-overlay"></div>
            <div class="landing-content">
                <h1>{"Welcome to the Hospital Management System"}</h1>
                <p>{"Your health is our top priority. Choose your path to get started:"}</p>
                <div class="landing-buttons">
                    <button onclick={go(Route::Signup)}>{"Signup as Patient"}</button>
                    <button onclick={go(Route::PatientLogin)}>{"Login as Patient"}</button>
                    <button onclick={go(Route::DoctorLogin)}>{"Doctor Login"}</button>
                </div>
            </div>
        </div>
    }
}
