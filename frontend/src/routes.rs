use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::doctor_dashboard::DoctorDashboard;
use crate::components::doctor_login::DoctorLogin;
use crate::components::guard::RequireSession;
use crate::components::landing::Landing;
use crate::components::patient_dashboard::PatientDashboard;
use crate::components::patient_login::PatientLogin;
use crate::components::signup::Signup;

#[derive(Clone, Routable, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Landing,
    #[at("/signup")]
    Signup,
    #[at("/login")]
    PatientLogin,
    #[at("/doctor/login")]
    DoctorLogin,
    #[at("/patient/dashboard")]
    PatientDashboard,
    #[at("/doctor/dashboard")]
    DoctorDashboard,
    #[not_found]
    #[at("/404")]
    NotFound,
}

pub fn switch(route: Route) -> Html {
    match route {
        Route::Landing => html! { <Landing /> },
        Route::Signup => html! { <Signup /> },
        Route::PatientLogin => html! { <PatientLogin /> },
        Route::DoctorLogin => html! { <DoctorLogin /> },
        Route::PatientDashboard => html! {
            <RequireSession>
                <PatientDashboard />
            </RequireSession>
        },
        Route::DoctorDashboard => html! {
            <RequireSession>
                <DoctorDashboard />
            </RequireSession>
        },
        Route::NotFound => html! { <Redirect<Route> to={Route::Landing} /> },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_map_to_expected_paths() {
        assert_eq!(Route::Landing.to_path(), "/");
        assert_eq!(Route::Signup.to_path(), "/signup");
        assert_eq!(Route::PatientLogin.to_path(), "/login");
        assert_eq!(Route::DoctorLogin.to_path(), "/doctor/login");
        assert_eq!(Route::PatientDashboard.to_path(), "/patient/dashboard");
        assert_eq!(Route::DoctorDashboard.to_path(), "/doctor/dashboard");
    }

    #[test]
    fn unknown_paths_fall_back_to_not_found() {
        assert_eq!(Route::recognize("/admin"), Some(Route::NotFound));
        assert_eq!(Route::recognize("/login"), Some(Route::PatientLogin));
    }
}
