pub mod doctor_dashboard;
pub mod doctor_login;
pub mod guard;
pub mod landing;
pub mod nav;
pub mod patient_dashboard;
pub mod patient_login;
pub mod payment_modal;
pub mod signup;
