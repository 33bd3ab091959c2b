use gloo::net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::{
    ApiError, ApiErrorBody, ApiMessage, Appointment, CreateAppointmentRequest,
    CreateAppointmentResponse, Doctor, DoctorLoginResponse, LoginRequest, Notification,
    PatientLoginResponse, PatientProfile, SignupRequest, StkPushRequest,
    UpdateAppointmentRequest,
};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Client for the hospital REST backend.
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with the default base URL
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }

    /// Register a new patient account
    pub async fn signup_patient(&self, request: &SignupRequest) -> Result<ApiMessage, ApiError> {
        let url = format!("{}/api/patient/signup/", self.base_url);
        match Request::post(&url)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
        {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Log in as a patient
    pub async fn login_patient(
        &self,
        request: &LoginRequest,
    ) -> Result<PatientLoginResponse, ApiError> {
        let url = format!("{}/api/patient/login/", self.base_url);
        match Request::post(&url)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
        {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Log in as a doctor
    pub async fn login_doctor(
        &self,
        request: &LoginRequest,
    ) -> Result<DoctorLoginResponse, ApiError> {
        let url = format!("{}/api/doctor/login/", self.base_url);
        match Request::post(&url)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
        {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Get the list of doctors available for booking
    pub async fn get_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        let url = format!("{}/api/doctors/", self.base_url);
        match Request::get(&url).send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Get a patient's profile, including the phone number used for payment
    pub async fn get_patient(&self, patient_id: i64) -> Result<PatientProfile, ApiError> {
        let url = format!("{}/api/patient/{}/", self.base_url, patient_id);
        match Request::get(&url).send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Get all appointments booked by a patient
    pub async fn get_patient_appointments(
        &self,
        patient_id: i64,
    ) -> Result<Vec<Appointment>, ApiError> {
        let url = format!("{}/api/patient-appointments/{}/", self.base_url, patient_id);
        match Request::get(&url).send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Get all appointments assigned to a doctor
    pub async fn get_doctor_appointments(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<Appointment>, ApiError> {
        let url = format!("{}/api/doctor-appointments/{}/", self.base_url, doctor_id);
        match Request::get(&url).send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Create an appointment after the booking fee has been paid
    pub async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> Result<CreateAppointmentResponse, ApiError> {
        let url = format!("{}/api/appointments/create/", self.base_url);
        match Request::post(&url)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
        {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Approve a pending appointment
    pub async fn approve_appointment(&self, appointment_id: i64) -> Result<ApiMessage, ApiError> {
        let url = format!(
            "{}/api/appointments/approve/{}/",
            self.base_url, appointment_id
        );
        match Request::post(&url).send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Attach a diagnosis and prescription to an appointment
    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        request: &UpdateAppointmentRequest,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/api/appointments/update/{}/",
            self.base_url, appointment_id
        );
        match Request::put(&url)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
        {
            Ok(response) => Self::read_ok(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Delete an appointment
    pub async fn delete_appointment(&self, appointment_id: i64) -> Result<(), ApiError> {
        let url = format!(
            "{}/api/appointments/delete/{}/",
            self.base_url, appointment_id
        );
        match Request::delete(&url).send().await {
            Ok(response) => Self::read_ok(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Get a patient's unread notifications
    pub async fn get_notifications(&self, patient_id: i64) -> Result<Vec<Notification>, ApiError> {
        let url = format!("{}/api/notifications/{}/", self.base_url, patient_id);
        match Request::get(&url).send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Dismiss a notification
    pub async fn delete_notification(&self, notification_id: i64) -> Result<(), ApiError> {
        let url = format!(
            "{}/api/notifications/delete/{}/",
            self.base_url, notification_id
        );
        match Request::delete(&url).send().await {
            Ok(response) => Self::read_ok(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    /// Start a mobile-money charge for the booking fee. Only success or
    /// failure matters to the UI; the gateway body is not inspected.
    pub async fn initiate_stk_push(&self, request: &StkPushRequest) -> Result<(), ApiError> {
        let url = format!("{}/mpesa/api/stk/", self.base_url);
        match Request::post(&url)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
        {
            Ok(response) => Self::read_ok(response).await,
            Err(e) => Err(ApiError::Network(e.to_string())),
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        if !response.ok() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn read_ok(response: Response) -> Result<(), ApiError> {
        if response.ok() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Failure bodies carrying the `{"error": ...}` envelope keep their text;
    /// anything else is preserved raw for conflict matching.
    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(envelope) => ApiError::Http {
                status,
                message: envelope.error,
            },
            Err(_) => ApiError::HttpRaw { status, body },
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
