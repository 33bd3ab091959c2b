use serde::{Deserialize, Serialize};
use std::fmt;

pub mod booking;

pub use booking::{
    booking_failure_message, AppointmentDraft, BookingCommand, BookingEvent, BookingFlow,
    BookingState, BOOKING_RETRY_MESSAGE, CONFLICT_GUIDANCE, CONFLICT_MARKER,
    MISSING_FIELDS_MESSAGE, MISSING_PHONE_MESSAGE, PAYMENT_RETRY_MESSAGE,
    PAYMENT_WITHOUT_BOOKING_MESSAGE,
};

/// Fixed booking fee charged before an appointment request is submitted.
pub const BOOKING_FEE: u32 = 500;

/// Description line sent with the payment initiation request.
pub const BOOKING_FEE_DESCRIPTION: &str = "Hospital appointment booking fee";

/// Fallback shown when the backend gives no usable error text.
pub const GENERIC_ERROR: &str = "Something went wrong.";

/// Browser storage keys. Values are string-typed with no schema versioning;
/// a value written once is trusted until explicitly cleared.
pub mod keys {
    pub const ROLE: &str = "role";
    pub const USERNAME: &str = "username";
    pub const PATIENT_ID: &str = "patientId";
    pub const DOCTOR_ID: &str = "doctorId";
    /// Written by older builds alongside `username`; removed on logout,
    /// never read.
    pub const LEGACY_PATIENT_NAME: &str = "patientName";
    pub const LEGACY_DOCTOR_NAME: &str = "doctorName";
}

/// Errors surfaced by backend calls, matching how each call site reports
/// them: connection problems, non-2xx responses, unparsable bodies, and
/// preconditions that fail before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response carrying the backend's `{"error": ...}` envelope.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// Non-2xx response without the envelope. The raw body is kept because
    /// conflict detection matches a substring of it.
    #[error("Request failed with status {status}")]
    HttpRaw { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    /// A stored identifier needed for the call is missing.
    #[error("Your login session is missing or incomplete. Please log in again.")]
    MissingSession,
}

/// Error text for login/signup forms: backend-provided `error` strings are
/// shown as-is, everything else collapses to a generic line.
pub fn form_error_text(error: &ApiError) -> String {
    match error {
        ApiError::Http { message, .. } => message.clone(),
        _ => GENERIC_ERROR.to_string(),
    }
}

/// Text a failed creation call is matched against for conflict wording.
pub fn creation_failure_text(error: &ApiError) -> String {
    match error {
        ApiError::Http { message, .. } => message.clone(),
        ApiError::HttpRaw { body, .. } => body.clone(),
        other => other.to_string(),
    }
}

/// Client-held role distinguishing patient and doctor sessions. The stored
/// representation is the bare strings `"patient"` and `"doctor"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }

    /// Parse a stored role string. Anything other than the two known values
    /// yields `None`; the route guard still treats such a value as present.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged-in user as the client knows it: the role, the display name, and
/// the backend-assigned numeric id. Created from a login response, destroyed
/// on logout, never expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub username: String,
    pub user_id: i64,
}

impl Session {
    pub fn patient(username: impl Into<String>, patient_id: i64) -> Self {
        Self {
            role: Role::Patient,
            username: username.into(),
            user_id: patient_id,
        }
    }

    pub fn doctor(username: impl Into<String>, doctor_id: i64) -> Self {
        Self {
            role: Role::Doctor,
            username: username.into(),
            user_id: doctor_id,
        }
    }

    /// Storage key carrying this session's numeric id.
    pub fn id_key(&self) -> &'static str {
        match self.role {
            Role::Patient => keys::PATIENT_ID,
            Role::Doctor => keys::DOCTOR_ID,
        }
    }
}

/// Nested user object on doctor and patient payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
}

/// A doctor available for booking. Read-only on the client; owned by the
/// backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub user: UserInfo,
    pub specialty: String,
}

impl Doctor {
    /// Label shown in the booking form's doctor selector.
    pub fn display_name(&self) -> String {
        format!("Dr. {} - {}", self.user.username, self.specialty)
    }
}

/// Patient record behind `GET /api/patient/{id}/`. The phone number seeds
/// the payment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: i64,
    pub user: UserInfo,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub phone_number: String,
}

/// An appointment as the list endpoints return it. The client's list is a
/// cache: re-fetched wholesale or patched only after a confirmed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: i64,
    pub doctor_name: String,
    pub patient_name: String,
    pub date: String,
    pub reason: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub prescription: Option<String>,
}

impl Appointment {
    /// False for a freshly created entry whose id the backend omitted; it
    /// stays 0 until the next full fetch, so there is nothing a delete
    /// request could address yet.
    pub fn has_server_id(&self) -> bool {
        self.id != 0
    }
}

/// Drop a deleted entry from a local list only once the backend has
/// confirmed the delete. `None` means the call failed and the list must
/// stay exactly as it was.
pub fn list_after_delete<T: Clone>(
    items: &[T],
    id: i64,
    id_of: impl Fn(&T) -> i64,
    outcome: &Result<(), ApiError>,
) -> Option<Vec<T>> {
    outcome.as_ref().ok()?;
    Some(
        items
            .iter()
            .filter(|item| id_of(item) != id)
            .cloned()
            .collect(),
    )
}

/// Shown when an update saved but the follow-up list fetch failed.
pub const STALE_AFTER_UPDATE_MESSAGE: &str =
    "Details were saved, but the refreshed list could not be loaded. Please reload the page.";

/// Reconcile the local appointment list after an update. A successful
/// re-fetch replaces the list wholesale; a failed one keeps the old list up
/// together with a message saying it is behind the server.
pub fn appointments_after_update(
    current: &[Appointment],
    refreshed: Result<Vec<Appointment>, ApiError>,
) -> (Vec<Appointment>, Option<String>) {
    match refreshed {
        Ok(list) => (list, None),
        Err(_) => (current.to_vec(), Some(STALE_AFTER_UPDATE_MESSAGE.to_string())),
    }
}

/// A pending notification for a patient. Extra backend fields (`is_read`,
/// `date_created`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupPatient {
    pub birth_date: String,
    pub phone_number: String,
}

/// Nested payload shape the signup endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub user: SignupUser,
    pub patient: SignupPatient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful patient login. Older backend builds return only `message` and
/// `patient_id`; the name fields fall back to what the form submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientLoginResponse {
    #[serde(default)]
    pub message: String,
    pub patient_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorLoginResponse {
    #[serde(default)]
    pub message: String,
    pub doctor_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: i64,
    pub patient_id: i64,
    pub date: String,
    pub reason: String,
}

/// Echo of a created appointment. The backend may omit the new id, in which
/// case it stays 0 until the next full list fetch fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAppointmentResponse {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub is_approved: bool,
}

/// Diagnosis and prescription a doctor attaches to an approved appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub diagnosis: String,
    pub prescription: String,
}

/// Mobile-payment initiation payload for `POST /mpesa/api/stk/`. The amount
/// is fixed; the reference is generated per attempt so the gateway can tell
/// retries apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StkPushRequest {
    pub phone_number: String,
    pub amount: u32,
    pub reference: String,
    pub description: String,
}

impl StkPushRequest {
    /// Payment request for the standard booking fee.
    pub fn booking_fee(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            amount: BOOKING_FEE,
            reference: uuid::Uuid::new_v4().to_string(),
            description: BOOKING_FEE_DESCRIPTION.to_string(),
        }
    }
}

/// Generic `{"message": ...}` success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

/// Generic `{"error": ...}` failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Render a backend datetime string for display. Accepts RFC 3339 and the
/// shapes the booking form's `datetime-local` input produces; anything else
/// passes through unchanged.
pub fn display_datetime(raw: &str) -> String {
    const OUT: &str = "%b %-d, %Y %H:%M";
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format(OUT).to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format(OUT).to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parses_known_strings_only() {
        assert_eq!(Role::parse("patient"), Some(Role::Patient));
        assert_eq!(Role::parse("doctor"), Some(Role::Doctor));
        assert_eq!(Role::parse("Doctor"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn role_round_trips_through_storage_string() {
        for role in [Role::Patient, Role::Doctor] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn session_uses_role_specific_id_key() {
        let patient = Session::patient("amina", 12);
        assert_eq!(patient.id_key(), keys::PATIENT_ID);
        assert_eq!(patient.user_id, 12);

        let doctor = Session::doctor("otieno", 4);
        assert_eq!(doctor.id_key(), keys::DOCTOR_ID);
        assert_eq!(doctor.role, Role::Doctor);
    }

    #[test]
    fn signup_request_serializes_nested_shape() {
        let request = SignupRequest {
            user: SignupUser {
                username: "amina".into(),
                email: "amina@example.com".into(),
                password: "hunter2".into(),
            },
            patient: SignupPatient {
                birth_date: "1990-04-02".into(),
                phone_number: "0712345678".into(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "user": {
                    "username": "amina",
                    "email": "amina@example.com",
                    "password": "hunter2"
                },
                "patient": {
                    "birth_date": "1990-04-02",
                    "phone_number": "0712345678"
                }
            })
        );
    }

    #[test]
    fn appointment_tolerates_missing_optional_fields() {
        let appointment: Appointment = serde_json::from_value(json!({
            "doctor_name": "otieno",
            "patient_name": "amina",
            "date": "2025-03-10T14:30:00Z",
            "reason": "Checkup"
        }))
        .unwrap();
        assert_eq!(appointment.id, 0);
        assert!(!appointment.is_approved);
        assert_eq!(appointment.diagnosis, None);
        assert_eq!(appointment.prescription, None);
    }

    #[test]
    fn appointment_reads_doctor_details_when_present() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": 7,
            "doctor_name": "otieno",
            "patient_name": "amina",
            "date": "2025-03-10T14:30:00Z",
            "reason": "Checkup",
            "is_approved": true,
            "diagnosis": "Seasonal flu",
            "prescription": "Rest and fluids"
        }))
        .unwrap();
        assert_eq!(appointment.id, 7);
        assert!(appointment.is_approved);
        assert_eq!(appointment.diagnosis.as_deref(), Some("Seasonal flu"));
    }

    #[test]
    fn notification_ignores_extra_backend_fields() {
        let notification: Notification = serde_json::from_value(json!({
            "id": 3,
            "patient": 12,
            "message": "Your appointment with Dr. otieno has been approved.",
            "date_created": "2025-03-09T08:00:00Z",
            "is_read": false
        }))
        .unwrap();
        assert_eq!(notification.id, 3);
        assert!(notification.message.contains("approved"));
    }

    #[test]
    fn patient_login_response_parses_minimal_body() {
        let response: PatientLoginResponse = serde_json::from_value(json!({
            "message": "Patient login successful",
            "patient_id": 12
        }))
        .unwrap();
        assert_eq!(response.patient_id, 12);
        assert_eq!(response.username, None);
        assert_eq!(response.patient_name, None);
    }

    #[test]
    fn create_response_defaults_id_to_zero() {
        let response: CreateAppointmentResponse = serde_json::from_value(json!({
            "date": "2025-03-10T14:30",
            "reason": "Checkup",
            "is_approved": false
        }))
        .unwrap();
        assert_eq!(response.id, 0);
    }

    #[test]
    fn booking_fee_request_carries_fixed_amount_and_fresh_reference() {
        let request = StkPushRequest::booking_fee("0712345678");
        assert_eq!(request.amount, BOOKING_FEE);
        assert_eq!(request.description, BOOKING_FEE_DESCRIPTION);
        assert_eq!(request.phone_number, "0712345678");
        assert!(uuid::Uuid::parse_str(&request.reference).is_ok());

        let again = StkPushRequest::booking_fee("0712345678");
        assert_ne!(request.reference, again.reference);
    }

    #[test]
    fn stk_request_serializes_expected_field_names() {
        let value = serde_json::to_value(StkPushRequest::booking_fee("0712345678")).unwrap();
        let object = value.as_object().unwrap();
        for key in ["phone_number", "amount", "reference", "description"] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 4);
    }

    #[test]
    fn form_error_prefers_backend_error_text() {
        let http = ApiError::Http {
            status: 401,
            message: "Invalid credentials".into(),
        };
        assert_eq!(form_error_text(&http), "Invalid credentials");
        assert_eq!(
            form_error_text(&ApiError::Network("connection refused".into())),
            GENERIC_ERROR
        );
        assert_eq!(
            form_error_text(&ApiError::Parse("unexpected token".into())),
            GENERIC_ERROR
        );
    }

    #[test]
    fn form_error_hides_unstructured_bodies() {
        let raw = ApiError::HttpRaw {
            status: 400,
            body: r#"{"user":{"username":["A user with that username already exists."]}}"#.into(),
        };
        assert_eq!(form_error_text(&raw), GENERIC_ERROR);
    }

    #[test]
    fn creation_failure_text_exposes_raw_body_for_matching() {
        let raw = ApiError::HttpRaw {
            status: 400,
            body: r#"{"non_field_errors":["Doctor has an appointment within 30 minutes."]}"#
                .into(),
        };
        assert!(creation_failure_text(&raw).contains("within 30 minutes"));

        let http = ApiError::Http {
            status: 400,
            message: "slot taken".into(),
        };
        assert_eq!(creation_failure_text(&http), "slot taken");
    }

    fn appointment(id: i64, reason: &str) -> Appointment {
        Appointment {
            id,
            doctor_name: "otieno".into(),
            patient_name: "amina".into(),
            date: "2025-03-10T14:30".into(),
            reason: reason.into(),
            is_approved: false,
            diagnosis: None,
            prescription: None,
        }
    }

    #[test]
    fn confirmed_delete_removes_exactly_the_deleted_entry() {
        let list = vec![appointment(7, "Checkup"), appointment(9, "Follow-up")];
        let remaining = list_after_delete(&list, 7, |a| a.id, &Ok(())).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 9);
    }

    #[test]
    fn failed_delete_leaves_the_list_untouched() {
        let list = vec![appointment(7, "Checkup"), appointment(9, "Follow-up")];
        let outcome = Err(ApiError::Network("connection refused".into()));
        assert_eq!(list_after_delete(&list, 7, |a| a.id, &outcome), None);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn confirmed_dismiss_removes_the_notification() {
        let list = vec![
            Notification {
                id: 3,
                message: "Approved".into(),
            },
            Notification {
                id: 5,
                message: "Reminder".into(),
            },
        ];
        let remaining = list_after_delete(&list, 5, |n| n.id, &Ok(())).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 3);

        let failed = Err(ApiError::Http {
            status: 404,
            message: "Not found".into(),
        });
        assert_eq!(list_after_delete(&list, 3, |n| n.id, &failed), None);
    }

    #[test]
    fn unsynced_appointment_has_no_server_id() {
        assert!(!appointment(0, "Checkup").has_server_id());
        assert!(appointment(7, "Checkup").has_server_id());
    }

    #[test]
    fn update_refetch_success_replaces_the_list() {
        let current = vec![appointment(7, "Checkup")];
        let refreshed = vec![appointment(7, "Checkup"), appointment(9, "Follow-up")];
        let (list, message) = appointments_after_update(&current, Ok(refreshed.clone()));
        assert_eq!(list, refreshed);
        assert_eq!(message, None);
    }

    #[test]
    fn update_refetch_failure_keeps_old_list_with_stale_notice() {
        let current = vec![appointment(7, "Checkup")];
        let failed = Err(ApiError::Network("connection refused".into()));
        let (list, message) = appointments_after_update(&current, failed);
        assert_eq!(list, current);
        assert_eq!(message.as_deref(), Some(STALE_AFTER_UPDATE_MESSAGE));
    }

    #[test]
    fn display_datetime_handles_known_shapes() {
        assert_eq!(display_datetime("2025-03-10T14:30"), "Mar 10, 2025 14:30");
        assert_eq!(
            display_datetime("2025-03-10T14:30:00"),
            "Mar 10, 2025 14:30"
        );
        assert_eq!(
            display_datetime("2025-03-10T14:30:00+03:00"),
            "Mar 10, 2025 14:30"
        );
    }

    #[test]
    fn display_datetime_passes_unknown_text_through() {
        assert_eq!(display_datetime("next tuesday"), "next tuesday");
        assert_eq!(display_datetime(""), "");
    }
}
