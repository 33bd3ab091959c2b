//! Booking-with-payment workflow for the patient dashboard.
//!
//! The payment call and the appointment-creation call are two independent
//! requests with no backend rollback. The flow below keeps the two ordered
//! (pay first, create second) and, when creation fails after a successful
//! payment, parks in [`BookingState::PaidUnbooked`] so retrying re-issues
//! only the creation request and never charges twice.

use crate::Doctor;

/// Shown when the booking form is submitted with an empty field.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields.";

/// Shown when payment is confirmed without a phone number.
pub const MISSING_PHONE_MESSAGE: &str = "Please enter your phone number.";

/// Shown when the payment request fails; the draft is kept for retry.
pub const PAYMENT_RETRY_MESSAGE: &str = "Payment could not be completed. Please try again.";

/// Generic creation-failure text when the backend gives no conflict hint.
pub const BOOKING_RETRY_MESSAGE: &str = "Could not book the appointment. Please try again.";

/// Substring of the backend's scheduling-conflict error. The backend owns the
/// rule; the client only recognizes its wording.
pub const CONFLICT_MARKER: &str = "within 30 minutes";

/// Four-point guidance shown verbatim on a scheduling conflict.
pub const CONFLICT_GUIDANCE: &str = "This doctor already has an appointment close to that time.\n\
1. Choose a time at least 30 minutes away from the doctor's other bookings.\n\
2. Or pick a different doctor for the same time.\n\
3. Your payment has been received and will cover the rebooked appointment.\n\
4. Contact the hospital front desk if you need help rescheduling.";

/// Shown when the user gives up after paying without a recorded booking.
pub const PAYMENT_WITHOUT_BOOKING_MESSAGE: &str = "Your payment was received but the appointment \
was not booked. Please contact the hospital before paying again.";

/// Map a creation-failure message from the backend to the text shown to the
/// patient. Conflict wording gets the full guidance, everything else a
/// generic retry line.
pub fn booking_failure_message(raw: &str) -> String {
    if raw.contains(CONFLICT_MARKER) {
        CONFLICT_GUIDANCE.to_string()
    } else {
        BOOKING_RETRY_MESSAGE.to_string()
    }
}

/// A validated appointment request held while payment is in progress.
/// Consumed to build the creation request once the payment succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub doctor_id: i64,
    pub doctor_name: String,
    pub specialty: String,
    pub date: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    /// Form visible, nothing in flight.
    Idle,
    /// Payment modal open, waiting for the patient to confirm or cancel.
    PaymentPending { draft: AppointmentDraft },
    /// A request is in flight: the payment when `paid` is false, the
    /// appointment creation once it is true.
    Submitting { draft: AppointmentDraft, paid: bool },
    /// Payment went through but creation failed. Retry from here re-issues
    /// the creation request only.
    PaidUnbooked { draft: AppointmentDraft },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingEvent {
    /// The booking form was submitted.
    SubmitForm {
        doctor: Option<Doctor>,
        date: String,
        reason: String,
    },
    /// The patient confirmed the payment modal with a phone number.
    ConfirmPayment { phone_number: String },
    /// The patient closed the payment modal before paying.
    CancelPayment,
    PaymentAccepted,
    PaymentFailed,
    BookingConfirmed,
    /// The creation request failed; `message` is the backend's error text.
    BookingFailed { message: String },
    /// The patient asked to resubmit an already-paid booking.
    RetryBooking,
    /// The patient gave up on an already-paid booking.
    AbandonBooking,
}

/// A network request the caller must issue after applying an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingCommand {
    InitiatePayment { phone_number: String },
    CreateAppointment { draft: AppointmentDraft },
}

/// The workflow state plus the message currently shown to the patient.
///
/// [`apply`](Self::apply) is the only way to move between states. Events
/// that make no sense in the current state are dropped, so a response from
/// an abandoned attempt cannot disturb a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFlow {
    state: BookingState,
    error: Option<String>,
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            state: BookingState::Idle,
            error: None,
        }
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a request is in flight and the modal controls should be
    /// disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self.state, BookingState::Submitting { .. })
    }

    /// True whenever the payment modal should be rendered.
    pub fn modal_open(&self) -> bool {
        !matches!(self.state, BookingState::Idle)
    }

    /// Advance the workflow. Returns the request to issue next, if any.
    pub fn apply(&mut self, event: BookingEvent) -> Option<BookingCommand> {
        let state = std::mem::replace(&mut self.state, BookingState::Idle);
        match (state, event) {
            (BookingState::Idle, BookingEvent::SubmitForm { doctor, date, reason }) => {
                let date = date.trim().to_string();
                let reason = reason.trim().to_string();
                match doctor {
                    Some(doctor) if !date.is_empty() && !reason.is_empty() => {
                        self.state = BookingState::PaymentPending {
                            draft: AppointmentDraft {
                                doctor_id: doctor.id,
                                doctor_name: doctor.user.username,
                                specialty: doctor.specialty,
                                date,
                                reason,
                            },
                        };
                        self.error = None;
                        None
                    }
                    _ => {
                        self.error = Some(MISSING_FIELDS_MESSAGE.to_string());
                        None
                    }
                }
            }
            (
                BookingState::PaymentPending { draft },
                BookingEvent::ConfirmPayment { phone_number },
            ) => {
                let phone_number = phone_number.trim().to_string();
                if phone_number.is_empty() {
                    self.state = BookingState::PaymentPending { draft };
                    self.error = Some(MISSING_PHONE_MESSAGE.to_string());
                    return None;
                }
                self.state = BookingState::Submitting { draft, paid: false };
                self.error = None;
                Some(BookingCommand::InitiatePayment { phone_number })
            }
            (BookingState::PaymentPending { .. }, BookingEvent::CancelPayment) => {
                self.error = None;
                None
            }
            (
                BookingState::Submitting { draft, paid: false },
                BookingEvent::PaymentAccepted,
            ) => {
                let command = BookingCommand::CreateAppointment {
                    draft: draft.clone(),
                };
                self.state = BookingState::Submitting { draft, paid: true };
                self.error = None;
                Some(command)
            }
            (BookingState::Submitting { draft, paid: false }, BookingEvent::PaymentFailed) => {
                self.state = BookingState::PaymentPending { draft };
                self.error = Some(PAYMENT_RETRY_MESSAGE.to_string());
                None
            }
            (BookingState::Submitting { paid: true, .. }, BookingEvent::BookingConfirmed) => {
                self.error = None;
                None
            }
            (
                BookingState::Submitting { draft, paid: true },
                BookingEvent::BookingFailed { message },
            ) => {
                self.state = BookingState::PaidUnbooked { draft };
                self.error = Some(booking_failure_message(&message));
                None
            }
            (BookingState::PaidUnbooked { draft }, BookingEvent::RetryBooking) => {
                let command = BookingCommand::CreateAppointment {
                    draft: draft.clone(),
                };
                self.state = BookingState::Submitting { draft, paid: true };
                self.error = None;
                Some(command)
            }
            (BookingState::PaidUnbooked { .. }, BookingEvent::AbandonBooking) => {
                self.error = Some(PAYMENT_WITHOUT_BOOKING_MESSAGE.to_string());
                None
            }
            // Anything else is a stale or out-of-order event.
            (state, _) => {
                self.state = state;
                None
            }
        }
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserInfo;

    fn sample_doctor() -> Doctor {
        Doctor {
            id: 4,
            user: UserInfo {
                username: "otieno".into(),
            },
            specialty: "Cardiology".into(),
        }
    }

    fn submit_event() -> BookingEvent {
        BookingEvent::SubmitForm {
            doctor: Some(sample_doctor()),
            date: "2025-03-10T14:30".into(),
            reason: "Checkup".into(),
        }
    }

    fn flow_at_payment_pending() -> BookingFlow {
        let mut flow = BookingFlow::new();
        assert_eq!(flow.apply(submit_event()), None);
        flow
    }

    fn flow_at_paid_unbooked() -> BookingFlow {
        let mut flow = flow_at_payment_pending();
        flow.apply(BookingEvent::ConfirmPayment {
            phone_number: "0712345678".into(),
        });
        flow.apply(BookingEvent::PaymentAccepted);
        flow.apply(BookingEvent::BookingFailed {
            message: "boom".into(),
        });
        assert!(matches!(flow.state(), BookingState::PaidUnbooked { .. }));
        flow
    }

    #[test]
    fn submit_with_missing_fields_stays_idle_without_command() {
        let missing = [
            BookingEvent::SubmitForm {
                doctor: None,
                date: "2025-03-10T14:30".into(),
                reason: "Checkup".into(),
            },
            BookingEvent::SubmitForm {
                doctor: Some(sample_doctor()),
                date: "".into(),
                reason: "Checkup".into(),
            },
            BookingEvent::SubmitForm {
                doctor: Some(sample_doctor()),
                date: "2025-03-10T14:30".into(),
                reason: "   ".into(),
            },
        ];
        for event in missing {
            let mut flow = BookingFlow::new();
            assert_eq!(flow.apply(event), None);
            assert_eq!(flow.state(), &BookingState::Idle);
            assert_eq!(flow.error(), Some(MISSING_FIELDS_MESSAGE));
            assert!(!flow.modal_open());
        }
    }

    #[test]
    fn submit_with_complete_form_opens_payment_modal() {
        let mut flow = BookingFlow::new();
        let command = flow.apply(BookingEvent::SubmitForm {
            doctor: Some(sample_doctor()),
            date: "2025-03-10T14:30".into(),
            reason: "  Checkup ".into(),
        });
        assert_eq!(command, None);
        assert!(flow.modal_open());
        assert!(!flow.is_busy());
        assert_eq!(flow.error(), None);
        match flow.state() {
            BookingState::PaymentPending { draft } => {
                assert_eq!(draft.doctor_id, 4);
                assert_eq!(draft.doctor_name, "otieno");
                assert_eq!(draft.specialty, "Cardiology");
                assert_eq!(draft.date, "2025-03-10T14:30");
                assert_eq!(draft.reason, "Checkup");
            }
            other => panic!("expected PaymentPending, got {other:?}"),
        }
    }

    #[test]
    fn confirm_payment_requires_phone_number() {
        let mut flow = flow_at_payment_pending();
        let command = flow.apply(BookingEvent::ConfirmPayment {
            phone_number: "  ".into(),
        });
        assert_eq!(command, None);
        assert!(matches!(flow.state(), BookingState::PaymentPending { .. }));
        assert_eq!(flow.error(), Some(MISSING_PHONE_MESSAGE));
    }

    #[test]
    fn confirm_payment_issues_payment_request() {
        let mut flow = flow_at_payment_pending();
        let command = flow.apply(BookingEvent::ConfirmPayment {
            phone_number: " 0712345678 ".into(),
        });
        assert_eq!(
            command,
            Some(BookingCommand::InitiatePayment {
                phone_number: "0712345678".into(),
            })
        );
        assert!(flow.is_busy());
        assert_eq!(flow.error(), None);
        assert!(matches!(
            flow.state(),
            BookingState::Submitting { paid: false, .. }
        ));
    }

    #[test]
    fn payment_success_issues_creation_with_original_draft() {
        let mut flow = flow_at_payment_pending();
        flow.apply(BookingEvent::ConfirmPayment {
            phone_number: "0712345678".into(),
        });
        let command = flow.apply(BookingEvent::PaymentAccepted);
        match command {
            Some(BookingCommand::CreateAppointment { draft }) => {
                assert_eq!(draft.doctor_id, 4);
                assert_eq!(draft.date, "2025-03-10T14:30");
                assert_eq!(draft.reason, "Checkup");
            }
            other => panic!("expected CreateAppointment, got {other:?}"),
        }
        assert!(matches!(
            flow.state(),
            BookingState::Submitting { paid: true, .. }
        ));
    }

    #[test]
    fn payment_failure_returns_to_modal_with_draft_intact() {
        let mut flow = flow_at_payment_pending();
        flow.apply(BookingEvent::ConfirmPayment {
            phone_number: "0712345678".into(),
        });
        let command = flow.apply(BookingEvent::PaymentFailed);
        assert_eq!(command, None);
        assert_eq!(flow.error(), Some(PAYMENT_RETRY_MESSAGE));
        match flow.state() {
            BookingState::PaymentPending { draft } => {
                assert_eq!(draft.reason, "Checkup");
            }
            other => panic!("expected PaymentPending, got {other:?}"),
        }
    }

    #[test]
    fn booking_success_resets_to_idle() {
        let mut flow = flow_at_payment_pending();
        flow.apply(BookingEvent::ConfirmPayment {
            phone_number: "0712345678".into(),
        });
        flow.apply(BookingEvent::PaymentAccepted);
        let command = flow.apply(BookingEvent::BookingConfirmed);
        assert_eq!(command, None);
        assert_eq!(flow.state(), &BookingState::Idle);
        assert_eq!(flow.error(), None);
        assert!(!flow.modal_open());
    }

    #[test]
    fn conflict_failure_surfaces_guidance_verbatim() {
        let mut flow = flow_at_payment_pending();
        flow.apply(BookingEvent::ConfirmPayment {
            phone_number: "0712345678".into(),
        });
        flow.apply(BookingEvent::PaymentAccepted);
        flow.apply(BookingEvent::BookingFailed {
            message: "Doctor already has an appointment within 30 minutes of this time".into(),
        });
        assert_eq!(flow.error(), Some(CONFLICT_GUIDANCE));
        assert!(matches!(flow.state(), BookingState::PaidUnbooked { .. }));
    }

    #[test]
    fn other_failure_surfaces_generic_retry_message() {
        let flow = flow_at_paid_unbooked();
        assert_eq!(flow.error(), Some(BOOKING_RETRY_MESSAGE));
    }

    #[test]
    fn retry_reissues_creation_without_paying_again() {
        let mut flow = flow_at_paid_unbooked();
        let command = flow.apply(BookingEvent::RetryBooking);
        match command {
            Some(BookingCommand::CreateAppointment { draft }) => {
                assert_eq!(draft.reason, "Checkup");
            }
            other => panic!("expected CreateAppointment, got {other:?}"),
        }
        assert!(matches!(
            flow.state(),
            BookingState::Submitting { paid: true, .. }
        ));
    }

    #[test]
    fn abandon_after_payment_surfaces_warning() {
        let mut flow = flow_at_paid_unbooked();
        let command = flow.apply(BookingEvent::AbandonBooking);
        assert_eq!(command, None);
        assert_eq!(flow.state(), &BookingState::Idle);
        assert_eq!(flow.error(), Some(PAYMENT_WITHOUT_BOOKING_MESSAGE));
    }

    #[test]
    fn cancel_discards_draft_and_closes_modal() {
        let mut flow = flow_at_payment_pending();
        let command = flow.apply(BookingEvent::CancelPayment);
        assert_eq!(command, None);
        assert_eq!(flow.state(), &BookingState::Idle);
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut flow = BookingFlow::new();
        for event in [
            BookingEvent::PaymentAccepted,
            BookingEvent::PaymentFailed,
            BookingEvent::BookingConfirmed,
            BookingEvent::BookingFailed {
                message: "late".into(),
            },
            BookingEvent::RetryBooking,
            BookingEvent::AbandonBooking,
            BookingEvent::CancelPayment,
            BookingEvent::ConfirmPayment {
                phone_number: "0712345678".into(),
            },
        ] {
            assert_eq!(flow.apply(event), None);
            assert_eq!(flow.state(), &BookingState::Idle);
            assert_eq!(flow.error(), None);
        }

        let mut pending = flow_at_payment_pending();
        let before = pending.clone();
        assert_eq!(pending.apply(submit_event()), None);
        assert_eq!(pending, before);
    }

    #[test]
    fn happy_path_issues_payment_then_creation() {
        let mut flow = BookingFlow::new();
        let mut commands = Vec::new();
        for event in [
            submit_event(),
            BookingEvent::ConfirmPayment {
                phone_number: "0712345678".into(),
            },
            BookingEvent::PaymentAccepted,
            BookingEvent::BookingConfirmed,
        ] {
            commands.extend(flow.apply(event));
        }
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], BookingCommand::InitiatePayment { .. }));
        assert!(matches!(
            commands[1],
            BookingCommand::CreateAppointment { .. }
        ));
        assert_eq!(flow.state(), &BookingState::Idle);
    }

    #[test]
    fn conflict_matcher_requires_exact_marker() {
        assert_eq!(
            booking_failure_message("appointment within 30 minutes exists"),
            CONFLICT_GUIDANCE
        );
        assert_eq!(
            booking_failure_message("within 30 MINUTES"),
            BOOKING_RETRY_MESSAGE
        );
        assert_eq!(booking_failure_message(""), BOOKING_RETRY_MESSAGE);
    }
}
