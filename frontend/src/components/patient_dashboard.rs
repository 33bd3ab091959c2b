use std::cell::Cell;
use std::rc::Rc;

use shared::{
    creation_failure_text, ApiError, Appointment, AppointmentDraft, BookingCommand, BookingEvent,
    BookingFlow, CreateAppointmentRequest, Doctor, PatientProfile, Role, StkPushRequest,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlSelectElement, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::payment_modal::PaymentModal;
use crate::hooks::{use_mounted, use_notifications, PollConfig};
use crate::services::api::ApiClient;
use crate::services::logging::Logger;
use crate::services::session::SessionCtx;

/// Entry point for the patient view. The stored session must carry a
/// patient id; without one nothing is fetched and a standing error is shown
/// instead (the route guard only checks that *some* role is present).
#[function_component(PatientDashboard)]
pub fn patient_dashboard() -> Html {
    let ctx = use_context::<SessionCtx>().expect("session context not mounted");

    match &ctx.session {
        Some(session) if session.role == Role::Patient => html! {
            <Dashboard patient_id={session.user_id} username={session.username.clone()} />
        },
        _ => html! {
            <div class="dashboard">
                <p class="form-error">{ApiError::MissingSession.to_string()}</p>
            </div>
        },
    }
}

#[derive(Properties, PartialEq)]
struct DashboardProps {
    patient_id: i64,
    username: String,
}

#[function_component(Dashboard)]
fn dashboard(props: &DashboardProps) -> Html {
    let patient_id = props.patient_id;
    let api = ApiClient::new();
    let alive = use_mounted();

    let doctors = use_state(Vec::<Doctor>::new);
    let profile = use_state(|| Option::<PatientProfile>::None);
    let appointments = use_state(Vec::<Appointment>::new);
    let load_error = use_state(|| Option::<String>::None);

    let selected_doctor = use_state(String::new);
    let date = use_state(String::new);
    let reason = use_state(String::new);
    let flow = use_state(BookingFlow::new);

    let polling = use_notifications(api.clone(), patient_id, PollConfig::default());

    // Mount fetch: doctors for the selector, the profile for the greeting
    // and payment prefill, and the appointment list.
    {
        let api = api.clone();
        let alive = alive.clone();
        let doctors = doctors.clone();
        let profile = profile.clone();
        let appointments = appointments.clone();
        let load_error = load_error.clone();
        use_effect_with(patient_id, move |patient_id| {
            let patient_id = *patient_id;
            spawn_local(async move {
                let fetched_doctors = api.get_doctors().await;
                let fetched_profile = api.get_patient(patient_id).await;
                let fetched_appointments = api.get_patient_appointments(patient_id).await;
                if !alive.get() {
                    return;
                }
                match fetched_doctors {
                    Ok(list) => doctors.set(list),
                    Err(e) => {
                        Logger::error_with_component(
                            "patient-dashboard",
                            &format!("doctor list fetch failed: {}", e),
                        );
                        load_error.set(Some("Could not load the doctor list.".to_string()));
                    }
                }
                match fetched_profile {
                    Ok(p) => profile.set(Some(p)),
                    Err(e) => Logger::warn_with_component(
                        "patient-dashboard",
                        &format!("profile fetch failed: {}", e),
                    ),
                }
                match fetched_appointments {
                    Ok(list) => appointments.set(list),
                    Err(e) => {
                        Logger::error_with_component(
                            "patient-dashboard",
                            &format!("appointment fetch failed: {}", e),
                        );
                        load_error.set(Some("Could not load your appointments.".to_string()));
                    }
                }
            });
            || ()
        });
    }

    let patient_name = profile
        .as_ref()
        .map(|p| p.user.username.clone())
        .unwrap_or_else(|| props.username.clone());

    // Booking form submit: validation happens inside the workflow; a
    // rejected submit stays on the form with no request issued.
    let on_book = {
        let doctors = doctors.clone();
        let selected_doctor = selected_doctor.clone();
        let date = date.clone();
        let reason = reason.clone();
        let flow = flow.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let doctor = selected_doctor
                .parse::<i64>()
                .ok()
                .and_then(|id| doctors.iter().find(|d| d.id == id).cloned());
            let mut machine = (*flow).clone();
            machine.apply(BookingEvent::SubmitForm {
                doctor,
                date: (*date).clone(),
                reason: (*reason).clone(),
            });
            flow.set(machine);
        })
    };

    // Modal events drive the payment-then-creation chain. Only one chain is
    // ever in flight (the modal is disabled while submitting), so the local
    // machine copy each task carries stays authoritative until it finishes.
    let on_modal_event = {
        let api = api.clone();
        let alive = alive.clone();
        let flow = flow.clone();
        let appointments = appointments.clone();
        let selected_doctor = selected_doctor.clone();
        let date = date.clone();
        let reason = reason.clone();
        let patient_name = patient_name.clone();
        Callback::from(move |event: BookingEvent| {
            let mut machine = (*flow).clone();
            let command = machine.apply(event);
            flow.set(machine.clone());
            match command {
                Some(BookingCommand::InitiatePayment { phone_number }) => {
                    let api = api.clone();
                    let alive = alive.clone();
                    let flow = flow.clone();
                    let appointments = appointments.clone();
                    let selected_doctor = selected_doctor.clone();
                    let date = date.clone();
                    let reason = reason.clone();
                    let patient_name = patient_name.clone();
                    spawn_local(async move {
                        let request = StkPushRequest::booking_fee(phone_number);
                        let event = match api.initiate_stk_push(&request).await {
                            Ok(()) => BookingEvent::PaymentAccepted,
                            Err(e) => {
                                Logger::error_with_component(
                                    "booking",
                                    &format!("payment initiation failed: {}", e),
                                );
                                BookingEvent::PaymentFailed
                            }
                        };
                        let next = machine.apply(event);
                        if alive.get() {
                            flow.set(machine.clone());
                        }
                        if let Some(BookingCommand::CreateAppointment { draft }) = next {
                            create_appointment(
                                api,
                                machine,
                                draft,
                                patient_id,
                                patient_name,
                                flow,
                                appointments,
                                selected_doctor,
                                date,
                                reason,
                                alive,
                            )
                            .await;
                        }
                    });
                }
                Some(BookingCommand::CreateAppointment { draft }) => {
                    let api = api.clone();
                    let alive = alive.clone();
                    let flow = flow.clone();
                    let appointments = appointments.clone();
                    let selected_doctor = selected_doctor.clone();
                    let date = date.clone();
                    let reason = reason.clone();
                    let patient_name = patient_name.clone();
                    spawn_local(async move {
                        create_appointment(
                            api,
                            machine,
                            draft,
                            patient_id,
                            patient_name,
                            flow,
                            appointments,
                            selected_doctor,
                            date,
                            reason,
                            alive,
                        )
                        .await;
                    });
                }
                None => {}
            }
        })
    };

    let on_delete = {
        let api = api.clone();
        let alive = alive.clone();
        let appointments = appointments.clone();
        let load_error = load_error.clone();
        Callback::from(move |appointment_id: i64| {
            let api = api.clone();
            let alive = alive.clone();
            let appointments = appointments.clone();
            let load_error = load_error.clone();
            spawn_local(async move {
                let outcome = api.delete_appointment(appointment_id).await;
                if let Err(e) = &outcome {
                    Logger::error_with_component(
                        "patient-dashboard",
                        &format!("delete failed: {}", e),
                    );
                }
                if !alive.get() {
                    return;
                }
                match shared::list_after_delete(&appointments, appointment_id, |a| a.id, &outcome)
                {
                    Some(remaining) => appointments.set(remaining),
                    None => {
                        load_error.set(Some("Could not cancel the appointment.".to_string()))
                    }
                }
            });
        })
    };

    let default_phone = profile
        .as_ref()
        .map(|p| p.phone_number.clone())
        .unwrap_or_default();

    // The workflow's message belongs in the modal while it is open and on
    // the form once it has closed (missing fields, abandoned booking).
    let form_error = if flow.modal_open() { None } else { flow.error() };

    html! {
        <div class="dashboard patient-dashboard">
            <h2>{format!("Welcome, {}", patient_name)}</h2>
            {if let Some(error) = (*load_error).clone() {
                html! { <p class="form-error">{error}</p> }
            } else {
                html! {}
            }}

            <section class="booking-section">
                <h3>{"Book an Appointment"}</h3>
                <form class="booking-form" onsubmit={on_book}>
                    <div class="form-group">
                        <label for="booking-doctor">{"Doctor"}</label>
                        <select
                            id="booking-doctor"
                            onchange={{
                                let selected_doctor = selected_doctor.clone();
                                Callback::from(move |e: Event| {
                                    let select: HtmlSelectElement = e.target_unchecked_into();
                                    selected_doctor.set(select.value());
                                })
                            }}
                        >
                            <option value="" selected={selected_doctor.is_empty()}>
                                {"Select a doctor"}
                            </option>
                            {for doctors.iter().map(|doctor| html! {
                                <option
                                    value={doctor.id.to_string()}
                                    selected={*selected_doctor == doctor.id.to_string()}
                                >
                                    {doctor.display_name()}
                                </option>
                            })}
                        </select>
                    </div>
                    <div class="form-group">
                        <label for="booking-date">{"Date and Time"}</label>
                        <input
                            id="booking-date"
                            type="datetime-local"
                            value={(*date).clone()}
                            onchange={{
                                let date = date.clone();
                                Callback::from(move |e: Event| {
                                    let input: HtmlInputElement = e.target_unchecked_into();
                                    date.set(input.value());
                                })
                            }}
                        />
                    </div>
                    <div class="form-group">
                        <label for="booking-reason">{"Reason for Visit"}</label>
                        <textarea
                            id="booking-reason"
                            placeholder="Describe your symptoms or reason"
                            value={(*reason).clone()}
                            onchange={{
                                let reason = reason.clone();
                                Callback::from(move |e: Event| {
                                    let input: HtmlTextAreaElement = e.target_unchecked_into();
                                    reason.set(input.value());
                                })
                            }}
                        />
                    </div>
                    {if let Some(error) = form_error {
                        html! {
                            <div class="form-error">
                                {for error.lines().map(|line| html! { <p>{line}</p> })}
                            </div>
                        }
                    } else {
                        html! {}
                    }}
                    <button type="submit">{"Book Appointment"}</button>
                </form>
            </section>

            <section class="appointments-section">
                <h3>{"Your Appointments"}</h3>
                {if appointments.is_empty() {
                    html! { <p class="empty-list">{"No appointments booked yet."}</p> }
                } else {
                    html! {
                        <ul class="appointment-list">
                            {for appointments.iter().map(|appointment| {
                                let on_delete = on_delete.clone();
                                let id = appointment.id;
                                html! {
                                    <li class="appointment-card" key={id}>
                                        <div class="appointment-summary">
                                            <strong>{format!("Dr. {}", appointment.doctor_name)}</strong>
                                            <span>{shared::display_datetime(&appointment.date)}</span>
                                            <span>{appointment.reason.clone()}</span>
                                            <span class={if appointment.is_approved {
                                                "status approved"
                                            } else {
                                                "status pending"
                                            }}>
                                                {if appointment.is_approved { "Approved" } else { "Pending" }}
                                            </span>
                                        </div>
                                        {if let Some(diagnosis) = &appointment.diagnosis {
                                            html! { <p>{format!("Diagnosis: {}", diagnosis)}</p> }
                                        } else {
                                            html! {}
                                        }}
                                        {if let Some(prescription) = &appointment.prescription {
                                            html! { <p>{format!("Prescription: {}", prescription)}</p> }
                                        } else {
                                            html! {}
                                        }}
                                        {if appointment.has_server_id() {
                                            html! {
                                                <button
                                                    class="btn btn-danger"
                                                    onclick={Callback::from(move |_| on_delete.emit(id))}
                                                >
                                                    {"Cancel"}
                                                </button>
                                            }
                                        } else {
                                            // The backend omitted the new id; until the
                                            // next full fetch fills it in there is
                                            // nothing a delete request could address.
                                            html! {}
                                        }}
                                    </li>
                                }
                            })}
                        </ul>
                    }
                }}
            </section>

            <section class="notifications-section">
                <h3>{"Notifications"}</h3>
                {if polling.notifications.is_empty() {
                    html! { <p class="empty-list">{"No new notifications."}</p> }
                } else {
                    html! {
                        <ul class="notification-list">
                            {for polling.notifications.iter().map(|notification| {
                                let dismiss = polling.dismiss.clone();
                                let id = notification.id;
                                html! {
                                    <li key={id}>
                                        <span>{notification.message.clone()}</span>
                                        <button onclick={Callback::from(move |_| dismiss.emit(id))}>
                                            {"Dismiss"}
                                        </button>
                                    </li>
                                }
                            })}
                        </ul>
                    }
                }}
            </section>

            <PaymentModal
                state={flow.state().clone()}
                error={flow.error().map(str::to_string)}
                default_phone={default_phone}
                on_event={on_modal_event}
            />
        </div>
    }
}

/// Issue the appointment-creation call and fold the outcome back into the
/// workflow. On success the confirmed appointment is appended to the local
/// list and the form is cleared; on failure the paid draft stays parked in
/// the flow for retry.
#[allow(clippy::too_many_arguments)]
async fn create_appointment(
    api: ApiClient,
    mut machine: BookingFlow,
    draft: AppointmentDraft,
    patient_id: i64,
    patient_name: String,
    flow: UseStateHandle<BookingFlow>,
    appointments: UseStateHandle<Vec<Appointment>>,
    selected_doctor: UseStateHandle<String>,
    date: UseStateHandle<String>,
    reason: UseStateHandle<String>,
    alive: Rc<Cell<bool>>,
) {
    let request = CreateAppointmentRequest {
        doctor_id: draft.doctor_id,
        patient_id,
        date: draft.date.clone(),
        reason: draft.reason.clone(),
    };
    match api.create_appointment(&request).await {
        Ok(response) => {
            machine.apply(BookingEvent::BookingConfirmed);
            if !alive.get() {
                return;
            }
            flow.set(machine);
            // The backend may omit the new id; the entry carries 0 until
            // the next full fetch fills it in.
            let mut list = (*appointments).clone();
            list.push(Appointment {
                id: response.id,
                doctor_name: draft.doctor_name,
                patient_name,
                date: draft.date,
                reason: draft.reason,
                is_approved: response.is_approved,
                diagnosis: None,
                prescription: None,
            });
            appointments.set(list);
            selected_doctor.set(String::new());
            date.set(String::new());
            reason.set(String::new());
        }
        Err(e) => {
            Logger::error_with_component("booking", &format!("creation failed: {}", e));
            machine.apply(BookingEvent::BookingFailed {
                message: creation_failure_text(&e),
            });
            if alive.get() {
                flow.set(machine);
            }
        }
    }
}
