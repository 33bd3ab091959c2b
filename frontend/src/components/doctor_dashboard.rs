use shared::{ApiError, Appointment, Role, UpdateAppointmentRequest};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

use crate::hooks::use_mounted;
use crate::services::api::ApiClient;
use crate::services::logging::Logger;
use crate::services::session::SessionCtx;

/// Entry point for the doctor view. A stored doctor id is required; without
/// one nothing is fetched and a standing error is shown instead.
#[function_component(DoctorDashboard)]
pub fn doctor_dashboard() -> Html {
    let ctx = use_context::<SessionCtx>().expect("session context not mounted");

    match &ctx.session {
        Some(session) if session.role == Role::Doctor => html! {
            <Dashboard doctor_id={session.user_id} username={session.username.clone()} />
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
    doctor_id: i64,
    username: String,
}

#[function_component(Dashboard)]
fn dashboard(props: &DashboardProps) -> Html {
    let doctor_id = props.doctor_id;
    let api = ApiClient::new();
    let alive = use_mounted();

    let appointments = use_state(Vec::<Appointment>::new);
    let error_message = use_state(|| Option::<String>::None);
    // Id of the appointment whose details are being edited, if any.
    let editing = use_state(|| Option::<i64>::None);
    let diagnosis = use_state(String::new);
    let prescription = use_state(String::new);
    let is_saving = use_state(|| false);

    {
        let api = api.clone();
        let alive = alive.clone();
        let appointments = appointments.clone();
        let error_message = error_message.clone();
        use_effect_with(doctor_id, move |doctor_id| {
            let doctor_id = *doctor_id;
            spawn_local(async move {
                match api.get_doctor_appointments(doctor_id).await {
                    Ok(list) => {
                        if alive.get() {
                            appointments.set(list);
                        }
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "doctor-dashboard",
                            &format!("appointment fetch failed: {}", e),
                        );
                        if alive.get() {
                            error_message
                                .set(Some("Could not load your appointments.".to_string()));
                        }
                    }
                }
            });
            || ()
        });
    }

    // Approve marks the local entry only after the backend confirms; no
    // optimistic flip.
    let on_approve = {
        let api = api.clone();
        let alive = alive.clone();
        let appointments = appointments.clone();
        let error_message = error_message.clone();
        Callback::from(move |appointment_id: i64| {
            let api = api.clone();
            let alive = alive.clone();
            let appointments = appointments.clone();
            let error_message = error_message.clone();
            spawn_local(async move {
                match api.approve_appointment(appointment_id).await {
                    Ok(_) => {
                        if alive.get() {
                            let patched: Vec<Appointment> = appointments
                                .iter()
                                .cloned()
                                .map(|mut a| {
                                    if a.id == appointment_id {
                                        a.is_approved = true;
                                    }
                                    a
                                })
                                .collect();
                            appointments.set(patched);
                            error_message.set(None);
                        }
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "doctor-dashboard",
                            &format!("approve failed: {}", e),
                        );
                        if alive.get() {
                            error_message
                                .set(Some("Could not approve the appointment.".to_string()));
                        }
                    }
                }
            });
        })
    };

    let open_editor = {
        let editing = editing.clone();
        let diagnosis = diagnosis.clone();
        let prescription = prescription.clone();
        let appointments = appointments.clone();
        Callback::from(move |appointment_id: i64| {
            if let Some(appointment) = appointments.iter().find(|a| a.id == appointment_id) {
                diagnosis.set(appointment.diagnosis.clone().unwrap_or_default());
                prescription.set(appointment.prescription.clone().unwrap_or_default());
                editing.set(Some(appointment_id));
            }
        })
    };

    let close_editor = {
        let editing = editing.clone();
        Callback::from(move |_: MouseEvent| editing.set(None))
    };

    // Update reconciles through a full re-fetch rather than a local patch.
    let on_save = {
        let api = api.clone();
        let alive = alive.clone();
        let appointments = appointments.clone();
        let error_message = error_message.clone();
        let editing = editing.clone();
        let diagnosis = diagnosis.clone();
        let prescription = prescription.clone();
        let is_saving = is_saving.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(appointment_id) = *editing else {
                return;
            };
            let request = UpdateAppointmentRequest {
                diagnosis: (*diagnosis).trim().to_string(),
                prescription: (*prescription).trim().to_string(),
            };
            is_saving.set(true);

            let api = api.clone();
            let alive = alive.clone();
            let appointments = appointments.clone();
            let error_message = error_message.clone();
            let editing = editing.clone();
            let is_saving = is_saving.clone();
            spawn_local(async move {
                match api.update_appointment(appointment_id, &request).await {
                    Ok(()) => {
                        let refreshed = api.get_doctor_appointments(doctor_id).await;
                        if let Err(e) = &refreshed {
                            Logger::warn_with_component(
                                "doctor-dashboard",
                                &format!("refresh after update failed: {}", e),
                            );
                        }
                        if !alive.get() {
                            return;
                        }
                        let (list, stale_notice) =
                            shared::appointments_after_update(&appointments, refreshed);
                        appointments.set(list);
                        error_message.set(stale_notice);
                        editing.set(None);
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "doctor-dashboard",
                            &format!("update failed: {}", e),
                        );
                        if alive.get() {
                            error_message
                                .set(Some("Could not save the appointment details.".to_string()));
                        }
                    }
                }
                if alive.get() {
                    is_saving.set(false);
                }
            });
        })
    };

    let bind_area = |field: &UseStateHandle<String>| {
        let field = field.clone();
        Callback::from(move |e: Event| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            field.set(input.value());
        })
    };

    html! {
        <div class="dashboard doctor-dashboard">
            <h2>{format!("Welcome, Dr. {}", props.username)}</h2>
            {if let Some(error) = (*error_message).clone() {
                html! { <p class="form-error">{error}</p> }
            } else {
                html! {}
            }}

            <section class="appointments-section">
                <h3>{"Your Appointments"}</h3>
                {if appointments.is_empty() {
                    html! { <p class="empty-list">{"No appointments assigned yet."}</p> }
                } else {
                    html! {
                        <ul class="appointment-list">
                            {for appointments.iter().map(|appointment| {
                                let id = appointment.id;
                                html! {
                                    <li class="appointment-card" key={id}>
                                        <div class="appointment-summary">
                                            <strong>{appointment.patient_name.clone()}</strong>
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
                                        {if !appointment.is_approved {
                                            let on_approve = on_approve.clone();
                                            html! {
                                                <button
                                                    class="btn btn-primary"
                                                    onclick={Callback::from(move |_| on_approve.emit(id))}
                                                >
                                                    {"Approve"}
                                                </button>
                                            }
                                        } else if *editing == Some(id) {
                                            html! {
                                                <form class="details-form" onsubmit={on_save.clone()}>
                                                    <div class="form-group">
                                                        <label for={format!("diagnosis-{}", id)}>{"Diagnosis"}</label>
                                                        <textarea
                                                            id={format!("diagnosis-{}", id)}
                                                            value={(*diagnosis).clone()}
                                                            onchange={bind_area(&diagnosis)}
                                                            disabled={*is_saving}
                                                        />
                                                    </div>
                                                    <div class="form-group">
                                                        <label for={format!("prescription-{}", id)}>{"Prescription"}</label>
                                                        <textarea
                                                            id={format!("prescription-{}", id)}
                                                            value={(*prescription).clone()}
                                                            onchange={bind_area(&prescription)}
                                                            disabled={*is_saving}
                                                        />
                                                    </div>
                                                    <button type="submit" class="btn btn-primary" disabled={*is_saving}>
                                                        {if *is_saving { "Saving..." } else { "Save" }}
                                                    </button>
                                                    <button
                                                        type="button"
                                                        class="btn btn-secondary"
                                                        onclick={close_editor.clone()}
                                                        disabled={*is_saving}
                                                    >
                                                        {"Cancel"}
                                                    </button>
                                                </form>
                                            }
                                        } else {
                                            // Details can only be attached once approved.
                                            let open_editor = open_editor.clone();
                                            html! {
                                                <button
                                                    class="btn btn-secondary"
                                                    onclick={Callback::from(move |_| open_editor.emit(id))}
                                                >
                                                    {if appointment.diagnosis.is_some() {
                                                        "Edit Details"
                                                    } else {
                                                        "Add Details"
                                                    }}
                                                </button>
                                            }
                                        }}
                                    </li>
                                }
                            })}
                        </ul>
                    }
                }}
            </section>
        </div>
    }
}
