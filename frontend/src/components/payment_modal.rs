use shared::{BookingEvent, BookingState, AppointmentDraft, BOOKING_FEE};
use web_sys::{HtmlInputElement, MouseEvent};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PaymentModalProps {
    pub state: BookingState,
    pub error: Option<String>,
    /// Phone number from the patient profile, prefilled into the form.
    pub default_phone: String,
    pub on_event: Callback<BookingEvent>,
}

fn draft_summary(draft: &AppointmentDraft) -> Html {
    html! {
        <div class="payment-summary">
            <p>{format!("Dr. {} ({})", draft.doctor_name, draft.specialty)}</p>
            <p>{shared::display_datetime(&draft.date)}</p>
            <p>{draft.reason.clone()}</p>
            <p class="payment-amount">{format!("Booking fee: KSh {}", BOOKING_FEE)}</p>
        </div>
    }
}

/// Payment step of the booking flow. Collects the phone number for the
/// mobile-money charge and renders the in-flight and paid-but-unbooked
/// states; which controls appear is decided entirely by the workflow state
/// passed in.
#[function_component(PaymentModal)]
pub fn payment_modal(props: &PaymentModalProps) -> Html {
    let phone_number = use_state(String::new);

    // Reset the phone field each time the modal opens.
    {
        let phone_number = phone_number.clone();
        let default_phone = props.default_phone.clone();
        let open = !matches!(props.state, BookingState::Idle);
        use_effect_with(open, move |open| {
            if *open {
                phone_number.set(default_phone);
            }
            || ()
        });
    }

    let busy = matches!(props.state, BookingState::Submitting { .. });

    let on_phone_change = {
        let phone_number = phone_number.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            phone_number.set(input.value());
        })
    };

    let on_pay = {
        let phone_number = phone_number.clone();
        let on_event = props.on_event.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_event.emit(BookingEvent::ConfirmPayment {
                phone_number: (*phone_number).clone(),
            });
        })
    };

    let emit = |event: BookingEvent| {
        let on_event = props.on_event.clone();
        Callback::from(move |_: MouseEvent| on_event.emit(event.clone()))
    };

    // Clicking outside only cancels while the patient can still back out.
    let on_backdrop_click = {
        let on_event = props.on_event.clone();
        let cancellable = matches!(props.state, BookingState::PaymentPending { .. });
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            if cancellable {
                on_event.emit(BookingEvent::CancelPayment);
            }
        })
    };

    let on_modal_click = Callback::from(|e: MouseEvent| {
        e.stop_propagation();
    });

    let error = if let Some(error) = &props.error {
        html! {
            <div class="payment-error">
                {for error.lines().map(|line| html! { <p>{line}</p> })}
            </div>
        }
    } else {
        html! {}
    };

    let body = match &props.state {
        BookingState::Idle => return html! {},
        BookingState::PaymentPending { draft } => html! {
            <>
                {draft_summary(draft)}
                {error}
                <form class="payment-form" onsubmit={on_pay}>
                    <div class="form-group">
                        <label for="payment-phone">{"M-Pesa Phone Number"}</label>
                        <input
                            id="payment-phone"
                            type="tel"
                            placeholder="07XXXXXXXX"
                            value={(*phone_number).clone()}
                            onchange={on_phone_change}
                            autofocus=true
                        />
                    </div>
                    <div class="payment-buttons">
                        <button type="submit" class="btn btn-primary">
                            {format!("Pay KSh {}", BOOKING_FEE)}
                        </button>
                        <button
                            type="button"
                            class="btn btn-secondary"
                            onclick={emit(BookingEvent::CancelPayment)}
                        >
                            {"Cancel"}
                        </button>
                    </div>
                </form>
            </>
        },
        BookingState::Submitting { draft, paid } => html! {
            <>
                {draft_summary(draft)}
                <p class="payment-progress">
                    {if *paid {
                        "Payment received. Booking your appointment..."
                    } else {
                        "Sending payment request. Check your phone to approve it..."
                    }}
                </p>
            </>
        },
        BookingState::PaidUnbooked { draft } => html! {
            <>
                {draft_summary(draft)}
                {error}
                <div class="payment-buttons">
                    <button
                        type="button"
                        class="btn btn-primary"
                        onclick={emit(BookingEvent::RetryBooking)}
                    >
                        {"Try booking again"}
                    </button>
                    <button
                        type="button"
                        class="btn btn-secondary"
                        onclick={emit(BookingEvent::AbandonBooking)}
                    >
                        {"Give up for now"}
                    </button>
                </div>
            </>
        },
    };

    html! {
        <div class="payment-modal-backdrop" onclick={on_backdrop_click}>
            <div class="payment-modal" onclick={on_modal_click}>
                <h3>{"Confirm Booking Payment"}</h3>
                {body}
                {if busy {
                    html! { <p class="payment-note">{"Please keep this window open."}</p> }
                } else {
                    html! {}
                }}
            </div>
        </div>
    }
}
