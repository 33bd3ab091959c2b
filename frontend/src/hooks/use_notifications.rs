use std::cell::Cell;
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use shared::Notification;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::logging::Logger;

/// Polling cadence for the notification list.
#[derive(Clone, PartialEq)]
pub struct PollConfig {
    pub interval_ms: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

/// Result from the notification polling hook
pub struct UseNotificationsResult {
    pub notifications: Vec<Notification>,
    pub dismiss: Callback<i64>,
}

/// Polls a patient's notifications while the calling view is mounted.
///
/// The first fetch fires immediately, then one per interval. Only one
/// request is ever outstanding: the next fetch is not scheduled until the
/// previous one resolves. The loop stops when the view unmounts or the
/// patient id changes. Each successful poll replaces the list wholesale;
/// dismissing removes an entry only after the backend confirms the delete.
#[hook]
pub fn use_notifications(
    api: ApiClient,
    patient_id: i64,
    config: PollConfig,
) -> UseNotificationsResult {
    // The RefCell is the canonical list; the state handle is a snapshot for
    // rendering. Poll and dismiss both go through the RefCell so neither can
    // clobber the other's update.
    let items = use_mut_ref(Vec::<Notification>::new);
    let view = use_state(Vec::<Notification>::new);

    {
        let items = items.clone();
        let view = view.clone();
        let api = api.clone();
        use_effect_with((patient_id, config), move |(patient_id, config)| {
            let patient_id = *patient_id;
            let interval_ms = config.interval_ms;
            let stopped = Rc::new(Cell::new(false));
            {
                let stopped = stopped.clone();
                spawn_local(async move {
                    loop {
                        if stopped.get() {
                            break;
                        }
                        match api.get_notifications(patient_id).await {
                            Ok(fetched) => {
                                if stopped.get() {
                                    break;
                                }
                                *items.borrow_mut() = fetched;
                                view.set(items.borrow().clone());
                            }
                            Err(e) => {
                                Logger::warn_with_component(
                                    "notifications",
                                    &format!("poll failed: {}", e),
                                );
                            }
                        }
                        TimeoutFuture::new(interval_ms).await;
                    }
                });
            }
            move || stopped.set(true)
        });
    }

    let dismiss = {
        let items = items.clone();
        let view = view.clone();
        Callback::from(move |notification_id: i64| {
            let api = api.clone();
            let items = items.clone();
            let view = view.clone();
            spawn_local(async move {
                let outcome = api.delete_notification(notification_id).await;
                if let Err(e) = &outcome {
                    Logger::error_with_component(
                        "notifications",
                        &format!("dismiss failed: {}", e),
                    );
                }
                let remaining =
                    shared::list_after_delete(&items.borrow(), notification_id, |n| n.id, &outcome);
                if let Some(remaining) = remaining {
                    *items.borrow_mut() = remaining;
                    view.set(items.borrow().clone());
                }
            });
        })
    };

    UseNotificationsResult {
        notifications: (*view).clone(),
        dismiss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_config_default() {
        let config = PollConfig::default();
        assert_eq!(config.interval_ms, 5_000);
    }
}
