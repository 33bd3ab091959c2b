use gloo::storage::{LocalStorage, Storage};
use shared::{keys, Role, Session};
use yew::prelude::*;

use crate::services::logging::Logger;

/// Session context made available to every view. Views read the session from
/// here instead of reaching into browser storage themselves.
#[derive(Clone, PartialEq)]
pub struct SessionCtx {
    pub session: Option<Session>,
    pub on_login: Callback<Session>,
    pub on_logout: Callback<()>,
}

/// Persists the session in browser local storage.
///
/// Values are written through the raw storage interface, not JSON, so
/// sessions written by earlier builds of this app load unchanged. `store`
/// writes exactly three keys: the role, the username, and the numeric id
/// for that role.
pub struct SessionStore;

impl SessionStore {
    pub fn load() -> Option<Session> {
        let storage = LocalStorage::raw();
        let role = storage.get_item(keys::ROLE).ok().flatten()?;
        let role = Role::parse(&role)?;
        let username = storage.get_item(keys::USERNAME).ok().flatten()?;
        let id_key = match role {
            Role::Patient => keys::PATIENT_ID,
            Role::Doctor => keys::DOCTOR_ID,
        };
        let user_id = storage.get_item(id_key).ok().flatten()?.parse().ok()?;
        Some(Session {
            role,
            username,
            user_id,
        })
    }

    pub fn store(session: &Session) {
        let storage = LocalStorage::raw();
        let written = storage
            .set_item(keys::ROLE, session.role.as_str())
            .and_then(|_| storage.set_item(keys::USERNAME, &session.username))
            .and_then(|_| storage.set_item(session.id_key(), &session.user_id.to_string()));
        if written.is_err() {
            Logger::warn_with_component("session", "browser storage rejected the session write");
        }
    }

    /// Removes every key this app has ever written, including the per-role
    /// name keys from older builds.
    pub fn clear() {
        let storage = LocalStorage::raw();
        for key in [
            keys::ROLE,
            keys::USERNAME,
            keys::PATIENT_ID,
            keys::DOCTOR_ID,
            keys::LEGACY_PATIENT_NAME,
            keys::LEGACY_DOCTOR_NAME,
        ] {
            let _ = storage.remove_item(key);
        }
    }

    /// The route guard's check: any stored role string counts as logged in,
    /// even one this build cannot parse. The backend is the authority; this
    /// only gates navigation.
    pub fn role_present() -> bool {
        matches!(LocalStorage::raw().get_item(keys::ROLE), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn store_then_load_round_trips() {
        SessionStore::clear();
        let session = Session::patient("amina", 12);
        SessionStore::store(&session);
        assert_eq!(SessionStore::load(), Some(session));
        assert!(SessionStore::role_present());
        SessionStore::clear();
    }

    #[wasm_bindgen_test]
    fn store_writes_exactly_three_keys() {
        SessionStore::clear();
        SessionStore::store(&Session::doctor("otieno", 4));
        let storage = LocalStorage::raw();
        assert_eq!(storage.get_item(keys::ROLE).unwrap().as_deref(), Some("doctor"));
        assert_eq!(
            storage.get_item(keys::USERNAME).unwrap().as_deref(),
            Some("otieno")
        );
        assert_eq!(storage.get_item(keys::DOCTOR_ID).unwrap().as_deref(), Some("4"));
        assert_eq!(storage.get_item(keys::PATIENT_ID).unwrap(), None);
        assert_eq!(storage.get_item(keys::LEGACY_DOCTOR_NAME).unwrap(), None);
        SessionStore::clear();
    }

    #[wasm_bindgen_test]
    fn unparsable_role_still_counts_as_present() {
        SessionStore::clear();
        LocalStorage::raw().set_item(keys::ROLE, "administrator").unwrap();
        assert!(SessionStore::role_present());
        assert_eq!(SessionStore::load(), None);
        SessionStore::clear();
    }

    #[wasm_bindgen_test]
    fn clear_sweeps_keys_from_older_builds() {
        let storage = LocalStorage::raw();
        storage.set_item(keys::ROLE, "patient").unwrap();
        storage.set_item(keys::LEGACY_PATIENT_NAME, "amina").unwrap();
        storage.set_item(keys::LEGACY_DOCTOR_NAME, "otieno").unwrap();
        SessionStore::clear();
        assert!(!SessionStore::role_present());
        assert_eq!(storage.get_item(keys::LEGACY_PATIENT_NAME).unwrap(), None);
        assert_eq!(storage.get_item(keys::LEGACY_DOCTOR_NAME).unwrap(), None);
    }

    #[wasm_bindgen_test]
    fn load_requires_username_and_id() {
        SessionStore::clear();
        LocalStorage::raw().set_item(keys::ROLE, "patient").unwrap();
        assert_eq!(SessionStore::load(), None);
        LocalStorage::raw().set_item(keys::USERNAME, "amina").unwrap();
        assert_eq!(SessionStore::load(), None);
        LocalStorage::raw().set_item(keys::PATIENT_ID, "not a number").unwrap();
        assert_eq!(SessionStore::load(), None);
        SessionStore::clear();
    }
}
