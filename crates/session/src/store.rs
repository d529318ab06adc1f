//! Session store: the signed-in user, kept in sync with durable storage.

use safecampus_core::{Role, Session, User, UserUpdate};

use crate::storage::KeyValueStorage;

/// Storage key of the login flag (`"true"` when signed in, absent otherwise).
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

/// Storage key of the JSON-encoded [`User`].
pub const USER_KEY: &str = "user";

/// Owns the current [`Session`] and mirrors every change into storage.
///
/// Storage is a best-effort mirror: a failed write is logged and the in-memory
/// session remains the source of truth for the rest of the process.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    session: Session,
}

impl<S: KeyValueStorage> SessionStore<S> {
    /// Restore the session persisted in `storage`.
    ///
    /// The flag and the user are read independently. A signed-out session may
    /// still carry a user; a flag without a readable user yields a logged-out
    /// session.
    pub fn load(storage: S) -> Self {
        let logged_in = match storage.get(LOGGED_IN_KEY) {
            Ok(flag) => flag.as_deref() == Some("true"),
            Err(err) => {
                tracing::warn!("failed to read login flag: {err}");
                false
            }
        };

        let user = read_user(&storage);

        let session = Session::new(logged_in, user).unwrap_or_else(|err| {
            tracing::warn!("discarding persisted session: {err}");
            Session::logged_out()
        });

        tracing::debug!(
            logged_in = session.is_logged_in(),
            has_user = session.user().is_some(),
            "session restored"
        );

        Self { storage, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Owned copy of the current session, e.g. for a navigation guard.
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn user_role(&self) -> Option<&Role> {
        self.session.user_role()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn is_teacher(&self) -> bool {
        self.session.is_teacher()
    }

    pub fn is_parent(&self) -> bool {
        self.session.is_parent()
    }

    /// Sign in as the user described by `update`.
    ///
    /// Missing `username`/`role` are stored as empty strings.
    pub fn login(&mut self, update: UserUpdate) {
        let user = User::from_update(update);

        tracing::info!(username = %user.username, role = %user.role, "user logged in");

        if let Err(err) = self.storage.set(LOGGED_IN_KEY, "true") {
            tracing::warn!("failed to persist login flag: {err}");
        }
        self.session = Session::logged_in(user);
        self.persist_user();
    }

    /// Sign out and forget the persisted session. Safe to call repeatedly.
    pub fn logout(&mut self) {
        if self.session.is_logged_in() {
            tracing::info!("user logged out");
        }

        self.session = Session::logged_out();

        for key in [LOGGED_IN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                tracing::warn!(key, "failed to clear persisted session entry: {err}");
            }
        }
    }

    /// Merge `update` into the current user and persist it.
    ///
    /// Does nothing (and returns `false`) when no user is held.
    pub fn update_user_info(&mut self, update: UserUpdate) -> bool {
        if !self.session.update_user(update) {
            tracing::debug!("ignoring user update without a user");
            return false;
        }

        self.persist_user();
        true
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist_user(&mut self) {
        let Some(user) = self.session.user() else {
            return;
        };

        let encoded = match serde_json::to_string(user) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!("failed to encode user: {err}");
                return;
            }
        };

        if let Err(err) = self.storage.set(USER_KEY, &encoded) {
            tracing::warn!("failed to persist user: {err}");
        }
    }
}

fn read_user<S: KeyValueStorage>(storage: &S) -> Option<User> {
    let raw = match storage.get(USER_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!("failed to read persisted user: {err}");
            return None;
        }
    };

    match serde_json::from_str::<Option<User>>(&raw) {
        Ok(user) => user,
        Err(err) => {
            tracing::debug!("ignoring malformed persisted user: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStorage, StorageError};
    use proptest::prelude::*;

    fn teacher_login() -> UserUpdate {
        UserUpdate::new().username("a").role("teacher")
    }

    /// Storage whose writes always fail.
    #[derive(Default)]
    struct ReadOnlyStorage(MemoryStorage);

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }
    }

    #[test]
    fn empty_storage_loads_logged_out() {
        let store = SessionStore::load(MemoryStorage::new());
        assert!(!store.is_logged_in());
        assert!(store.user().is_none());
        assert_eq!(store.user_role(), None);
    }

    #[test]
    fn login_sets_state_and_persists_both_keys() {
        let mut store = SessionStore::load(MemoryStorage::new());
        store.login(teacher_login());

        let user = store.user().unwrap();
        assert_eq!(user.role, Role::TEACHER);
        assert_eq!(user.id, None);
        assert!(store.is_logged_in());
        assert!(store.is_teacher());

        let storage = store.storage();
        assert_eq!(storage.get(LOGGED_IN_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(
            storage.get(USER_KEY).unwrap().as_deref(),
            Some(r#"{"username":"a","role":"teacher"}"#)
        );
    }

    #[test]
    fn login_with_empty_input_stores_empty_fields() {
        let mut store = SessionStore::load(MemoryStorage::new());
        store.login(UserUpdate::new());

        assert_eq!(store.user(), Some(&User::new("", "")));
        assert!(store.is_logged_in());
        assert_eq!(store.user_role(), None);
    }

    #[test]
    fn logout_clears_state_and_storage() {
        let mut store = SessionStore::load(MemoryStorage::new());
        store.login(teacher_login());
        store.logout();

        assert!(!store.is_logged_in());
        assert!(store.user().is_none());
        assert!(store.storage().is_empty());

        // Idempotent.
        store.logout();
        assert_eq!(store.session(), &Session::logged_out());
    }

    #[test]
    fn update_while_logged_out_is_a_noop() {
        let mut store = SessionStore::load(MemoryStorage::new());
        assert!(!store.update_user_info(UserUpdate::new().avatar("x")));

        assert_eq!(store.session(), &Session::logged_out());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn update_merges_and_repersists() {
        let mut store = SessionStore::load(MemoryStorage::new());
        store.login(teacher_login());
        assert!(store.update_user_info(UserUpdate::new().avatar("x")));

        let mut expected = User::new("a", "teacher");
        expected.avatar = Some("x".to_string());
        assert_eq!(store.user(), Some(&expected));
        assert!(store.is_logged_in());

        let reloaded = SessionStore::load(store.into_storage());
        assert_eq!(reloaded.user(), Some(&expected));
    }

    #[test]
    fn malformed_user_loads_logged_out() {
        let mut storage = MemoryStorage::new();
        storage.set(LOGGED_IN_KEY, "true").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();

        let store = SessionStore::load(storage);
        assert!(!store.is_logged_in());
        assert!(store.user().is_none());
    }

    #[test]
    fn null_user_loads_logged_out() {
        let mut storage = MemoryStorage::new();
        storage.set(LOGGED_IN_KEY, "true").unwrap();
        storage.set(USER_KEY, "null").unwrap();

        let store = SessionStore::load(storage);
        assert!(!store.is_logged_in());
    }

    #[test]
    fn flag_other_than_true_loads_logged_out() {
        let mut storage = MemoryStorage::new();
        storage.set(LOGGED_IN_KEY, "1").unwrap();
        storage.set(USER_KEY, r#"{"username":"a","role":"parent"}"#).unwrap();

        let store = SessionStore::load(storage);
        assert!(!store.is_logged_in());
        assert!(store.is_parent());
    }

    #[test]
    fn user_without_flag_is_kept() {
        let mut storage = MemoryStorage::new();
        storage.set(USER_KEY, r#"{"username":"a","role":"教师"}"#).unwrap();

        let mut store = SessionStore::load(storage);
        assert!(!store.is_logged_in());
        assert_eq!(store.user(), Some(&User::new("a", "教师")));
        assert!(store.is_teacher());
        assert_eq!(store.user_role(), Some(&Role::TEACHER_ZH));

        assert!(store.update_user_info(UserUpdate::new().avatar("x")));
        assert_eq!(store.user().and_then(|u| u.avatar.as_deref()), Some("x"));
        assert!(!store.is_logged_in());
        assert_eq!(store.storage().get(LOGGED_IN_KEY).unwrap(), None);

        let reloaded = SessionStore::load(store.into_storage());
        assert_eq!(reloaded.user().and_then(|u| u.avatar.as_deref()), Some("x"));
    }

    #[test]
    fn failed_writes_keep_in_memory_state() {
        let mut store = SessionStore::load(ReadOnlyStorage::default());
        store.login(teacher_login());
        assert!(store.is_logged_in());
        assert!(store.update_user_info(UserUpdate::new().avatar("x")));

        store.logout();
        assert!(!store.is_logged_in());
    }

    fn arb_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _\\-一-龥\"\\\\]{0,16}"
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: a user written by `login` reloads structurally equal.
        #[test]
        fn persisted_user_round_trips(
            id in proptest::option::of(arb_text()),
            username in arb_text(),
            role in arb_text(),
            avatar in proptest::option::of(arb_text()),
        ) {
            let user = User { id, username, role: Role::from(role), avatar };

            let mut store = SessionStore::load(MemoryStorage::new());
            store.login(UserUpdate::from(user.clone()));

            let reloaded = SessionStore::load(store.into_storage());
            prop_assert!(reloaded.is_logged_in());
            prop_assert_eq!(reloaded.user(), Some(&user));
        }
    }
}
