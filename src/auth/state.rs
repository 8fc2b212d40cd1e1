//! The shared authentication state.
//!
//! [`SessionCell`] is the one place the current [`Session`] lives. The
//! [`Gateway`](crate::clients::Gateway) is bound to a cell and reads the
//! credential from it on every call; [`SessionStore`](crate::auth::SessionStore)
//! drives its transitions. Every transition that changes durability writes to
//! [`SessionStorage`] before returning.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::error::StorageError;
use crate::auth::session::Session;
use crate::auth::storage::{keys, SessionStorage};

/// Where the visitor is in the authentication lifecycle.
///
/// `Anonymous -> Authenticating -> Authenticated -> Anonymous`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    /// No session.
    #[default]
    Anonymous,
    /// A login call is in flight.
    Authenticating,
    /// A valid session is established.
    Authenticated(Session),
}

impl AuthState {
    /// Returns `true` for [`AuthState::Authenticated`].
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the session, if authenticated.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

struct Inner {
    state: RwLock<AuthState>,
    storage: Arc<dyn SessionStorage>,
}

/// Shared handle to the current authentication state and its durable store.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Clone)]
pub struct SessionCell {
    inner: Arc<Inner>,
}

// Verify SessionCell is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionCell>();
};

impl SessionCell {
    /// Creates an anonymous cell over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(AuthState::Anonymous),
                storage,
            }),
        }
    }

    /// Returns a snapshot of the current state.
    pub async fn state(&self) -> AuthState {
        self.inner.state.read().await.clone()
    }

    /// Returns the current session, if authenticated.
    pub async fn current(&self) -> Option<Session> {
        self.inner.state.read().await.session().cloned()
    }

    /// Returns the bearer credential of the current session, if any.
    pub async fn credential(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .await
            .session()
            .map(|session| session.access_token.clone())
    }

    /// Returns the durable store behind this cell.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.inner.storage
    }

    /// Marks a login attempt as in flight.
    pub async fn begin_authenticating(&self) {
        *self.inner.state.write().await = AuthState::Authenticating;
        tracing::debug!("Session state: Authenticating");
    }

    /// Persists `session` and transitions to `Authenticated`.
    ///
    /// Storage is written first; on a storage failure the state is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the session could not be persisted.
    pub async fn establish(&self, session: Session) -> Result<(), StorageError> {
        let mut state = self.inner.state.write().await;

        let storage = &self.inner.storage;
        let record = serde_json::to_string(&session.identity_record())?;
        storage.set(keys::CREDENTIAL, &session.access_token)?;
        match &session.refresh_token {
            Some(refresh) => storage.set(keys::REFRESH_CREDENTIAL, refresh)?,
            None => storage.remove(keys::REFRESH_CREDENTIAL)?,
        }
        storage.set(keys::IDENTITY, &record)?;

        tracing::debug!(user_id = %session.user_id, "Session state: Authenticated");
        *state = AuthState::Authenticated(session);
        Ok(())
    }

    /// Adopts an already-persisted session without writing storage.
    pub(crate) async fn adopt(&self, session: Session) {
        tracing::debug!(user_id = %session.user_id, "Session state: Authenticated (restored)");
        *self.inner.state.write().await = AuthState::Authenticated(session);
    }

    /// Transitions to `Anonymous` without touching storage.
    pub(crate) async fn forget(&self) {
        *self.inner.state.write().await = AuthState::Anonymous;
        tracing::debug!("Session state: Anonymous (storage untouched)");
    }

    /// Transitions to `Anonymous` and removes every persisted session key.
    ///
    /// The in-memory state is cleared even if a storage removal fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] hit while removing keys.
    pub async fn invalidate(&self) -> Result<(), StorageError> {
        let mut state = self.inner.state.write().await;
        *state = AuthState::Anonymous;

        let storage = &self.inner.storage;
        let results = [
            storage.remove(keys::CREDENTIAL),
            storage.remove(keys::REFRESH_CREDENTIAL),
            storage.remove(keys::IDENTITY),
        ];
        tracing::debug!("Session state: Anonymous");
        results.into_iter().collect()
    }
}

impl fmt::Debug for SessionCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCell")
            .field("storage", &self.inner.storage)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::Profile;
    use crate::auth::storage::MemoryStorage;
    use crate::ids::UserId;

    fn session() -> Session {
        Session::new(
            UserId::new("u-1"),
            "tok123".to_string(),
            Some("ref456".to_string()),
            Profile::default(),
        )
    }

    #[tokio::test]
    async fn test_new_cell_is_anonymous() {
        let cell = SessionCell::new(Arc::new(MemoryStorage::new()));
        assert_eq!(cell.state().await, AuthState::Anonymous);
        assert!(cell.credential().await.is_none());
    }

    #[tokio::test]
    async fn test_establish_persists_before_authenticating() {
        let storage = Arc::new(MemoryStorage::new());
        let cell = SessionCell::new(storage.clone());

        cell.establish(session()).await.unwrap();

        assert!(cell.state().await.is_authenticated());
        assert_eq!(cell.credential().await.as_deref(), Some("tok123"));
        assert_eq!(storage.get(keys::CREDENTIAL).unwrap().as_deref(), Some("tok123"));
        assert_eq!(
            storage.get(keys::REFRESH_CREDENTIAL).unwrap().as_deref(),
            Some("ref456")
        );
        assert!(storage.get(keys::IDENTITY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_clears_state_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let cell = SessionCell::new(storage.clone());
        cell.establish(session()).await.unwrap();

        cell.invalidate().await.unwrap();

        assert_eq!(cell.state().await, AuthState::Anonymous);
        assert!(storage.get(keys::CREDENTIAL).unwrap().is_none());
        assert!(storage.get(keys::REFRESH_CREDENTIAL).unwrap().is_none());
        assert!(storage.get(keys::IDENTITY).unwrap().is_none());

        // Idempotent
        cell.invalidate().await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cell = SessionCell::new(Arc::new(MemoryStorage::new()));
        let other = cell.clone();

        cell.begin_authenticating().await;
        assert_eq!(other.state().await, AuthState::Authenticating);
    }
}
