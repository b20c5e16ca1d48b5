//! Session store
//!
//! Persisted identity of the logged-in user plus a login flag, stored under
//! the `user` and `isLoggedIn` keys. Every service reads it to scope requests;
//! login/logout and the HTTP client's 401 handling write it.
//!
//! Writes are last-write-wins. The store is cheap to clone and all clones
//! share the same storage and event channel.

mod storage;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};

use std::sync::Arc;

use shared::models::UserProfile;
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Storage key holding the JSON-serialized user
pub const USER_KEY: &str = "user";
/// Storage key holding the login flag (`"true"` or absent)
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

const EVENT_CAPACITY: usize = 16;

/// Session change signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login succeeded in this process
    LoggedIn,
    /// The session was torn down (logout, 401, failed validation)
    Cleared,
    /// Another process or tab changed the shared storage
    ExternalChange,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { storage, events }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(path)))
    }

    /// File-backed when `session_file` is configured, in-memory otherwise
    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.session_file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Using file session storage");
                Self::file(path.clone())
            }
            None => Self::in_memory(),
        }
    }

    /// Stored user, or `None` when absent or unparseable
    pub fn current_user(&self) -> Option<UserProfile> {
        let raw = self.storage.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Stored session user is unreadable");
                None
            }
        }
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.current_user().map(|u| u.id)
    }

    /// User id for a user-scoped call; fails before any I/O without a session
    pub fn require_user_id(&self) -> ClientResult<i64> {
        self.current_user_id().ok_or(ClientError::NotLoggedIn)
    }

    /// Login flag set AND a readable user stored
    pub fn is_authenticated(&self) -> bool {
        let logged_in = self.storage.get(LOGGED_IN_KEY).as_deref() == Some("true");
        logged_in && self.current_user().is_some()
    }

    /// Persist a freshly logged-in user and announce it
    pub fn set_session(&self, user: &UserProfile) -> ClientResult<()> {
        self.write_session(user)?;
        tracing::info!(user_id = user.id, "Session established");
        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Replace the stored user without announcing a login
    ///
    /// Used when the backend hands back a refreshed copy of the same identity.
    pub fn refresh_user(&self, user: &UserProfile) -> ClientResult<()> {
        self.write_session(user)
    }

    /// Remove both keys. Storage failures are logged, never returned.
    pub fn clear(&self) {
        // flag first, so a torn state never reads as logged in
        if let Err(e) = self.storage.remove(LOGGED_IN_KEY) {
            tracing::warn!(error = %e, "Failed to remove login flag");
        }
        if let Err(e) = self.storage.remove(USER_KEY) {
            tracing::warn!(error = %e, "Failed to remove session user");
        }
        tracing::info!("Session cleared");
        self.emit(SessionEvent::Cleared);
    }

    /// Signal that the storage was changed by someone else
    pub fn notify_external_change(&self) {
        self.emit(SessionEvent::ExternalChange);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn write_session(&self, user: &UserProfile) -> ClientResult<()> {
        let json = serde_json::to_string(user)?;
        // user first, so the flag never points at a missing user
        self.storage.set(USER_KEY, &json)?;
        self.storage.set(LOGGED_IN_KEY, "true")?;
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
