//! Single source of truth for who is signed in, durable across reloads.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Error;
use crate::storage::{keys, Storage};
use crate::types::UserIdentity;

/// Snapshot of the current session.
///
/// Authenticated iff both `user` and `token` are present; the fields are
/// only ever set and cleared together, so no other combination is
/// representable for long enough to observe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    user: Option<UserIdentity>,
    token: Option<String>,
}

impl SessionState {
    fn authenticated(user: UserIdentity, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Why a session ended. The UI wordings differ: a voluntary logout is
/// confirmation, an expiry is an apology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// The user signed out on purpose.
    LoggedOut,
    /// The backend rejected the bearer token mid-session.
    Expired,
}

/// Durable session store.
///
/// Constructed once at startup via [`SessionStore::restore`] and passed down
/// to consumers as an explicit handle; there is no ambient global.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Builds the store, restoring any persisted session.
    ///
    /// Fail-closed: a stored token without a parseable user (or the other
    /// way round) yields the anonymous state, and the partial or corrupt
    /// leftovers are deleted rather than silently retained. Restore is
    /// synchronous, so gate checks always see a settled state.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let state = match (storage.get(keys::TOKEN), storage.get(keys::USER)) {
            (Some(token), Some(raw_user)) if !token.is_empty() => {
                match serde_json::from_str::<UserIdentity>(&raw_user) {
                    Ok(user) => {
                        tracing::debug!(user = %user.id, "session restored");
                        SessionState::authenticated(user, token)
                    }
                    Err(err) => {
                        tracing::warn!(%err, "stored user is corrupt, discarding session");
                        storage.remove(keys::TOKEN);
                        storage.remove(keys::USER);
                        SessionState::default()
                    }
                }
            }
            (None, None) => SessionState::default(),
            _ => {
                tracing::warn!("partial session in storage, discarding");
                storage.remove(keys::TOKEN);
                storage.remove(keys::USER);
                SessionState::default()
            }
        };
        Self {
            storage,
            state: Mutex::new(state),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.lock().is_authenticated()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.lock().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserIdentity> {
        self.state.lock().user.clone()
    }

    /// Records a successful authentication and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentialsShape`] if the token is empty or
    /// the user has no id. The session is left untouched in that case — the
    /// storefront used to drop such logins silently, which read as "the
    /// login button does nothing".
    pub fn login(&self, user: UserIdentity, token: impl Into<String>) -> Result<(), Error> {
        let token = token.into();
        if token.is_empty() {
            tracing::error!("login rejected: empty token");
            return Err(Error::InvalidCredentialsShape("token must be non-empty"));
        }
        if user.id.0.is_empty() {
            tracing::error!("login rejected: user without id");
            return Err(Error::InvalidCredentialsShape("user must carry an id"));
        }
        let raw_user = serde_json::to_string(&user)
            .map_err(|_| Error::InvalidCredentialsShape("user must serialize"))?;

        self.storage.set(keys::TOKEN, &token);
        self.storage.set(keys::USER, &raw_user);
        tracing::debug!(user = %user.id, "logged in");
        *self.state.lock() = SessionState::authenticated(user, token);
        Ok(())
    }

    /// Signs the user out. Idempotent.
    ///
    /// Clears the in-memory state and deletes every durable key this crate
    /// owns, including the pending intent and the staged working copy — a
    /// later, possibly different, user must not resume this visitor's
    /// abandoned action.
    pub fn logout(&self) -> SessionSignal {
        self.clear();
        tracing::debug!("logged out");
        SessionSignal::LoggedOut
    }

    /// Handles a backend 401 mid-session: same clearing as [`logout`](Self::logout),
    /// distinct signal so the UI can say "session expired" instead of
    /// "signed out".
    pub fn handle_unauthorized(&self) -> SessionSignal {
        self.clear();
        tracing::warn!("bearer token rejected by backend, session expired");
        SessionSignal::Expired
    }

    /// Marks this visitor as booking without an account. Cleared by logout.
    pub fn set_guest_override(&self) {
        self.storage.set(keys::GUEST, "true");
    }

    #[must_use]
    pub fn guest_override(&self) -> bool {
        self.storage.get(keys::GUEST).is_some()
    }

    pub fn clear_guest_override(&self) {
        self.storage.remove(keys::GUEST);
    }

    fn clear(&self) {
        for key in keys::ALL {
            self.storage.remove(key);
        }
        *self.state.lock() = SessionState::default();
    }
}
