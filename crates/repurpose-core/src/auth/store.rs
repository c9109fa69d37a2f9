use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::models::User;
use crate::storage::{SharedStorage, StorageResult, ACCESS_TOKEN_KEY, SESSION_KEYS};

/// Authentication state as the UI sees it.
///
/// `Unverified` means a token was found in storage but nothing has
/// confirmed it yet. It counts as authenticated: screens render
/// optimistically while the profile fetch is in flight, and a failed
/// fetch moves the state back to `Anonymous`.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Anonymous,
    Unverified,
    Verified(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthState::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Verified(user) => Some(user),
            _ => None,
        }
    }
}

/// Observable, process-wide mirror of the authentication state.
///
/// Transitions:
/// - `init_auth` with a stored access token: `Anonymous -> Unverified`
/// - `set_user(Some(_))`: any state `-> Verified`
/// - `set_user(None)` or `logout`: any state `-> Anonymous`
///
/// Clones share the same state.
#[derive(Clone)]
pub struct AuthStore {
    storage: SharedStorage,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthStore {
    pub fn new(storage: SharedStorage) -> Self {
        let (tx, _rx) = watch::channel(AuthState::Anonymous);
        Self {
            storage,
            state: Arc::new(tx),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Watch every state transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Replace the current user. `None` signs the store out without
    /// touching storage.
    pub fn set_user(&self, user: Option<User>) {
        let next = match user {
            Some(user) => AuthState::Verified(user),
            None => AuthState::Anonymous,
        };
        self.state.send_replace(next);
    }

    /// Local sign-out: remove the stored session keys and reset the state.
    /// No backend call is made.
    ///
    /// The state is reset even if storage fails; the first storage error is
    /// returned afterwards.
    pub fn logout(&self) -> StorageResult<()> {
        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        self.reset();
        info!("Logged out");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Optimistically treat a stored access token as a live session.
    /// Returns whether a token was found. The token is not validated.
    pub fn init_auth(&self) -> StorageResult<bool> {
        let has_token = self.storage.contains(ACCESS_TOKEN_KEY)?;
        if has_token {
            self.state.send_if_modified(|state| {
                if matches!(state, AuthState::Anonymous) {
                    *state = AuthState::Unverified;
                    true
                } else {
                    false
                }
            });
        }
        debug!(has_token, "Auth initialised from storage");
        Ok(has_token)
    }

    pub(crate) fn reset(&self) {
        self.state.send_replace(AuthState::Anonymous);
    }
}
