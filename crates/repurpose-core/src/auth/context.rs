use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::storage::{
    SharedStorage, StorageResult, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_EMAIL_KEY,
};

use super::guard::Route;
use super::store::AuthStore;

/// Moves the application to another route.
///
/// The gateway uses it to send the user to the login route when the
/// session can no longer be recovered.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(path.to_string());
        }
    }
}

/// Everything a client session is bound to: where credentials persist,
/// how to navigate, and the in-memory auth mirror.
///
/// Passed explicitly to [`ApiClient`](crate::api::ApiClient) so that
/// independent sessions can coexist in one process. Clones share state.
#[derive(Clone)]
pub struct SessionContext {
    storage: SharedStorage,
    navigator: Arc<dyn Navigator>,
    auth: AuthStore,
}

impl SessionContext {
    pub fn new(storage: SharedStorage, navigator: Arc<dyn Navigator>) -> Self {
        let auth = AuthStore::new(storage.clone());
        Self {
            storage,
            navigator,
            auth,
        }
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn access_token(&self) -> StorageResult<Option<String>> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    pub fn user_email(&self) -> StorageResult<Option<String>> {
        self.storage.get(USER_EMAIL_KEY)
    }

    /// Persist the credentials of a fresh login.
    pub fn store_tokens(&self, access_token: &str, refresh_token: &str, email: &str) -> StorageResult<()> {
        self.storage.set(ACCESS_TOKEN_KEY, access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh_token)?;
        self.storage.set(USER_EMAIL_KEY, email)?;
        Ok(())
    }

    /// Tear the session down after an unrecoverable authentication failure:
    /// wipe storage, reset the auth mirror, go to the login route.
    pub fn end_session(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear session storage");
        }
        self.auth.reset();
        info!("Session ended, redirecting to login");
        self.navigator.redirect(Route::Login.path());
    }
}
