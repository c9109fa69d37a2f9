//! Persistent key-value storage for session credentials.
//!
//! The session tokens live in a small key-value area that survives
//! restarts. It is the source of truth for authentication: the in-memory
//! [`AuthStore`](crate::auth::AuthStore) only mirrors it.
//!
//! Backends:
//! - `MemoryStorage`: process-local map, used for tests and throwaway sessions
//! - `FileStorage`: JSON file in the user cache directory
//! - `KeyringStorage`: OS keychain via the `keyring` crate
//!
//! Writers are not coordinated; the last write wins.

pub mod file;
pub mod keychain;
pub mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileStorage;
pub use keychain::KeyringStorage;
pub use memory::MemoryStorage;

/// Key holding the short-lived bearer credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the long-lived credential used to mint new access tokens.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key holding the email of the last successful login.
pub const USER_EMAIL_KEY: &str = "user_email";

/// Every key owned by a session. `logout` and refresh failure remove all of them.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_EMAIL_KEY];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keychain(#[from] keyring::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A flat string key-value store.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Remove everything this store holds.
    fn clear(&self) -> StorageResult<()>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

pub type SharedStorage = Arc<dyn Storage>;

/// Which storage backend to build from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Keyring,
    Memory,
}

impl StorageKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" => Some(StorageKind::File),
            "keyring" | "keychain" => Some(StorageKind::Keyring),
            "memory" => Some(StorageKind::Memory),
            _ => None,
        }
    }
}
