use keyring::Entry;
use tracing::debug;

use super::{Storage, StorageResult, SESSION_KEYS};

/// Default keychain service name
pub const DEFAULT_SERVICE_NAME: &str = "repurpose";

/// Stores each key as its own OS keychain entry under one service name.
///
/// The keychain cannot enumerate entries, so `clear` only removes the
/// session keys.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> StorageResult<Entry> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl Storage for KeyringStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> StorageResult<()> {
        for key in SESSION_KEYS {
            self.remove(key)?;
        }
        debug!(service = %self.service, "Keychain session entries removed");
        Ok(())
    }
}
