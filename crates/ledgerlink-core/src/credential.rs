//! Session credential store
//!
//! Holds the login flag and the plaintext session password. Every change is
//! written through to a [`SessionStorage`] backend so a restarted process picks
//! up the same session until logout clears it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::{CoreError, CoreResult};

const LOGGED_IN_KEY: &str = "isLoggedIn";
const PASSWORD_KEY: &str = "user_password";

/// Key-value backend for session state
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Process-local storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// JSON file backend
///
/// The file is rewritten on every change and deleted once it holds no keys.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, starting empty if it does not exist
    pub fn open(path: PathBuf) -> CoreResult<Self> {
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| CoreError::StorageError {
                message: format!("{}: {}", path.display(), e),
            })?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> CoreResult<()> {
        if values.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        let content = serde_json::to_string_pretty(values).map_err(|e| CoreError::StorageError {
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        self.persist(&values)
    }
}

/// Snapshot of the session credential
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub logged_in: bool,
    /// Present only while `logged_in`
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Credential {
    pub fn can_sign(&self) -> bool {
        self.password.is_some()
    }
}

/// Single-slot session credential
pub struct CredentialStore {
    storage: Arc<dyn SessionStorage>,
    guard: Mutex<()>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            guard: Mutex::new(()),
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    /// Store the session password and mark the session logged in
    pub fn set_session(&self, password: &str) -> CoreResult<()> {
        if password.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Cannot store an empty password".to_string(),
            });
        }
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.storage.set(PASSWORD_KEY, password)?;
        self.storage.set(LOGGED_IN_KEY, "true")?;
        log::info!(target: "ledgerlink::session", "Session started");
        Ok(())
    }

    /// Erase the login flag and the password together
    pub fn clear_session(&self) -> CoreResult<()> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.storage.remove(LOGGED_IN_KEY)?;
        self.storage.remove(PASSWORD_KEY)?;
        log::info!(target: "ledgerlink::session", "Session cleared");
        Ok(())
    }

    /// Atomic read of flag and password
    pub fn credential(&self) -> Credential {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let logged_in = self.storage.get(LOGGED_IN_KEY).as_deref() == Some("true");
        let password = if logged_in {
            self.storage.get(PASSWORD_KEY).filter(|p| !p.is_empty())
        } else {
            None
        };
        Credential { logged_in, password }
    }

    pub fn password(&self) -> Option<String> {
        let password = self.credential().password;
        if password.is_none() {
            log::debug!(target: "ledgerlink::session", "No session password; requests go out unsigned");
        }
        password
    }

    pub fn is_logged_in(&self) -> bool {
        self.credential().logged_in
    }
}
