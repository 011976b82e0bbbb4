//! Persisted bearer token storage
//!
//! [`LocalStorage`] mirrors the browser's local storage: a small string
//! key/value map, here kept in a JSON file. The token lives under [`TOKEN_KEY`].

use callreview_core::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key the bearer token is stored under
pub const TOKEN_KEY: &str = "token";

/// Source of the bearer token attached to every request
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Current token, if any
    fn token(&self) -> Option<String>;

    /// Replace the stored token
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted.
    fn set_token(&self, token: &str) -> Result<()>;

    /// Forget the stored token; never fails so it can run from any error path
    fn clear_token(&self);
}

/// File-backed string key/value store
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open the store at `path`; a missing or unreadable file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring corrupt storage file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read storage file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            items: Mutex::new(items),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value stored under `key`
    #[must_use]
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    /// Store `value` under `key` and persist
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value.to_string());
        self.persist(&items)
    }

    /// Remove `key` and persist
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock();
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&items)
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(items)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Holds the bearer token; owner read/write only.
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        debug!("Persisted {} storage item(s) to {}", items.len(), self.path.display());
        Ok(())
    }
}

impl TokenStore for LocalStorage {
    fn token(&self) -> Option<String> {
        self.get_item(TOKEN_KEY)
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.set_item(TOKEN_KEY, token)
    }

    fn clear_token(&self) {
        if let Err(e) = self.remove_item(TOKEN_KEY) {
            warn!("Failed to remove stored token: {}", e);
        }
    }
}

/// In-memory token store for ephemeral sessions and tests
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) {
        self.token.lock().take();
    }
}
