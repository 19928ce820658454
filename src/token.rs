//! Durable storage for the TV pairing token.
//!
//! The TV hands out a token once the user approves this client on screen.
//! Reusing it on later connections skips the approval prompt, so it has to
//! survive process restarts. Storage sits behind [`TokenStore`]; the client
//! only ever touches the single [`REMOTE_TOKEN_KEY`] slot through
//! [`TokenCache`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{RemoteError, Result};

/// Slot name under which the pairing token is stored.
pub const REMOTE_TOKEN_KEY: &str = "remote_token";

/// Key/value store that outlives the process.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Token store backed by a JSON object file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| self.error(e))
    }

    fn error(&self, reason: impl ToString) -> RemoteError {
        RemoteError::token_store(self.path.display().to_string(), reason.to_string())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }

        // Write beside the target and rename so a crash never leaves half a file.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&tmp, content).map_err(|e| self.error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.error(e))?;

        Ok(())
    }
}

/// In-process token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The pairing-token slot of a [`TokenStore`].
#[derive(Clone)]
pub struct TokenCache {
    store: Arc<dyn TokenStore>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Result<Option<String>> {
        self.store.get(REMOTE_TOKEN_KEY)
    }

    pub fn set(&self, token: &str) -> Result<()> {
        self.store.set(REMOTE_TOKEN_KEY, token)
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("key", &REMOTE_TOKEN_KEY)
            .finish_non_exhaustive()
    }
}
