//! Durable key-value surface behind the session store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AccountError;

/// Synchronous key-value backend. Mutations take effect in memory
/// immediately; `flush` makes them durable.
pub trait SessionBackend: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn insert(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn flush(&mut self) -> Result<(), AccountError>;
}

/// JSON-file backend; the session survives process restarts on the same
/// device.
pub struct FileBackend {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileBackend {
    /// Open (or create) the session file at `path`.
    ///
    /// A file that fails to parse is read as an empty surface: the user
    /// ends up signed out instead of inheriting a half-written identity.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AccountError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "session file unreadable, starting signed out"
                    );
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(AccountError::Storage(err)),
        };

        Ok(Self { path, entries })
    }
}

impl SessionBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn flush(&mut self) -> Result<(), AccountError> {
        let raw = serde_json::to_string_pretty(&self.entries).map_err(|err| {
            AccountError::Storage(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
        })?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn flush(&mut self) -> Result<(), AccountError> {
        Ok(())
    }
}
