//! Local session persistence.
//!
//! The store is the single source of truth the route guard consults; it is
//! written only by the account controller and performs no network I/O. The
//! durable surface keeps the key names the account service ecosystem has
//! always used (`userId`, `userName`, `userEmail`, `userRole`,
//! `isLoggedIn`).

mod backend;

pub use backend::{FileBackend, MemoryBackend, SessionBackend};

use std::path::Path;

use crate::error::AccountError;
use crate::models::{SessionRecord, UserRecord, UserRole};

const KEY_USER_ID: &str = "userId";
const KEY_USER_NAME: &str = "userName";
const KEY_USER_EMAIL: &str = "userEmail";
const KEY_USER_ROLE: &str = "userRole";
const KEY_LOGGED_IN: &str = "isLoggedIn";

/// Fields a `patch` may update. The authenticated flag is deliberately not
/// among them.
#[derive(Debug, Default, Clone)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// The persisted identity record with an explicit init/clear lifecycle.
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn SessionBackend>) -> Self {
        Self { backend }
    }

    /// Open a store over the durable file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AccountError> {
        Ok(Self::new(Box::new(FileBackend::open(path)?)))
    }

    /// In-memory store; nothing survives the process.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Replace the full record and mark the session authenticated.
    pub fn set(&mut self, user: &UserRecord) -> Result<(), AccountError> {
        if user.id.is_empty() {
            return Err(AccountError::validation(
                "refusing to persist a session without a user id",
            ));
        }
        self.backend.insert(KEY_USER_ID, user.id.clone());
        self.backend.insert(KEY_USER_NAME, user.name.clone());
        self.backend.insert(KEY_USER_EMAIL, user.email.clone());
        self.backend
            .insert(KEY_USER_ROLE, user.role.as_str().to_string());
        self.backend.insert(KEY_LOGGED_IN, "true".to_string());
        self.backend.flush()?;
        tracing::info!(user_id = %user.id, "session established");
        Ok(())
    }

    /// Update a subset of fields without touching the authenticated flag.
    pub fn patch(&mut self, fields: SessionPatch) -> Result<(), AccountError> {
        if let Some(name) = fields.name {
            self.backend.insert(KEY_USER_NAME, name);
        }
        if let Some(email) = fields.email {
            self.backend.insert(KEY_USER_EMAIL, email);
        }
        if let Some(role) = fields.role {
            self.backend
                .insert(KEY_USER_ROLE, role.as_str().to_string());
        }
        self.backend.flush()
    }

    /// Remove every field; `is_authenticated` is false afterward.
    pub fn clear(&mut self) -> Result<(), AccountError> {
        for key in [
            KEY_USER_ID,
            KEY_USER_NAME,
            KEY_USER_EMAIL,
            KEY_USER_ROLE,
            KEY_LOGGED_IN,
        ] {
            self.backend.remove(key);
        }
        self.backend.flush()
    }

    /// True iff the persisted record carries the logged-in flag and a
    /// non-empty user id. A surface claiming the flag without an id is
    /// treated as signed out.
    pub fn is_authenticated(&self) -> bool {
        self.backend.get(KEY_LOGGED_IN).as_deref() == Some("true")
            && self
                .backend
                .get(KEY_USER_ID)
                .is_some_and(|id| !id.is_empty())
    }

    /// The authenticated user id. `None` means "no session" and is never
    /// substituted with a default identity.
    pub fn current_user_id(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.backend.get(KEY_USER_ID).filter(|id| !id.is_empty())
    }

    /// Snapshot for the route guard.
    pub fn current(&self) -> SessionRecord {
        let authenticated = self.is_authenticated();
        SessionRecord {
            user_id: if authenticated {
                self.backend.get(KEY_USER_ID)
            } else {
                None
            },
            name: self.backend.get(KEY_USER_NAME).unwrap_or_default(),
            email: self.backend.get(KEY_USER_EMAIL).unwrap_or_default(),
            role: self
                .backend
                .get(KEY_USER_ROLE)
                .map(|raw| UserRole::parse(&raw))
                .unwrap_or_default(),
            authenticated,
        }
    }
}
