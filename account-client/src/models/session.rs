//! The locally persisted identity snapshot consumed by the route guard.

use serde::{Deserialize, Serialize};

use crate::models::user::{UserRecord, UserRole};

/// Snapshot of the persisted session.
///
/// Invariant: `authenticated` implies `user_id` is present and non-empty.
/// The store upholds this on write and re-checks it on read, so a guard
/// consulting a snapshot can trust the flag without a network round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub authenticated: bool,
}

impl SessionRecord {
    /// The empty, signed-out record.
    pub fn unauthenticated() -> Self {
        Self {
            user_id: None,
            name: String::new(),
            email: String::new(),
            role: UserRole::User,
            authenticated: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.authenticated && self.role == UserRole::Admin
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

impl From<&UserRecord> for SessionRecord {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: Some(user.id.clone()),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            authenticated: true,
        }
    }
}
