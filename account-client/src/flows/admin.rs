//! Admin operations that act on behalf of the signed-in administrator.
//!
//! The channel takes the acting identity as parameters; these wrappers
//! resolve it from the session so views never thread it through. Read-only
//! admin queries (list, search, stats) go straight to the channel.

use super::AccountController;
use crate::error::AccountError;
use crate::models::UserRecord;
use crate::services::account_client::AdminUserUpdate;

impl AccountController {
    /// Cascade-delete a user account and its notes/tags.
    pub async fn delete_user(&self, user_id: &str) -> Result<Option<String>, AccountError> {
        let admin_id = self.require_session_user()?;
        let admin_name = self.acting_admin_name();
        self.channel
            .delete_user(user_id, &admin_id, &admin_name)
            .await
    }

    /// Rewrite another account's fields.
    pub async fn update_user(
        &self,
        user_id: &str,
        update: AdminUserUpdate,
    ) -> Result<UserRecord, AccountError> {
        self.require_session_user()?;
        let admin_name = self.acting_admin_name();
        self.channel
            .update_user_admin(user_id, &update, &admin_name)
            .await
    }
}
