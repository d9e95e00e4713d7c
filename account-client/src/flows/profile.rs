//! Direct write-through profile operations.

use super::AccountController;
use crate::error::AccountError;
use crate::models::UserRecord;
use crate::services::account_client::ProfileUpdate;
use crate::session::SessionPatch;

impl AccountController {
    /// Update name and/or email. Fields included in the request are
    /// patched into the session on success — write-through, never
    /// invalidate-and-refetch.
    pub async fn update_profile(
        &mut self,
        update: ProfileUpdate,
    ) -> Result<UserRecord, AccountError> {
        if update.name.is_none() && update.email.is_none() {
            return Err(AccountError::validation("profile update carries no fields"));
        }
        let user_id = self.require_session_user()?;
        let user = self.channel.update_profile(&user_id, &update).await?;
        self.session.patch(SessionPatch {
            name: update.name,
            email: update.email,
            role: None,
        })?;
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}
