//! Forgot-password reset and signed-in password change.

use secrecy::SecretString;

use super::{AccountController, FlowPurpose, VerificationTicket};
use crate::error::AccountError;
use crate::services::account_client::{PasswordResetCompleted, PasswordResetStarted};

impl AccountController {
    /// Start a password reset for the account behind `email`.
    pub async fn begin_password_reset(
        &mut self,
        email: &str,
    ) -> Result<PasswordResetStarted, AccountError> {
        let started = self.channel.forgot_password(email).await?;
        self.password_reset.initiated(VerificationTicket {
            user_id: started.user_id.clone(),
            purpose: FlowPurpose::ForgotPassword,
            target_email: None,
        });
        tracing::info!(user_id = %started.user_id, "password reset initiated");
        Ok(started)
    }

    /// Redeem the OTP and set the new password.
    ///
    /// Completion never authenticates — it only reports the account email,
    /// and the user signs in with the new password afterward. This is a
    /// deliberate asymmetry with registration.
    pub async fn complete_password_reset(
        &mut self,
        otp: &str,
        new_password: &SecretString,
    ) -> Result<PasswordResetCompleted, AccountError> {
        let ticket = self
            .password_reset
            .pending()
            .cloned()
            .ok_or_else(|| AccountError::validation("no password reset awaiting verification"))?;
        let completed = self
            .channel
            .reset_password(&ticket.user_id, otp, new_password)
            .await?;
        self.password_reset.completed();
        tracing::info!(user_id = %ticket.user_id, "password reset complete");
        Ok(completed)
    }

    /// Change the signed-in user's password. No OTP step: the current
    /// password authorizes the change. Requires a session.
    pub async fn change_password(
        &mut self,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<Option<String>, AccountError> {
        let user_id = self.require_session_user()?;
        self.channel
            .change_password(&user_id, current_password, new_password)
            .await
    }
}
