//! OTP-gated email change for the signed-in user.

use super::{AccountController, FlowPurpose, VerificationTicket};
use crate::error::AccountError;
use crate::session::SessionPatch;

impl AccountController {
    /// Send an OTP to the address the user wants to move to. Requires a
    /// session; the ticket remembers the target address.
    pub async fn begin_email_change(
        &mut self,
        new_email: &str,
    ) -> Result<Option<String>, AccountError> {
        let user_id = self.require_session_user()?;
        let message = self
            .channel
            .initiate_email_change(&user_id, new_email)
            .await?;
        self.email_change.initiated(VerificationTicket {
            user_id,
            purpose: FlowPurpose::ChangeEmail,
            target_email: Some(new_email.to_string()),
        });
        tracing::info!("email change initiated");
        Ok(message)
    }

    /// Redeem the OTP. On success only the session `email` field is
    /// patched; name, role and the authenticated flag are untouched.
    pub async fn complete_email_change(
        &mut self,
        otp: &str,
    ) -> Result<Option<String>, AccountError> {
        let ticket = self
            .email_change
            .pending()
            .cloned()
            .ok_or_else(|| AccountError::validation("no email change awaiting verification"))?;
        let target = ticket
            .target_email
            .clone()
            .ok_or_else(|| AccountError::validation("email-change ticket has no target address"))?;
        let message = self
            .channel
            .verify_email_change(&ticket.user_id, otp, &target)
            .await?;
        self.session.patch(SessionPatch {
            email: Some(target),
            ..Default::default()
        })?;
        self.email_change.completed();
        tracing::info!("email change complete");
        Ok(message)
    }
}
