//! Two-step registration: initiate with an email, complete with the
//! emailed OTP.

use secrecy::SecretString;

use super::{AccountController, FlowPurpose, VerificationTicket};
use crate::error::AccountError;
use crate::models::UserRecord;
use crate::services::account_client::RegistrationStarted;

impl AccountController {
    /// Step 1: ask the account service to email an OTP.
    ///
    /// Success parks the flow in `PendingOtp`; calling this again replaces
    /// the unconsumed ticket (restart semantics).
    pub async fn begin_registration(
        &mut self,
        email: &str,
        name: Option<&str>,
    ) -> Result<RegistrationStarted, AccountError> {
        let started = self.channel.initiate_register(email, name).await?;
        self.registration.initiated(VerificationTicket {
            user_id: started.user_id.clone(),
            purpose: FlowPurpose::Register,
            target_email: None,
        });
        tracing::info!(
            user_id = %started.user_id,
            is_new_user = started.is_new_user,
            "registration initiated"
        );
        Ok(started)
    }

    /// Step 2: redeem the OTP, set credentials and authenticate.
    ///
    /// A rejected OTP leaves the flow in `PendingOtp`; the caller may retry
    /// or request a resend. The session is written only on success.
    pub async fn complete_registration(
        &mut self,
        otp: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<UserRecord, AccountError> {
        let ticket = self
            .registration
            .pending()
            .cloned()
            .ok_or_else(|| AccountError::validation("no registration awaiting verification"))?;
        let user = self
            .channel
            .verify_register(&ticket.user_id, otp, password, name)
            .await?;
        self.session.set(&user)?;
        self.registration.completed();
        tracing::info!(user_id = %user.id, "registration complete");
        Ok(user)
    }

    /// Ask for a fresh OTP for the pending registration. A self-loop: the
    /// ticket is untouched, so correlation with the initiate survives.
    pub async fn resend_registration_otp(&mut self) -> Result<Option<String>, AccountError> {
        let ticket = self
            .registration
            .pending()
            .cloned()
            .ok_or_else(|| AccountError::validation("no registration awaiting verification"))?;
        self.channel.resend_otp(&ticket.user_id).await
    }

    /// Complete verification for an existing account parked here by a
    /// `requiresVerification` login outcome. Unlike
    /// [`complete_registration`](Self::complete_registration) this sets no
    /// password; the account already has one.
    pub async fn confirm_email(&mut self, otp: &str) -> Result<UserRecord, AccountError> {
        let ticket = self
            .registration
            .pending()
            .cloned()
            .ok_or_else(|| AccountError::validation("no verification pending"))?;
        let user = self.channel.verify_email(&ticket.user_id, otp).await?;
        self.session.set(&user)?;
        self.registration.completed();
        tracing::info!(user_id = %user.id, "email verified, session established");
        Ok(user)
    }
}
