//! Login and logout.

use secrecy::SecretString;

use super::{AccountController, FlowPurpose, VerificationTicket};
use crate::error::AccountError;
use crate::services::account_client::LoginOutcome;

impl AccountController {
    /// Log in with email and password.
    ///
    /// An unverified account is not an error: the registration flow is
    /// parked in `PendingOtp` under the returned user id — no new initiate
    /// call is issued — and the outcome tells the caller to collect the
    /// OTP. Nothing is persisted until verification completes; bad
    /// credentials change no state at all.
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, AccountError> {
        let outcome = self.channel.login(email, password).await?;
        match &outcome {
            LoginOutcome::Authenticated(user) => {
                self.session.set(user)?;
                tracing::info!(user_id = %user.id, "login complete");
            }
            LoginOutcome::RequiresVerification { user_id, .. } => {
                self.registration.initiated(VerificationTicket {
                    user_id: user_id.clone(),
                    purpose: FlowPurpose::Register,
                    target_email: None,
                });
                tracing::info!(user_id = %user_id, "login deferred pending email verification");
            }
        }
        Ok(outcome)
    }

    /// Tear down the local session. Purely local — the service holds no
    /// session to revoke — and any in-progress flow is abandoned with it.
    pub fn logout(&mut self) -> Result<(), AccountError> {
        self.session.clear()?;
        self.registration.reset();
        self.password_reset.reset();
        self.email_change.reset();
        tracing::info!("session cleared");
        Ok(())
    }
}
