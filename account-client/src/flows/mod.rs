//! Multi-step account flows.
//!
//! Each sensitive operation (registration, password reset, email change)
//! is a two-step exchange: an initiating call that makes the service email
//! an OTP, and a completion call that redeems it. The controller sequences
//! those steps, keeps the per-flow state machine, and is the only writer
//! into the session store. Side effects are committed on final success
//! only; an OTP rejection is surfaced, never retried here.

pub mod admin;
pub mod email_change;
pub mod password;
pub mod profile;
pub mod registration;
pub mod session;

use crate::config::Settings;
use crate::error::AccountError;
use crate::services::account_client::AccountClient;
use crate::session::SessionStore;

/// What a pending OTP exchange is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPurpose {
    Register,
    ForgotPassword,
    ChangeEmail,
}

impl FlowPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowPurpose::Register => "register",
            FlowPurpose::ForgotPassword => "forgot_password",
            FlowPurpose::ChangeEmail => "change_email",
        }
    }
}

/// Correlation state linking an initiating request to its completion step.
///
/// Never persisted: a reload mid-flow abandons the flow and the user
/// starts over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationTicket {
    pub user_id: String,
    pub purpose: FlowPurpose,
    /// Only meaningful for `ChangeEmail`: the address being verified.
    pub target_email: Option<String>,
}

/// Tagged flow state. An OTP rejection is not a transition: the flow stays
/// in `PendingOtp` and the user may retry or request a resend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Start,
    PendingOtp(VerificationTicket),
    Completed,
}

impl FlowState {
    /// Ticket awaiting its completion step, if any.
    pub fn pending(&self) -> Option<&VerificationTicket> {
        match self {
            FlowState::PendingOtp(ticket) => Some(ticket),
            _ => None,
        }
    }

    /// A successful initiate moves any state to `PendingOtp`, replacing a
    /// prior unconsumed ticket of the same purpose.
    pub fn initiated(&mut self, ticket: VerificationTicket) {
        if let FlowState::PendingOtp(prior) = self {
            tracing::debug!(
                purpose = prior.purpose.as_str(),
                "replacing unconsumed verification ticket"
            );
        }
        *self = FlowState::PendingOtp(ticket);
    }

    /// A successful completion consumes the ticket.
    pub fn completed(&mut self) -> Option<VerificationTicket> {
        match std::mem::take(self) {
            FlowState::PendingOtp(ticket) => {
                *self = FlowState::Completed;
                Some(ticket)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Abandon the flow; the ticket, if any, is discarded.
    pub fn reset(&mut self) {
        *self = FlowState::Start;
    }
}

/// Orchestrates multi-step flows and owns the only write path into the
/// session store.
///
/// Flow methods take `&mut self`, so a second initiate cannot overlap one
/// already in flight: the at-most-once property per submission is enforced
/// by exclusive access rather than caller discipline. Restarting a flow
/// whose initiate already completed replaces the prior ticket.
pub struct AccountController {
    channel: AccountClient,
    session: SessionStore,
    registration: FlowState,
    password_reset: FlowState,
    email_change: FlowState,
}

impl AccountController {
    pub fn new(channel: AccountClient, session: SessionStore) -> Self {
        Self {
            channel,
            session,
            registration: FlowState::Start,
            password_reset: FlowState::Start,
            email_change: FlowState::Start,
        }
    }

    /// Wire a controller from configuration: a durable session file plus an
    /// HTTP channel to the configured account service.
    pub fn from_settings(settings: &Settings) -> Result<Self, AccountError> {
        let channel = AccountClient::new(settings.account_service.clone())?;
        let session = SessionStore::open(&settings.session.path)?;
        Ok(Self::new(channel, session))
    }

    /// Read access for guard consumers and views.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Direct channel access for simple proxied calls that neither read
    /// nor write the session (admin queries, notifications).
    pub fn channel(&self) -> &AccountClient {
        &self.channel
    }

    pub fn registration_state(&self) -> &FlowState {
        &self.registration
    }

    pub fn password_reset_state(&self) -> &FlowState {
        &self.password_reset
    }

    pub fn email_change_state(&self) -> &FlowState {
        &self.email_change
    }

    /// The signed-in user id, or a hard validation failure. Absence of a
    /// session is never papered over with a default identity.
    fn require_session_user(&self) -> Result<String, AccountError> {
        self.session
            .current_user_id()
            .ok_or_else(|| AccountError::validation("no authenticated session; sign in first"))
    }

    /// The acting admin's display name, with the service's conventional
    /// fallback for accounts that never set one.
    fn acting_admin_name(&self) -> String {
        let name = self.session.current().name;
        if name.is_empty() {
            "Administrator".to_string()
        } else {
            name
        }
    }
}
