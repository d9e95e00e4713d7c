//! Client-side account core for the note-taking application.
//!
//! Mediates between the UI and the remote account service: every
//! account-sensitive action (registration, login, password reset, email
//! change, profile update) passes through a one-time-passcode challenge
//! before taking effect, and view access is gated by the locally persisted
//! session record.
//!
//! The pieces, leaves first:
//! - [`session::SessionStore`] — the durable identity record.
//! - [`services::account_client::AccountClient`] — stateless HTTP channel
//!   to the account service.
//! - [`flows::AccountController`] — sequences the multi-step flows and owns
//!   every write into the store.
//! - [`routing::authorize`] — the pure navigation guard over a session
//!   snapshot.

pub mod config;
pub mod error;
pub mod flows;
pub mod models;
pub mod observability;
pub mod routing;
pub mod services;
pub mod session;

pub use error::AccountError;
pub use flows::{AccountController, FlowPurpose, FlowState, VerificationTicket};
pub use models::{SessionRecord, UserRecord, UserRole};
pub use routing::{authorize, authorize_route, AppRoute, GuardDecision, RouteRequirements};
pub use services::account_client::{
    AccountClient, AdminUserUpdate, LoginOutcome, NotificationKind, PasswordResetCompleted,
    PasswordResetStarted, ProfileUpdate, RegistrationStarted,
};
pub use session::{SessionPatch, SessionStore};
