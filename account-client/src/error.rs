use thiserror::Error;

/// Unified failure type for channel, flow and store operations.
///
/// Callers get a result check instead of exception handling: nothing in
/// this crate panics across the controller boundary. The variants separate
/// "retry is sensible" transport failures from remote rejections and from
/// local usage errors.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The account service never answered: connect failure or timeout.
    #[error("connection failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The account service rejected the request with a status and message.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// A success response whose body does not match the contract.
    #[error("invalid response from account service: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// Malformed local state or input (missing ticket, absent session,
    /// bad email). Fatal to the calling flow, never silently defaulted.
    #[error("{0}")]
    Validation(String),

    /// The durable session surface could not be read or written.
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl AccountError {
    /// Transient failures where a caller-driven retry makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AccountError::Network(_))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AccountError::Validation(message.into())
    }
}

impl From<reqwest::Error> for AccountError {
    fn from(err: reqwest::Error) -> Self {
        AccountError::Network(err)
    }
}
