//! Crate-level error type.
//!
//! The first five variants are the user-facing rejections of the ticket
//! policy: the caller is expected to re-prompt, and none of them leaves a
//! partial mutation or audit entry behind. `ConcurrentModification` is also
//! user-facing; the caller reloads and retries.

use crate::state_machine::TicketStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketingError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Cannot resolve ticket, missing mandatory documents: {}", .missing.join("; "))]
    MissingMandatoryDocuments { missing: Vec<String> },
    #[error("File upload required: {0}")]
    FileUploadRequired(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),
    #[error("Duplicate ticket number: {0}")]
    DuplicateTicketNumber(String),
    #[error("Persistence error: {0}")]
    PersistenceError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TicketingError {
    /// Rejections the caller should surface to the user and re-prompt on
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::Unauthorized(_)
                | Self::MissingMandatoryDocuments { .. }
                | Self::FileUploadRequired(_)
                | Self::ValidationError(_)
                | Self::ConcurrentModification(_)
        )
    }
}

impl From<serde_json::Error> for TicketingError {
    fn from(error: serde_json::Error) -> Self {
        TicketingError::ValidationError(format!("JSON serialization error: {error}"))
    }
}

impl From<sqlx::Error> for TicketingError {
    fn from(err: sqlx::Error) -> Self {
        TicketingError::PersistenceError(err.to_string())
    }
}

impl From<crate::config::ConfigurationError> for TicketingError {
    fn from(err: crate::config::ConfigurationError) -> Self {
        TicketingError::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TicketingError>;
