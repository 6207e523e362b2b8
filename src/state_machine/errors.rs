use super::states::{StepStatus, TicketStatus};
use crate::error::TicketingError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// Comprehensive error types for state machine operations
#[derive(Error, Debug)]
pub enum StateMachineError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },

    #[error("Invalid step transition from {from} to {to}")]
    InvalidStepTransition { from: StepStatus, to: StepStatus },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Guard condition failed: {0}")]
    GuardFailed(#[from] GuardError),

    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("Persistence operation failed: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Specific error type for guard condition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Missing mandatory documents: {}", .missing.join("; "))]
    MissingMandatoryDocuments { missing: Vec<String> },

    #[error("File upload is mandatory when completing step {step_number}")]
    FileUploadRequired { step_number: String },

    #[error("Remarks must be at least {minimum} characters (got {actual})")]
    RemarksTooShort { minimum: usize, actual: usize },
}

/// Specific error type for action execution failures
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Event publishing failed: {event_name}")]
    EventPublishFailed { event_name: String },
}

/// Result type alias for state machine operations
pub type StateMachineResult<T> = Result<T, StateMachineError>;
pub type GuardResult<T> = Result<T, GuardError>;
pub type ActionResult<T> = Result<T, ActionError>;

pub fn unauthorized(reason: impl Into<String>) -> StateMachineError {
    StateMachineError::Unauthorized {
        reason: reason.into(),
    }
}

pub fn not_found(entity: impl Into<String>) -> StateMachineError {
    StateMachineError::NotFound {
        entity: entity.into(),
    }
}

impl From<GuardError> for TicketingError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::MissingMandatoryDocuments { missing } => {
                TicketingError::MissingMandatoryDocuments { missing }
            }
            GuardError::FileUploadRequired { step_number } => TicketingError::FileUploadRequired(
                format!("at least one document must accompany completion of step {step_number}"),
            ),
            err @ GuardError::RemarksTooShort { .. } => {
                TicketingError::ValidationError(err.to_string())
            }
        }
    }
}

impl From<StateMachineError> for TicketingError {
    fn from(err: StateMachineError) -> Self {
        match err {
            StateMachineError::InvalidTransition { from, to } => {
                TicketingError::InvalidTransition { from, to }
            }
            err @ StateMachineError::InvalidStepTransition { .. } => {
                TicketingError::ValidationError(err.to_string())
            }
            StateMachineError::Unauthorized { reason } => TicketingError::Unauthorized(reason),
            StateMachineError::GuardFailed(guard) => guard.into(),
            StateMachineError::NotFound { entity } => TicketingError::NotFound(entity),
            StateMachineError::Persistence(err) => err.into(),
        }
    }
}
