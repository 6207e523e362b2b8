use super::errors::{GuardError, GuardResult};
use crate::models::{Ticket, TicketStep, UploadedFile};

/// Trait for implementing state transition guards
pub trait StateGuard<T: ?Sized> {
    /// Check if a transition is allowed
    fn check(&self, entity: &T) -> GuardResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Every mandatory document requirement on every step must hold a file
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryDocumentsGuard;

impl StateGuard<Ticket> for MandatoryDocumentsGuard {
    fn check(&self, ticket: &Ticket) -> GuardResult<()> {
        let missing = ticket.unmet_mandatory_requirements();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GuardError::MissingMandatoryDocuments { missing })
        }
    }

    fn description(&self) -> &'static str {
        "All mandatory step documents must be uploaded"
    }
}

/// A step about to be completed together with the files sent along
#[derive(Debug, Clone, Copy)]
pub struct StepCompletion<'a> {
    pub step: &'a TicketStep,
    pub files: &'a [UploadedFile],
}

/// Completion must be accompanied by at least one non-empty file
#[derive(Debug, Clone, Copy, Default)]
pub struct StepCompletionFileGuard;

impl StateGuard<StepCompletion<'_>> for StepCompletionFileGuard {
    fn check(&self, completion: &StepCompletion<'_>) -> GuardResult<()> {
        if completion.files.iter().any(|f| !f.is_empty()) {
            Ok(())
        } else {
            Err(GuardError::FileUploadRequired {
                step_number: completion.step.step_number.clone(),
            })
        }
    }

    fn description(&self) -> &'static str {
        "Step completion requires an uploaded document"
    }
}

/// Remarks shorter than `minimum` characters (after trimming) are rejected
#[derive(Debug, Clone, Copy)]
pub struct RemarkLengthGuard {
    pub minimum: usize,
}

impl RemarkLengthGuard {
    pub fn new(minimum: usize) -> Self {
        Self { minimum }
    }
}

impl Default for RemarkLengthGuard {
    fn default() -> Self {
        Self::new(crate::constants::MIN_REMARK_LENGTH)
    }
}

impl StateGuard<str> for RemarkLengthGuard {
    fn check(&self, remarks: &str) -> GuardResult<()> {
        let actual = remarks.trim().chars().count();
        if actual < self.minimum {
            return Err(GuardError::RemarksTooShort {
                minimum: self.minimum,
                actual,
            });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Remarks must meet the minimum length"
    }
}
