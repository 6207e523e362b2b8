//! Input validation for ticket and step operations.
//!
//! Every check here runs before a mutation is applied, so a failure never
//! leaves partial state or an audit entry behind.

use crate::constants::MAX_TITLE_LENGTH;
use crate::error::{Result, TicketingError};
use crate::models::{NewTicket, TicketModule};
use crate::state_machine::TicketStatus;

pub fn validate_title(title: &str) -> Result<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TicketingError::ValidationError(
            "Title must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(TicketingError::ValidationError(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_category(module: &TicketModule, category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(TicketingError::ValidationError(
            "Category must not be empty".to_string(),
        ));
    }
    if !module.accepts_category(category) {
        return Err(TicketingError::ValidationError(format!(
            "Category '{category}' is not available in module {}",
            module.name
        )));
    }
    Ok(())
}

pub fn validate_step_number(step_number: &str) -> Result<()> {
    if step_number.trim().is_empty() {
        return Err(TicketingError::ValidationError(
            "Step number must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Module must be active, fields present, and the initial status DRAFT or CREATED
pub fn validate_new_ticket(module: &TicketModule, input: &NewTicket) -> Result<()> {
    if !module.active {
        return Err(TicketingError::ValidationError(format!(
            "Module {} is not accepting tickets",
            module.name
        )));
    }
    validate_title(&input.title)?;
    validate_category(module, &input.category)?;
    if input.department.trim().is_empty() {
        return Err(TicketingError::ValidationError(
            "Department must not be empty".to_string(),
        ));
    }
    if !matches!(
        input.initial_status,
        TicketStatus::Draft | TicketStatus::Created
    ) {
        return Err(TicketingError::ValidationError(format!(
            "Tickets can only be created as DRAFT or CREATED, not {}",
            input.initial_status
        )));
    }
    Ok(())
}
