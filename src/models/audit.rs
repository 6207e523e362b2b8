use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of mutation an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Created,
    Updated,
    StatusChange,
    StepAdded,
    StepUpdated,
    StepDeleted,
    Deleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::StatusChange => "STATUS_CHANGE",
            Self::StepAdded => "STEP_ADDED",
            Self::StepUpdated => "STEP_UPDATED",
            Self::StepDeleted => "STEP_DELETED",
            Self::Deleted => "DELETED",
        }
    }

    pub fn is_step_action(&self) -> bool {
        matches!(
            self,
            Self::StepAdded | Self::StepUpdated | Self::StepDeleted
        )
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "UPDATED" => Ok(Self::Updated),
            "STATUS_CHANGE" => Ok(Self::StatusChange),
            "STEP_ADDED" => Ok(Self::StepAdded),
            "STEP_UPDATED" => Ok(Self::StepUpdated),
            "STEP_DELETED" => Ok(Self::StepDeleted),
            "DELETED" => Ok(Self::Deleted),
            _ => Err(format!("Invalid audit action: {s}")),
        }
    }
}

/// Immutable record of a policy-gated mutation.
///
/// Entries are only ever appended to a ticket's trail; there is no API to
/// change or remove one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub remarks: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        ticket_id: Uuid,
        actor_id: Uuid,
        action: AuditAction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            actor_id,
            action,
            old_value: None,
            new_value: None,
            remarks: None,
            timestamp,
        }
    }

    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// One-line description shown in the audit trail view
    pub fn describe(&self) -> String {
        let old = self.old_value.as_deref().unwrap_or("-");
        let new = self.new_value.as_deref().unwrap_or("-");
        match self.action {
            AuditAction::Created => "Ticket created".to_string(),
            AuditAction::Updated => "Ticket updated".to_string(),
            AuditAction::StatusChange => format!("Status changed from {old} to {new}"),
            AuditAction::StepAdded => format!("Added step: {new}"),
            AuditAction::StepUpdated => format!("Updated step: {new}"),
            AuditAction::StepDeleted => format!("Deleted step: {old}"),
            AuditAction::Deleted => "Ticket deleted".to_string(),
        }
    }
}
