use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket lifecycle states, stored as their SCREAMING_SNAKE_CASE names
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Being written by its creator, not yet submitted
    #[default]
    Draft,
    /// Submitted for review
    Created,
    /// Approved by an officer, waiting to be activated
    Approved,
    /// Accepted for work
    Active,
    /// Work has started
    InProgress,
    /// Work is done and documented, waiting for sign-off
    Resolved,
    /// Signed off
    Completed,
    /// Archived; may be reopened
    Closed,
    /// Withdrawn; may be reinstated
    Cancelled,
}

impl TicketStatus {
    /// Every status, in lifecycle order
    pub const ALL: [TicketStatus; 9] = [
        Self::Draft,
        Self::Created,
        Self::Approved,
        Self::Active,
        Self::InProgress,
        Self::Resolved,
        Self::Completed,
        Self::Closed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Created => "CREATED",
            Self::Approved => "APPROVED",
            Self::Active => "ACTIVE",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Completed => "COMPLETED",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Tickets may only be deleted (and edited by their employee creator) before review starts
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::Draft | Self::Created)
    }

    /// Check if work on the ticket is still outstanding
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed | Self::Closed | Self::Cancelled)
    }

    /// Human label used on dashboards
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Created => "Created",
            Self::Approved => "Approved",
            Self::Active => "Active",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Completed => "Completed",
            Self::Closed => "Closed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "CREATED" => Ok(Self::Created),
            "APPROVED" => Ok(Self::Approved),
            "ACTIVE" => Ok(Self::Active),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            "COMPLETED" => Ok(Self::Completed),
            "CLOSED" => Ok(Self::Closed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid ticket status: {s}")),
        }
    }
}

/// Workflow step states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl StepStatus {
    pub const ALL: [StepStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}
