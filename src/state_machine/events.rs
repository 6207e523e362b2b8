use super::states::TicketStatus;
use serde::{Deserialize, Serialize};

/// Named edges of the ticket transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketEvent {
    /// DRAFT -> CREATED
    Submit,
    /// CREATED -> APPROVED
    Approve,
    /// CREATED/APPROVED -> ACTIVE
    Activate,
    /// ACTIVE -> IN_PROGRESS
    Start,
    /// IN_PROGRESS -> RESOLVED
    Resolve,
    /// ACTIVE/RESOLVED -> COMPLETED
    Complete,
    /// COMPLETED -> CLOSED
    Close,
    /// COMPLETED/CLOSED -> ACTIVE
    Reopen,
    /// any open state -> CANCELLED
    Cancel,
    /// CANCELLED -> CREATED
    Reinstate,
}

impl TicketEvent {
    /// Name the edge `from -> to`, or `None` if the pair is not an edge of the table
    pub fn from_transition(from: TicketStatus, to: TicketStatus) -> Option<Self> {
        use TicketStatus::*;
        let event = match (from, to) {
            (Draft, Created) => Self::Submit,
            (Created, Approved) => Self::Approve,
            (Created | Approved, Active) => Self::Activate,
            (Active, InProgress) => Self::Start,
            (InProgress, Resolved) => Self::Resolve,
            (Active | Resolved, Completed) => Self::Complete,
            (Completed, Closed) => Self::Close,
            (Completed | Closed, Active) => Self::Reopen,
            (Created | Approved | Active | InProgress, Cancelled) => Self::Cancel,
            (Cancelled, Created) => Self::Reinstate,
            _ => return None,
        };
        Some(event)
    }

    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Submit => "submitted",
            Self::Approve => "approved",
            Self::Activate => "activated",
            Self::Start => "started",
            Self::Resolve => "resolved",
            Self::Complete => "completed",
            Self::Close => "closed",
            Self::Reopen => "reopened",
            Self::Cancel => "cancelled",
            Self::Reinstate => "reinstated",
        }
    }

    /// Action label shown to the person requesting the transition
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submit => "Submit for Review",
            Self::Approve => "Approve Ticket",
            Self::Activate => "Activate Ticket",
            Self::Start => "Start Work",
            Self::Resolve => "Resolve Ticket",
            Self::Complete => "Mark Complete",
            Self::Close => "Close Ticket",
            Self::Reopen => "Reopen Ticket",
            Self::Cancel => "Cancel Ticket",
            Self::Reinstate => "Reinstate Ticket",
        }
    }

    /// Check if this event moves a ticket back into the working part of the lifecycle
    pub fn is_reversal(&self) -> bool {
        matches!(self, Self::Reopen | Self::Reinstate)
    }
}
