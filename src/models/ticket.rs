use super::audit::AuditEntry;
use super::file::FileRef;
use super::step::TicketStep;
use crate::state_machine::TicketStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

/// The ticket aggregate: classification, lifecycle, ownership, steps and audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    /// Module-prefixed sequential code, unique within the module
    pub ticket_number: String,
    pub module_id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub category: String,
    pub department: String,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub steps: Vec<TicketStep>,
    pub attachments: Vec<FileRef>,
    pub audit_trail: Vec<AuditEntry>,
    /// Number of committed saves; zero until the ticket is first stored
    #[serde(default)]
    pub version: u64,
}

impl Ticket {
    pub fn is_created_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    pub fn step(&self, step_id: Uuid) -> Option<&TicketStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_mut(&mut self, step_id: Uuid) -> Option<&mut TicketStep> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    /// Every unmet mandatory requirement across all steps, as `Step {number}: {name}`
    pub fn unmet_mandatory_requirements(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|step| {
                step.unmet_requirements()
                    .map(move |req| format!("Step {}: {}", step.step_number, req.name))
            })
            .collect()
    }

    pub fn completed_step_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status.is_complete())
            .count()
    }

    /// Append an audit entry and bump `updated_at` to its timestamp
    pub(crate) fn record(&mut self, entry: AuditEntry) {
        self.updated_at = entry.timestamp;
        self.audit_trail.push(entry);
    }
}

/// Input for creating a ticket; number, timestamps and collections are assigned on creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub module_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub category: String,
    pub department: String,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    /// DRAFT or CREATED
    #[serde(default)]
    pub initial_status: TicketStatus,
}

impl NewTicket {
    pub fn new(
        module_id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            category: category.into(),
            department: department.into(),
            assigned_to: None,
            due_date: None,
            initial_status: TicketStatus::Draft,
        }
    }

    pub fn submitted(mut self) -> Self {
        self.initial_status = TicketStatus::Created;
        self
    }
}

/// Partial update of a ticket's descriptive fields; status changes go through the state machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub assigned_to: Option<Option<Uuid>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.department.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
    }

    /// Apply to `ticket`, returning the names of the fields that changed
    pub fn apply(self, ticket: &mut Ticket) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(title) = self.title {
            if title != ticket.title {
                ticket.title = title;
                changed.push("title");
            }
        }
        if let Some(description) = self.description {
            if description != ticket.description {
                ticket.description = description;
                changed.push("description");
            }
        }
        if let Some(priority) = self.priority {
            if priority != ticket.priority {
                ticket.priority = priority;
                changed.push("priority");
            }
        }
        if let Some(category) = self.category {
            if category != ticket.category {
                ticket.category = category;
                changed.push("category");
            }
        }
        if let Some(department) = self.department {
            if department != ticket.department {
                ticket.department = department;
                changed.push("department");
            }
        }
        if let Some(assigned_to) = self.assigned_to {
            if assigned_to != ticket.assigned_to {
                ticket.assigned_to = assigned_to;
                changed.push("assigned_to");
            }
        }
        if let Some(due_date) = self.due_date {
            if due_date != ticket.due_date {
                ticket.due_date = due_date;
                changed.push("due_date");
            }
        }
        changed
    }
}
