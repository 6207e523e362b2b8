//! # Ticket Scopes
//!
//! Chainable filters applied to the tickets an actor can already see.
//! Every criterion that is set must match; unset criteria match everything.

use crate::constants::UNASSIGNED;
use crate::models::{Priority, Ticket};
use crate::state_machine::TicketStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssigneeFilter {
    Unassigned,
    User(Uuid),
}

impl AssigneeFilter {
    pub fn matches(&self, assigned_to: Option<Uuid>) -> bool {
        match self {
            Self::Unassigned => assigned_to.is_none(),
            Self::User(id) => assigned_to == Some(*id),
        }
    }
}

impl FromStr for AssigneeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(UNASSIGNED) {
            return Ok(Self::Unassigned);
        }
        Uuid::parse_str(s)
            .map(Self::User)
            .map_err(|_| format!("Invalid assignee filter: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilters {
    /// Case-insensitive substring over id, number, title and description
    pub search: Option<String>,
    pub status: Option<TicketStatus>,
    pub assigned_to: Option<AssigneeFilter>,
    pub department: Option<String>,
    pub priority: Option<Priority>,
    pub created_by: Option<Uuid>,
}

impl TicketFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn assigned_to(mut self, filter: AssigneeFilter) -> Self {
        self.assigned_to = Some(filter);
        self
    }

    pub fn in_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn created_by(mut self, user_id: Uuid) -> Self {
        self.created_by = Some(user_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim) {
            if !term.is_empty() && !matches_search(ticket, term) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self
            .assigned_to
            .is_some_and(|a| !a.matches(ticket.assigned_to))
        {
            return false;
        }
        if let Some(department) = &self.department {
            if !department.eq_ignore_ascii_case(&ticket.department) {
                return false;
            }
        }
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        if self.created_by.is_some_and(|c| c != ticket.created_by) {
            return false;
        }
        true
    }

    pub fn apply(&self, tickets: Vec<Ticket>) -> Vec<Ticket> {
        tickets.into_iter().filter(|t| self.matches(t)).collect()
    }
}

fn matches_search(ticket: &Ticket, term: &str) -> bool {
    let needle = term.to_lowercase();
    [
        ticket.id.to_string(),
        ticket.ticket_number.to_lowercase(),
        ticket.title.to_lowercase(),
        ticket.description.to_lowercase(),
    ]
    .iter()
    .any(|haystack| haystack.contains(&needle))
}

/// Ticket count per status, with every status present (zero when absent)
pub fn status_counts<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> BTreeMap<TicketStatus, usize> {
    let mut counts: BTreeMap<TicketStatus, usize> =
        TicketStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for ticket in tickets {
        *counts.entry(ticket.status).or_insert(0) += 1;
    }
    counts
}
