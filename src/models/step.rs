use super::file::FileRef;
use crate::state_machine::StepStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    Mandatory,
    Optional,
}

/// A named document slot on a step, holding at most one uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: RequirementKind,
    pub uploaded_file: Option<FileRef>,
}

impl DocumentRequirement {
    pub fn is_mandatory(&self) -> bool {
        self.kind == RequirementKind::Mandatory
    }

    pub fn is_fulfilled(&self) -> bool {
        self.uploaded_file.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepComment {
    pub id: Uuid,
    pub step_id: Uuid,
    pub content: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A workflow unit within a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStep {
    pub id: Uuid,
    pub ticket_id: Uuid,
    /// Advisory label, usually numeric but not required to be
    pub step_number: String,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub reference_files: Vec<FileRef>,
    pub document_requirements: Vec<DocumentRequirement>,
    pub comments: Vec<StepComment>,
    /// Files that accompanied completion or were attached directly
    pub attachments: Vec<FileRef>,
}

impl TicketStep {
    pub fn requirement(&self, requirement_id: Uuid) -> Option<&DocumentRequirement> {
        self.document_requirements
            .iter()
            .find(|r| r.id == requirement_id)
    }

    pub fn requirement_mut(&mut self, requirement_id: Uuid) -> Option<&mut DocumentRequirement> {
        self.document_requirements
            .iter_mut()
            .find(|r| r.id == requirement_id)
    }

    /// Mandatory requirements that still have no file
    pub fn unmet_requirements(&self) -> impl Iterator<Item = &DocumentRequirement> {
        self.document_requirements
            .iter()
            .filter(|r| r.is_mandatory() && !r.is_fulfilled())
    }
}

/// Requirement slot as described when a step is defined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocumentRequirement {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: RequirementKind,
}

impl NewDocumentRequirement {
    pub fn mandatory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: RequirementKind::Mandatory,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: RequirementKind::Optional,
        }
    }

    pub fn into_requirement(self) -> DocumentRequirement {
        DocumentRequirement {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            kind: self.kind,
            uploaded_file: None,
        }
    }
}

/// Input for adding a step to a ticket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStep {
    /// Next free numeric label when omitted
    pub step_number: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reference_files: Vec<FileRef>,
    #[serde(default)]
    pub document_requirements: Vec<NewDocumentRequirement>,
}

impl NewStep {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_requirement(mut self, requirement: NewDocumentRequirement) -> Self {
        self.document_requirements.push(requirement);
        self
    }
}

/// Partial update of a step's descriptive fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUpdate {
    pub step_number: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Option<Uuid>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub add_requirements: Vec<NewDocumentRequirement>,
}

impl StepUpdate {
    pub fn is_empty(&self) -> bool {
        self.step_number.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
            && self.add_requirements.is_empty()
    }

    /// Apply to `step`, returning the names of the fields that changed
    pub fn apply(self, step: &mut TicketStep) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(number) = self.step_number {
            if number != step.step_number {
                step.step_number = number;
                changed.push("step_number");
            }
        }
        if let Some(title) = self.title {
            if title != step.title {
                step.title = title;
                changed.push("title");
            }
        }
        if let Some(description) = self.description {
            if description != step.description {
                step.description = description;
                changed.push("description");
            }
        }
        if let Some(assigned_to) = self.assigned_to {
            if assigned_to != step.assigned_to {
                step.assigned_to = assigned_to;
                changed.push("assigned_to");
            }
        }
        if let Some(due_date) = self.due_date {
            if due_date != step.due_date {
                step.due_date = due_date;
                changed.push("due_date");
            }
        }
        if !self.add_requirements.is_empty() {
            step.document_requirements.extend(
                self.add_requirements
                    .into_iter()
                    .map(NewDocumentRequirement::into_requirement),
            );
            changed.push("document_requirements");
        }
        changed
    }
}
