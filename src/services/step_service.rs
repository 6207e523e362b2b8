use crate::clock::Clock;
use crate::error::{Result, TicketingError};
use crate::events::types::{constants, step_context};
use crate::events::EventPublisher;
use crate::logging::log_step_operation;
use crate::models::{
    AuditAction, AuditEntry, NewStep, StepComment, StepUpdate, Ticket, TicketStep, UploadedFile,
    User,
};
use crate::policy::{can_manage_steps, can_upload_documents, can_view};
use crate::repository::{FileStore, TicketRepository};
use crate::state_machine::{StepStateMachine, StepStatus};
use crate::validation::{validate_step_number, validate_title};
use std::sync::Arc;
use uuid::Uuid;

/// Next free numeric step label: one past the highest numeric label, or "1"
pub fn next_step_number(ticket: &Ticket) -> Result<String> {
    let highest = ticket
        .steps
        .iter()
        .filter_map(|s| s.step_number.trim().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    highest
        .checked_add(1)
        .map(|next| next.to_string())
        .ok_or_else(|| {
            TicketingError::ValidationError(format!(
                "No step number follows {highest}; give the step an explicit number"
            ))
        })
}

fn step_label(step: &TicketStep) -> String {
    format!("Step {}: {}", step.step_number, step.title)
}

/// Step workflow operations
pub struct StepService {
    repository: Arc<dyn TicketRepository>,
    file_store: Arc<dyn FileStore>,
    state_machine: StepStateMachine,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StepService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepService")
            .field("state_machine", &self.state_machine)
            .finish()
    }
}

impl StepService {
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        file_store: Arc<dyn FileStore>,
        state_machine: StepStateMachine,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            file_store,
            state_machine,
            events,
            clock,
        }
    }

    async fn load(&self, ticket_id: Uuid) -> Result<Ticket> {
        self.repository
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| TicketingError::NotFound(format!("ticket {ticket_id}")))
    }

    fn require_step_manager(actor: &User, ticket: &Ticket) -> Result<()> {
        if can_manage_steps(actor) {
            Ok(())
        } else {
            Err(TicketingError::Unauthorized(format!(
                "{} may not manage steps on ticket {}",
                actor.role, ticket.ticket_number
            )))
        }
    }

    fn publish(&self, event_name: &str, step: &TicketStep, actor: &User, ticket: &Ticket) {
        if let Err(err) =
            self.events
                .publish_at(event_name, step_context(step, actor.id), ticket.updated_at)
        {
            tracing::warn!(
                step_id = %step.id,
                event = event_name,
                error = %err,
                "Failed to publish step event"
            );
        }
    }

    /// Append a step; executive officers only
    pub async fn add_step(&self, actor: &User, ticket_id: Uuid, input: NewStep) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        Self::require_step_manager(actor, &ticket)?;
        validate_title(&input.title)?;

        let step_number = match input.step_number {
            Some(number) => {
                validate_step_number(&number)?;
                number.trim().to_string()
            }
            None => next_step_number(&ticket)?,
        };

        let now = self.clock.now();
        let step = TicketStep {
            id: Uuid::new_v4(),
            ticket_id: ticket.id,
            step_number,
            title: input.title.trim().to_string(),
            description: input.description,
            status: StepStatus::Pending,
            assigned_to: input.assigned_to,
            created_by: actor.id,
            created_at: now,
            completed_at: None,
            due_date: input.due_date,
            reference_files: input.reference_files,
            document_requirements: input
                .document_requirements
                .into_iter()
                .map(|r| r.into_requirement())
                .collect(),
            comments: Vec::new(),
            attachments: Vec::new(),
        };

        let entry = AuditEntry::new(ticket.id, actor.id, AuditAction::StepAdded, now)
            .with_values(None, Some(step_label(&step)));
        ticket.steps.push(step.clone());
        ticket.record(entry);
        ticket.version = self.repository.save(&ticket).await?;

        log_step_operation(
            "add",
            Some(ticket.id),
            Some(step.id),
            Some(&step.step_number),
            step.status.as_str(),
            None,
        );
        self.publish(constants::STEP_ADDED, &step, actor, &ticket);
        Ok(ticket)
    }

    /// Edit a step's descriptive fields; executive officers only
    pub async fn update_step(
        &self,
        actor: &User,
        ticket_id: Uuid,
        step_id: Uuid,
        update: StepUpdate,
    ) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        Self::require_step_manager(actor, &ticket)?;
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        if let Some(number) = &update.step_number {
            validate_step_number(number)?;
        }

        let step = ticket
            .step_mut(step_id)
            .ok_or_else(|| TicketingError::NotFound(format!("step {step_id}")))?;
        let before = step_label(step);
        let changed = update.apply(step);
        if changed.is_empty() {
            return Ok(ticket);
        }
        let snapshot = step.clone();

        let now = self.clock.now();
        ticket.record(
            AuditEntry::new(ticket.id, actor.id, AuditAction::StepUpdated, now)
                .with_values(Some(before), Some(step_label(&snapshot)))
                .with_remarks(format!("Changed {}", changed.join(", "))),
        );
        ticket.version = self.repository.save(&ticket).await?;

        log_step_operation(
            "update",
            Some(ticket.id),
            Some(snapshot.id),
            Some(&snapshot.step_number),
            snapshot.status.as_str(),
            Some(&changed.join(", ")),
        );
        self.publish(constants::STEP_UPDATED, &snapshot, actor, &ticket);
        Ok(ticket)
    }

    /// Remove a step; executive officers only
    pub async fn delete_step(&self, actor: &User, ticket_id: Uuid, step_id: Uuid) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        Self::require_step_manager(actor, &ticket)?;

        let position = ticket
            .steps
            .iter()
            .position(|s| s.id == step_id)
            .ok_or_else(|| TicketingError::NotFound(format!("step {step_id}")))?;
        let removed = ticket.steps.remove(position);

        let now = self.clock.now();
        ticket.record(
            AuditEntry::new(ticket.id, actor.id, AuditAction::StepDeleted, now)
                .with_values(Some(step_label(&removed)), None),
        );
        ticket.version = self.repository.save(&ticket).await?;

        log_step_operation(
            "delete",
            Some(ticket.id),
            Some(removed.id),
            Some(&removed.step_number),
            removed.status.as_str(),
            None,
        );
        self.publish(constants::STEP_DELETED, &removed, actor, &ticket);
        Ok(ticket)
    }

    /// Fill (or replace) a document requirement slot; officers with authority only
    pub async fn upload_requirement_document(
        &self,
        actor: &User,
        ticket_id: Uuid,
        step_id: Uuid,
        requirement_id: Uuid,
        file: UploadedFile,
    ) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        if !can_upload_documents(actor, &ticket) {
            return Err(TicketingError::Unauthorized(format!(
                "{} may not upload documents on ticket {}",
                actor.role, ticket.ticket_number
            )));
        }
        if file.is_empty() {
            return Err(TicketingError::ValidationError(format!(
                "Uploaded file '{}' is empty",
                file.name
            )));
        }

        let step = ticket
            .step(step_id)
            .ok_or_else(|| TicketingError::NotFound(format!("step {step_id}")))?;
        if step.requirement(requirement_id).is_none() {
            return Err(TicketingError::NotFound(format!(
                "document requirement {requirement_id}"
            )));
        }

        let now = self.clock.now();
        let file_ref = self.file_store.store(&file, actor.id, now).await?;

        let step = ticket
            .step_mut(step_id)
            .ok_or_else(|| TicketingError::NotFound(format!("step {step_id}")))?;
        let label = step_label(step);
        let requirement = step
            .requirement_mut(requirement_id)
            .ok_or_else(|| TicketingError::NotFound(format!("document requirement {requirement_id}")))?;
        let previous = requirement
            .uploaded_file
            .replace(file_ref)
            .map(|f| f.name);
        let remarks = format!("{label}: uploaded '{}' for {}", file.name, requirement.name);
        let snapshot = step.clone();

        ticket.record(
            AuditEntry::new(ticket.id, actor.id, AuditAction::StepUpdated, now)
                .with_values(previous, Some(file.name.clone()))
                .with_remarks(remarks),
        );
        ticket.version = self.repository.save(&ticket).await?;

        self.publish(constants::STEP_UPDATED, &snapshot, actor, &ticket);
        Ok(ticket)
    }

    /// Comment on a step; anyone who can view the ticket may comment
    pub async fn add_comment(
        &self,
        actor: &User,
        ticket_id: Uuid,
        step_id: Uuid,
        content: &str,
    ) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        if !can_view(actor, &ticket) {
            return Err(TicketingError::Unauthorized(format!(
                "{} may not comment on ticket {}",
                actor.role, ticket.ticket_number
            )));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(TicketingError::ValidationError(
                "Comment must not be empty".to_string(),
            ));
        }

        let now = self.clock.now();
        let step = ticket
            .step_mut(step_id)
            .ok_or_else(|| TicketingError::NotFound(format!("step {step_id}")))?;
        step.comments.push(StepComment {
            id: Uuid::new_v4(),
            step_id,
            content: content.to_string(),
            created_by: actor.id,
            created_at: now,
        });
        let snapshot = step.clone();

        ticket.record(
            AuditEntry::new(ticket.id, actor.id, AuditAction::StepUpdated, now)
                .with_values(None, Some(content.to_string()))
                .with_remarks(format!("{}: comment added", step_label(&snapshot))),
        );
        ticket.version = self.repository.save(&ticket).await?;

        log_step_operation(
            "comment",
            Some(ticket.id),
            Some(snapshot.id),
            Some(&snapshot.step_number),
            snapshot.status.as_str(),
            None,
        );
        self.publish(constants::STEP_UPDATED, &snapshot, actor, &ticket);
        Ok(ticket)
    }

    pub async fn complete_step(
        &self,
        actor: &User,
        ticket_id: Uuid,
        step_id: Uuid,
        remarks: &str,
        files: Vec<UploadedFile>,
    ) -> Result<Ticket> {
        Ok(self
            .state_machine
            .complete_step(actor, ticket_id, step_id, remarks, files)
            .await?)
    }

    pub async fn change_step_status(
        &self,
        actor: &User,
        ticket_id: Uuid,
        step_id: Uuid,
        new_status: StepStatus,
        remarks: &str,
        files: Vec<UploadedFile>,
    ) -> Result<Ticket> {
        Ok(self
            .state_machine
            .change_step_status(actor, ticket_id, step_id, new_status, remarks, files)
            .await?)
    }
}
