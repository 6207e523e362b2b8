use super::actions::{LogTransitionAction, PublishTransitionEventAction, StateAction, Transition};
use super::errors::{not_found, unauthorized, StateMachineError, StateMachineResult};
use super::guards::{RemarkLengthGuard, StateGuard, StepCompletion, StepCompletionFileGuard};
use super::states::StepStatus;
use crate::clock::Clock;
use crate::events::EventPublisher;
use crate::models::{AuditAction, AuditEntry, Role, Ticket, TicketStep, UploadedFile, User};
use crate::policy::can_change_step_status;
use crate::repository::{FileStore, TicketRepository};
use std::sync::Arc;
use uuid::Uuid;

/// Drives step status changes, including the completion gate.
///
/// Department officers must send at least one document with a completion.
/// Each accepted change appends one STEP_UPDATED entry to the ticket.
pub struct StepStateMachine {
    repository: Arc<dyn TicketRepository>,
    file_store: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
    remark_guard: RemarkLengthGuard,
    file_guard: StepCompletionFileGuard,
    actions: Vec<Arc<dyn StateAction<TicketStep>>>,
}

impl std::fmt::Debug for StepStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepStateMachine")
            .field("remark_guard", &self.remark_guard)
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl StepStateMachine {
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        file_store: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
        event_publisher: EventPublisher,
        min_remark_length: usize,
    ) -> Self {
        let actions: Vec<Arc<dyn StateAction<TicketStep>>> = vec![
            Arc::new(LogTransitionAction),
            Arc::new(PublishTransitionEventAction::new(event_publisher)),
        ];
        Self {
            repository,
            file_store,
            clock,
            remark_guard: RemarkLengthGuard::new(min_remark_length),
            file_guard: StepCompletionFileGuard,
            actions,
        }
    }

    pub fn with_action(mut self, action: Arc<dyn StateAction<TicketStep>>) -> Self {
        self.actions.push(action);
        self
    }

    /// Mark a step COMPLETED, storing `files` as its attachments
    pub async fn complete_step(
        &self,
        actor: &User,
        ticket_id: Uuid,
        step_id: Uuid,
        remarks: &str,
        files: Vec<UploadedFile>,
    ) -> StateMachineResult<Ticket> {
        self.change_step_status(
            actor,
            ticket_id,
            step_id,
            StepStatus::Completed,
            remarks,
            files,
        )
        .await
    }

    /// Move a step to `new_status`; `files` are only consulted and stored on completion
    pub async fn change_step_status(
        &self,
        actor: &User,
        ticket_id: Uuid,
        step_id: Uuid,
        new_status: StepStatus,
        remarks: &str,
        files: Vec<UploadedFile>,
    ) -> StateMachineResult<Ticket> {
        self.remark_guard.check(remarks)?;

        let mut ticket = self
            .repository
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| not_found(format!("ticket {ticket_id}")))?;

        if !can_change_step_status(actor, &ticket) {
            return Err(unauthorized(format!(
                "{} may not change step status on ticket {}",
                actor.role, ticket.ticket_number
            )));
        }

        let step = ticket
            .step(step_id)
            .ok_or_else(|| not_found(format!("step {step_id}")))?;
        let from = step.status;
        if from == new_status {
            return Err(StateMachineError::InvalidStepTransition {
                from,
                to: new_status,
            });
        }

        let completing = new_status == StepStatus::Completed;
        if completing && actor.role == Role::DepartmentOfficer {
            self.file_guard.check(&StepCompletion {
                step,
                files: &files,
            })?;
        }

        let now = self.clock.now();
        let mut stored = Vec::new();
        if completing {
            for file in files.iter().filter(|f| !f.is_empty()) {
                stored.push(self.file_store.store(file, actor.id, now).await?);
            }
        }

        let step = ticket
            .step_mut(step_id)
            .ok_or_else(|| not_found(format!("step {step_id}")))?;
        step.status = new_status;
        step.completed_at = completing.then_some(now);
        step.attachments.extend(stored);

        let label = step.step_number.clone();
        let snapshot = step.clone();
        let entry = AuditEntry::new(ticket.id, actor.id, AuditAction::StepUpdated, now)
            .with_values(
                Some(format!("Step {label}: {from}")),
                Some(format!("Step {label}: {new_status}")),
            )
            .with_remarks(remarks.trim());
        ticket.record(entry);

        ticket.version = self.repository.save(&ticket).await?;

        let transition = Transition {
            actor_id: actor.id,
            from_state: Some(from.as_str().to_string()),
            to_state: new_status.as_str().to_string(),
            event: if completing { "completed" } else { "updated" }.to_string(),
            occurred_at: now,
        };
        for action in &self.actions {
            if let Err(err) = action.execute(&snapshot, &transition).await {
                tracing::warn!(
                    step_id = %snapshot.id,
                    action = action.description(),
                    error = %err,
                    "Post-transition action failed"
                );
            }
        }

        Ok(ticket)
    }
}
