use super::actions::{LogTransitionAction, PublishTransitionEventAction, StateAction, Transition};
use super::errors::{not_found, unauthorized, StateMachineError, StateMachineResult};
use super::events::TicketEvent;
use super::guards::{MandatoryDocumentsGuard, RemarkLengthGuard, StateGuard};
use super::states::TicketStatus;
use crate::clock::Clock;
use crate::events::EventPublisher;
use crate::models::{AuditAction, AuditEntry, Role, Ticket, User};
use crate::policy::{allowed_transitions, can_change_status, has_authority};
use crate::repository::TicketRepository;
use std::sync::Arc;
use uuid::Uuid;

/// Drives ticket status changes.
///
/// A change is validated in a fixed order (remark, authority, transition
/// table, document gate) and rejected before anything is written. An accepted
/// change updates the status and appends its STATUS_CHANGE entry in a single
/// repository save; actions run only after that save succeeds.
pub struct TicketStateMachine {
    repository: Arc<dyn TicketRepository>,
    clock: Arc<dyn Clock>,
    remark_guard: RemarkLengthGuard,
    document_guard: MandatoryDocumentsGuard,
    actions: Vec<Arc<dyn StateAction<Ticket>>>,
}

impl std::fmt::Debug for TicketStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketStateMachine")
            .field("remark_guard", &self.remark_guard)
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl TicketStateMachine {
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        clock: Arc<dyn Clock>,
        event_publisher: EventPublisher,
        min_remark_length: usize,
    ) -> Self {
        let actions: Vec<Arc<dyn StateAction<Ticket>>> = vec![
            Arc::new(LogTransitionAction),
            Arc::new(PublishTransitionEventAction::new(event_publisher)),
        ];
        Self {
            repository,
            clock,
            remark_guard: RemarkLengthGuard::new(min_remark_length),
            document_guard: MandatoryDocumentsGuard,
            actions,
        }
    }

    /// Register an extra post-commit action
    pub fn with_action(mut self, action: Arc<dyn StateAction<Ticket>>) -> Self {
        self.actions.push(action);
        self
    }

    /// Run every check for moving `ticket` to `to` without touching it
    pub fn validate(
        &self,
        actor: &User,
        ticket: &Ticket,
        to: TicketStatus,
        remarks: &str,
    ) -> StateMachineResult<TicketEvent> {
        self.remark_guard.check(remarks)?;

        if !can_change_status(actor, ticket) || !has_authority(actor, ticket) {
            return Err(unauthorized(format!(
                "{} may not change the status of ticket {}",
                actor.role, ticket.ticket_number
            )));
        }

        let from = ticket.status;
        if !allowed_transitions(actor, ticket).contains(&to) {
            return Err(StateMachineError::InvalidTransition { from, to });
        }

        if to == TicketStatus::Resolved && actor.role == Role::DepartmentOfficer {
            tracing::debug!(
                ticket_id = %ticket.id,
                guard = self.document_guard.description(),
                "Checking resolve-time document gate"
            );
            self.document_guard.check(ticket)?;
        }

        TicketEvent::from_transition(from, to)
            .ok_or(StateMachineError::InvalidTransition { from, to })
    }

    /// Load, validate, apply and persist a status change
    pub async fn change_status(
        &self,
        actor: &User,
        ticket_id: Uuid,
        new_status: TicketStatus,
        remarks: &str,
    ) -> StateMachineResult<Ticket> {
        // Cheapest check first; a short remark is rejected without a load
        self.remark_guard.check(remarks)?;

        let mut ticket = self
            .repository
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| not_found(format!("ticket {ticket_id}")))?;

        let event = self.validate(actor, &ticket, new_status, remarks)?;
        let from = ticket.status;
        let now = self.clock.now();

        let entry = AuditEntry::new(ticket.id, actor.id, AuditAction::StatusChange, now)
            .with_values(
                Some(from.as_str().to_string()),
                Some(new_status.as_str().to_string()),
            )
            .with_remarks(remarks.trim());
        ticket.status = new_status;
        ticket.record(entry);

        ticket.version = self.repository.save(&ticket).await?;

        let transition = Transition {
            actor_id: actor.id,
            from_state: Some(from.as_str().to_string()),
            to_state: new_status.as_str().to_string(),
            event: event.event_type().to_string(),
            occurred_at: now,
        };
        self.run_actions(&ticket, &transition).await;

        Ok(ticket)
    }

    async fn run_actions(&self, ticket: &Ticket, transition: &Transition) {
        for action in &self.actions {
            if let Err(err) = action.execute(ticket, transition).await {
                tracing::warn!(
                    ticket_id = %ticket.id,
                    action = action.description(),
                    error = %err,
                    "Post-transition action failed"
                );
            }
        }
    }
}
