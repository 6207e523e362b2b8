use super::numbering::TicketNumberAllocator;
use crate::clock::Clock;
use crate::error::{Result, TicketingError};
use crate::events::types::{constants, ticket_context};
use crate::events::EventPublisher;
use crate::logging::log_ticket_operation;
use crate::models::{
    AuditAction, AuditEntry, ModuleRegistry, NewTicket, Ticket, TicketModule, TicketUpdate, User,
};
use crate::policy::{
    allowed_transitions, can_delete, can_edit, can_view, visible_audit_trail,
};
use crate::repository::{RepositoryError, TicketRepository};
use crate::scopes::{status_counts, TicketFilters};
use crate::state_machine::{TicketEvent, TicketStateMachine, TicketStatus};
use crate::validation::{validate_category, validate_new_ticket, validate_title};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// A status change the actor may invoke right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailableTransition {
    pub target: TicketStatus,
    pub event: TicketEvent,
}

impl AvailableTransition {
    pub fn label(&self) -> &'static str {
        self.event.label()
    }
}

/// Ticket-level operations: creation, edits, status changes, deletion and queries
pub struct TicketService {
    repository: Arc<dyn TicketRepository>,
    numbering: TicketNumberAllocator,
    modules: ModuleRegistry,
    state_machine: TicketStateMachine,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl std::fmt::Debug for TicketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketService")
            .field("modules", &self.modules.len())
            .field("numbering", &self.numbering)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl TicketService {
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        numbering: TicketNumberAllocator,
        modules: ModuleRegistry,
        state_machine: TicketStateMachine,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository,
            numbering,
            modules,
            state_machine,
            events,
            clock,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    fn module(&self, module_id: &str) -> Result<&TicketModule> {
        self.modules
            .get(module_id)
            .ok_or_else(|| TicketingError::NotFound(format!("module {module_id}")))
    }

    async fn load(&self, ticket_id: Uuid) -> Result<Ticket> {
        self.repository
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| TicketingError::NotFound(format!("ticket {ticket_id}")))
    }

    fn publish(&self, event_name: &str, context: Value, ticket: &Ticket) {
        if let Err(err) = self
            .events
            .publish_at(event_name, context, ticket.updated_at)
        {
            tracing::warn!(
                ticket_id = %ticket.id,
                event = event_name,
                error = %err,
                "Failed to publish ticket event"
            );
        }
    }

    /// Create a ticket with the next number of its module and a CREATED audit entry
    pub async fn create_ticket(&self, actor: &User, input: NewTicket) -> Result<Ticket> {
        let module = self.module(&input.module_id)?;
        validate_new_ticket(module, &input)?;

        let now = self.clock.now();
        let id = Uuid::new_v4();
        let mut ticket = Ticket {
            id,
            ticket_number: String::new(),
            module_id: module.id.clone(),
            title: input.title.trim().to_string(),
            description: input.description,
            status: input.initial_status,
            priority: input.priority,
            category: input.category,
            department: input.department,
            created_by: actor.id,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
            due_date: input.due_date,
            steps: Vec::new(),
            attachments: Vec::new(),
            audit_trail: Vec::new(),
            version: 0,
        };
        ticket.record(
            AuditEntry::new(id, actor.id, AuditAction::Created, now)
                .with_values(None, Some(ticket.status.as_str().to_string())),
        );

        let mut last_conflict = None;
        for attempt in 1..=self.max_attempts {
            ticket.ticket_number = self.numbering.next(module).await?;
            match self.repository.save(&ticket).await {
                Ok(version) => {
                    ticket.version = version;
                    log_ticket_operation(
                        "create",
                        Some(ticket.id),
                        Some(&ticket.ticket_number),
                        Some(actor.id),
                        ticket.status.as_str(),
                        None,
                    );
                    self.publish(
                        constants::TICKET_CREATED,
                        ticket_context(&ticket, actor.id),
                        &ticket,
                    );
                    return Ok(ticket);
                }
                Err(RepositoryError::DuplicateTicketNumber { ticket_number, .. }) => {
                    tracing::warn!(
                        module_id = %module.id,
                        ticket_number = %ticket_number,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        "Ticket number already taken, allocating another"
                    );
                    last_conflict = Some(ticket_number);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(TicketingError::DuplicateTicketNumber(
            last_conflict.unwrap_or_default(),
        ))
    }

    /// Apply a partial update; an update that changes nothing writes nothing
    pub async fn update_ticket(
        &self,
        actor: &User,
        ticket_id: Uuid,
        update: TicketUpdate,
    ) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        if !can_edit(actor, &ticket) {
            return Err(TicketingError::Unauthorized(format!(
                "{} may not edit ticket {}",
                actor.role, ticket.ticket_number
            )));
        }

        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        if let Some(category) = &update.category {
            validate_category(self.module(&ticket.module_id)?, category)?;
        }

        let changed = update.apply(&mut ticket);
        if changed.is_empty() {
            return Ok(ticket);
        }

        let now = self.clock.now();
        ticket.record(
            AuditEntry::new(ticket.id, actor.id, AuditAction::Updated, now)
                .with_values(None, Some(changed.join(", "))),
        );
        ticket.version = self.repository.save(&ticket).await?;

        log_ticket_operation(
            "update",
            Some(ticket.id),
            Some(&ticket.ticket_number),
            Some(actor.id),
            ticket.status.as_str(),
            Some(&changed.join(", ")),
        );
        let mut context = ticket_context(&ticket, actor.id);
        context["changed"] = serde_json::json!(changed);
        self.publish(constants::TICKET_UPDATED, context, &ticket);
        Ok(ticket)
    }

    pub async fn change_status(
        &self,
        actor: &User,
        ticket_id: Uuid,
        new_status: TicketStatus,
        remarks: &str,
    ) -> Result<Ticket> {
        self.state_machine
            .change_status(actor, ticket_id, new_status, remarks)
            .await
            .map_err(|err| {
                let err = TicketingError::from(err);
                if !err.is_user_facing() {
                    crate::logging::log_error(
                        "ticket_service",
                        "change_status",
                        &err.to_string(),
                        Some(&ticket_id.to_string()),
                    );
                }
                err
            })
    }

    /// Remove a ticket. The returned snapshot carries the final DELETED entry.
    pub async fn delete_ticket(&self, actor: &User, ticket_id: Uuid) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        if !can_delete(actor, &ticket) {
            return Err(TicketingError::Unauthorized(format!(
                "{} may not delete ticket {} in status {}",
                actor.role, ticket.ticket_number, ticket.status
            )));
        }

        if !self.repository.delete(ticket.id).await? {
            return Err(TicketingError::NotFound(format!("ticket {ticket_id}")));
        }

        let now = self.clock.now();
        ticket.record(
            AuditEntry::new(ticket.id, actor.id, AuditAction::Deleted, now)
                .with_values(Some(ticket.ticket_number.clone()), None),
        );
        log_ticket_operation(
            "delete",
            Some(ticket.id),
            Some(&ticket.ticket_number),
            Some(actor.id),
            ticket.status.as_str(),
            None,
        );
        self.publish(
            constants::TICKET_DELETED,
            ticket_context(&ticket, actor.id),
            &ticket,
        );
        Ok(ticket)
    }

    /// Fetch a ticket the actor may view, with its audit trail narrowed to what they may see
    pub async fn get_ticket(&self, actor: &User, ticket_id: Uuid) -> Result<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        if !can_view(actor, &ticket) {
            return Err(TicketingError::Unauthorized(format!(
                "{} may not view ticket {}",
                actor.role, ticket.ticket_number
            )));
        }
        let visible: Vec<_> = visible_audit_trail(actor, &ticket.audit_trail)
            .into_iter()
            .cloned()
            .collect();
        ticket.audit_trail = visible;
        Ok(ticket)
    }

    /// Tickets of a module visible to the actor and matching `filters`, oldest first
    pub async fn list_tickets(
        &self,
        actor: &User,
        module_id: &str,
        filters: &TicketFilters,
    ) -> Result<Vec<Ticket>> {
        self.module(module_id)?;
        let tickets = self.repository.list(module_id).await?;
        Ok(tickets
            .into_iter()
            .filter(|t| can_view(actor, t) && filters.matches(t))
            .collect())
    }

    /// Per-status totals over the tickets the actor can see
    pub async fn status_counts(
        &self,
        actor: &User,
        module_id: &str,
    ) -> Result<BTreeMap<TicketStatus, usize>> {
        let visible = self
            .list_tickets(actor, module_id, &TicketFilters::default())
            .await?;
        Ok(status_counts(&visible))
    }

    /// Audit entries the actor may see, newest first
    pub async fn audit_trail(&self, actor: &User, ticket_id: Uuid) -> Result<Vec<AuditEntry>> {
        let ticket = self.get_ticket(actor, ticket_id).await?;
        let mut entries = ticket.audit_trail;
        entries.reverse();
        Ok(entries)
    }

    /// Status changes the actor may invoke on the ticket, in lifecycle order
    pub async fn available_transitions(
        &self,
        actor: &User,
        ticket_id: Uuid,
    ) -> Result<Vec<AvailableTransition>> {
        let ticket = self.get_ticket(actor, ticket_id).await?;
        Ok(allowed_transitions(actor, &ticket)
            .into_iter()
            .filter_map(|target| {
                TicketEvent::from_transition(ticket.status, target)
                    .map(|event| AvailableTransition { target, event })
            })
            .collect())
    }
}
