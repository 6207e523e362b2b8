use super::errors::{ActionError, ActionResult};
use super::states::StepStatus;
use crate::events::publisher::EventPublisher;
use crate::events::types::{constants, status_change_context, step_context};
use crate::models::{Ticket, TicketStep};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

/// A committed transition, handed to every action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub actor_id: Uuid,
    pub from_state: Option<String>,
    pub to_state: String,
    pub event: String,
    pub occurred_at: DateTime<Utc>,
}

/// Trait for implementing post-transition actions
#[async_trait]
pub trait StateAction<T: Sync>: Send + Sync {
    /// Execute the action
    async fn execute(&self, entity: &T, transition: &Transition) -> ActionResult<()>;

    /// Get a description of this action for logging
    fn description(&self) -> &'static str;
}

/// Action to publish lifecycle events when state transitions occur
#[derive(Debug, Clone)]
pub struct PublishTransitionEventAction {
    event_publisher: EventPublisher,
}

impl PublishTransitionEventAction {
    pub fn new(event_publisher: EventPublisher) -> Self {
        Self { event_publisher }
    }
}

#[async_trait]
impl StateAction<Ticket> for PublishTransitionEventAction {
    async fn execute(&self, ticket: &Ticket, transition: &Transition) -> ActionResult<()> {
        let context = status_change_context(
            ticket,
            transition.actor_id,
            transition.from_state.as_deref().unwrap_or_default(),
            &transition.to_state,
            &transition.event,
        );

        self.event_publisher
            .publish_at(
                constants::TICKET_STATUS_CHANGED,
                context,
                transition.occurred_at,
            )
            .map_err(|_| ActionError::EventPublishFailed {
                event_name: constants::TICKET_STATUS_CHANGED.to_string(),
            })
    }

    fn description(&self) -> &'static str {
        "Publish lifecycle event for ticket transition"
    }
}

#[async_trait]
impl StateAction<TicketStep> for PublishTransitionEventAction {
    async fn execute(&self, step: &TicketStep, transition: &Transition) -> ActionResult<()> {
        let event_name = determine_step_event_name(&transition.to_state);
        let mut context = step_context(step, transition.actor_id);
        context["from_status"] = json!(transition.from_state);
        context["to_status"] = json!(transition.to_state);

        self.event_publisher
            .publish_at(event_name, context, transition.occurred_at)
            .map_err(|_| ActionError::EventPublishFailed {
                event_name: event_name.to_string(),
            })
    }

    fn description(&self) -> &'static str {
        "Publish lifecycle event for step transition"
    }
}

/// Action that emits one structured log line per transition
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransitionAction;

#[async_trait]
impl StateAction<Ticket> for LogTransitionAction {
    async fn execute(&self, ticket: &Ticket, transition: &Transition) -> ActionResult<()> {
        tracing::info!(
            ticket_id = %ticket.id,
            ticket_number = %ticket.ticket_number,
            actor_id = %transition.actor_id,
            from_state = ?transition.from_state,
            to_state = %transition.to_state,
            event = %transition.event,
            "Ticket status changed"
        );
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Log ticket transition"
    }
}

#[async_trait]
impl StateAction<TicketStep> for LogTransitionAction {
    async fn execute(&self, step: &TicketStep, transition: &Transition) -> ActionResult<()> {
        tracing::info!(
            ticket_id = %step.ticket_id,
            step_id = %step.id,
            step_number = %step.step_number,
            actor_id = %transition.actor_id,
            from_state = ?transition.from_state,
            to_state = %transition.to_state,
            "Step status changed"
        );
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Log step transition"
    }
}

fn determine_step_event_name(to_state: &str) -> &'static str {
    if to_state == StepStatus::Completed.as_str() {
        constants::STEP_COMPLETED
    } else {
        constants::STEP_UPDATED
    }
}
