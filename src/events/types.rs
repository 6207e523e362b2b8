//! Lifecycle event names and payload builders.
//!
//! Payloads are plain JSON so subscribers need not link against the model types.

use crate::models::{Ticket, TicketStep};
use serde_json::{json, Value};
use uuid::Uuid;

pub mod constants {
    pub const TICKET_CREATED: &str = "ticket.created";
    pub const TICKET_UPDATED: &str = "ticket.updated";
    pub const TICKET_STATUS_CHANGED: &str = "ticket.status_changed";
    pub const TICKET_DELETED: &str = "ticket.deleted";

    pub const STEP_ADDED: &str = "step.added";
    pub const STEP_UPDATED: &str = "step.updated";
    pub const STEP_COMPLETED: &str = "step.completed";
    pub const STEP_DELETED: &str = "step.deleted";
}

pub fn ticket_context(ticket: &Ticket, actor_id: Uuid) -> Value {
    json!({
        "ticket_id": ticket.id,
        "ticket_number": ticket.ticket_number,
        "module_id": ticket.module_id,
        "department": ticket.department,
        "status": ticket.status,
        "actor_id": actor_id,
    })
}

pub fn status_change_context(
    ticket: &Ticket,
    actor_id: Uuid,
    from: &str,
    to: &str,
    event: &str,
) -> Value {
    let mut context = ticket_context(ticket, actor_id);
    context["from_status"] = json!(from);
    context["to_status"] = json!(to);
    context["event"] = json!(event);
    context
}

pub fn step_context(step: &TicketStep, actor_id: Uuid) -> Value {
    json!({
        "ticket_id": step.ticket_id,
        "step_id": step.id,
        "step_number": step.step_number,
        "step_title": step.title,
        "step_status": step.status,
        "actor_id": actor_id,
    })
}
