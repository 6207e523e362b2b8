//! Application services: the operations callers invoke, composed from policy,
//! validation, the state machines and the repositories.

pub mod numbering;
pub mod step_service;
pub mod ticket_service;

pub use numbering::{format_ticket_number, TicketNumberAllocator};
pub use step_service::{next_step_number, StepService};
pub use ticket_service::{AvailableTransition, TicketService};
