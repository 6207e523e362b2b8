//! # Ticketing Models
//!
//! Plain data types for the ticket aggregate and the actors that operate on it.
//!
//! A [`Ticket`] owns its ordered [`TicketStep`]s and its append-only
//! [`AuditEntry`] trail; repositories load and save the aggregate as one unit.

pub mod audit;
pub mod file;
pub mod module;
pub mod step;
pub mod ticket;
pub mod user;

pub use audit::{AuditAction, AuditEntry};
pub use file::{FileRef, UploadedFile};
pub use module::{ModuleRegistry, TicketModule};
pub use step::{
    DocumentRequirement, NewDocumentRequirement, NewStep, RequirementKind, StepComment, StepUpdate,
    TicketStep,
};
pub use ticket::{NewTicket, Priority, Ticket, TicketUpdate};
pub use user::{Role, User};
