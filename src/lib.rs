#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Ticketing Core
//!
//! Multi-module ticket workflow engine: tickets move through a fixed
//! nine-state lifecycle, carry ordered work steps with document
//! requirements, and keep an append-only audit trail of every change.
//!
//! ## Roles
//!
//! Three roles act on tickets. An **Employee** raises tickets and may edit or
//! submit their own drafts. A **Department Officer** works the tickets of
//! their department and must back every step completion with documents. An
//! **Executive Officer** has authority over every ticket and alone defines
//! the steps of a ticket.
//!
//! ## Module Organization
//!
//! - [`models`] - Ticket aggregate, steps, files, audit entries and users
//! - [`state_machine`] - Ticket and step lifecycles, guards and post-commit actions
//! - [`policy`] - Role and ownership checks
//! - [`services`] - Ticket and step operations
//! - [`repository`] - Storage seam with in-memory and PostgreSQL backends
//! - [`scopes`] - Ticket list filters and status counts
//! - [`events`] - Lifecycle event broadcast
//! - [`config`] - Layered TOML and environment configuration
//! - [`database`] - Connection pool and migrations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ticketing_core::config::TicketingConfig;
//! use ticketing_core::models::{NewTicket, Role, User};
//! use ticketing_core::state_machine::TicketStatus;
//! use ticketing_core::TicketingContext;
//!
//! # async fn example() -> ticketing_core::Result<()> {
//! let context = TicketingContext::in_memory(TicketingConfig::default())?;
//! let employee = User::new("Ana", Role::Employee, "Facilities");
//!
//! let draft = context
//!     .tickets
//!     .create_ticket(
//!         &employee,
//!         NewTicket::new("maintenance", "Broken light", "Electrical", "Facilities"),
//!     )
//!     .await?;
//!
//! let submitted = context
//!     .tickets
//!     .change_status(&employee, draft.id, TicketStatus::Created, "Submitting now")
//!     .await?;
//! assert_eq!(submitted.status, TicketStatus::Created);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod constants;
pub mod context;
pub mod database;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod policy;
pub mod repository;
pub mod scopes;
pub mod services;
pub mod state_machine;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigManager, TicketingConfig};
pub use context::TicketingContext;
pub use error::{Result, TicketingError};
pub use events::{EventPublisher, PublishedEvent};
pub use models::{AuditAction, AuditEntry, Role, Ticket, TicketStep, User};
pub use scopes::{AssigneeFilter, TicketFilters};
pub use services::{StepService, TicketService};
pub use state_machine::{StepStatus, TicketEvent, TicketStatus};
