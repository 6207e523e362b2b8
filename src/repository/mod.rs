//! # Ticket Repository
//!
//! Storage seam for the ticket aggregate. The policy code never holds ambient
//! state; it is handed a [`TicketRepository`], a [`SequenceAllocator`] and a
//! [`FileStore`] and works only through them.
//!
//! `save` persists the whole aggregate as one unit: a reader never observes a
//! new status without the audit entry that records it, or the reverse. Saves
//! are optimistic: an aggregate loaded at version `n` only commits over
//! version `n`, so a stale copy can never overwrite a newer one.

pub mod files;
pub mod memory;
pub mod postgres;

use crate::error::TicketingError;
use crate::models::Ticket;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use files::{FileStore, InMemoryFileStore};
pub use memory::{InMemorySequenceAllocator, InMemoryTicketRepository};
pub use postgres::{PgSequenceAllocator, PgTicketRepository};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Ticket {0} not found")]
    NotFound(Uuid),

    #[error("Ticket number {ticket_number} already exists in module {module_id}")]
    DuplicateTicketNumber {
        module_id: String,
        ticket_number: String,
    },

    #[error("Ticket {id} was modified concurrently (expected version {expected})")]
    VersionConflict { id: Uuid, expected: u64 },

    #[error("Invalid stored data for {field}: {reason}")]
    InvalidData { field: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for TicketingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => TicketingError::NotFound(format!("ticket {id}")),
            RepositoryError::DuplicateTicketNumber { ticket_number, .. } => {
                TicketingError::DuplicateTicketNumber(ticket_number)
            }
            err @ RepositoryError::VersionConflict { .. } => {
                TicketingError::ConcurrentModification(err.to_string())
            }
            other => TicketingError::PersistenceError(other.to_string()),
        }
    }
}

/// Storage for whole ticket aggregates
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Ticket>>;

    /// Insert or replace the aggregate, atomically with its steps and audit trail.
    ///
    /// `ticket.version` must match the stored version (zero for a new ticket);
    /// returns the version now stored.
    async fn save(&self, ticket: &Ticket) -> RepositoryResult<u64>;

    /// Tickets of one module, oldest first
    async fn list(&self, module_id: &str) -> RepositoryResult<Vec<Ticket>>;

    /// Remove the aggregate; returns whether it existed
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

/// Per-module monotonically increasing counter used for ticket numbers
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    /// Reserve and return the next value (the first call for a module returns 1)
    async fn next_value(&self, module_id: &str) -> RepositoryResult<u64>;
}
