use super::{RepositoryError, RepositoryResult, SequenceAllocator, TicketRepository};
use crate::models::Ticket;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Process-local repository; each save swaps the whole aggregate under one write lock
#[derive(Debug, Default)]
pub struct InMemoryTicketRepository {
    tickets: RwLock<HashMap<Uuid, Ticket>>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.read().is_empty()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Ticket>> {
        Ok(self.tickets.read().get(&id).cloned())
    }

    async fn save(&self, ticket: &Ticket) -> RepositoryResult<u64> {
        let mut tickets = self.tickets.write();

        let stored_version = tickets.get(&ticket.id).map_or(0, |existing| existing.version);
        if stored_version != ticket.version {
            return Err(RepositoryError::VersionConflict {
                id: ticket.id,
                expected: ticket.version,
            });
        }

        let duplicate = tickets.values().any(|existing| {
            existing.id != ticket.id
                && existing.module_id == ticket.module_id
                && existing.ticket_number == ticket.ticket_number
        });
        if duplicate {
            return Err(RepositoryError::DuplicateTicketNumber {
                module_id: ticket.module_id.clone(),
                ticket_number: ticket.ticket_number.clone(),
            });
        }

        let mut stored = ticket.clone();
        stored.version = ticket.version + 1;
        tickets.insert(ticket.id, stored);
        Ok(ticket.version + 1)
    }

    async fn list(&self, module_id: &str) -> RepositoryResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .read()
            .values()
            .filter(|t| t.module_id == module_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.ticket_number.cmp(&b.ticket_number))
        });
        Ok(tickets)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.tickets.write().remove(&id).is_some())
    }
}

/// Lock-free per-module counters
#[derive(Debug, Default)]
pub struct InMemorySequenceAllocator {
    counters: DashMap<String, AtomicU64>,
}

impl InMemorySequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after `last_value`, e.g. when seeding from existing data
    pub fn seed(&self, module_id: &str, last_value: u64) {
        self.counters
            .insert(module_id.to_string(), AtomicU64::new(last_value));
    }
}

#[async_trait]
impl SequenceAllocator for InMemorySequenceAllocator {
    async fn next_value(&self, module_id: &str) -> RepositoryResult<u64> {
        if let Some(counter) = self.counters.get(module_id) {
            return Ok(counter.fetch_add(1, Ordering::SeqCst) + 1);
        }
        let counter = self
            .counters
            .entry(module_id.to_string())
            .or_insert_with(|| AtomicU64::new(0));
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
