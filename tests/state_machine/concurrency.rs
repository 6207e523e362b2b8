use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use ticketing_core::models::{AuditAction, NewTicket, Role, Ticket, User};
use ticketing_core::repository::{
    InMemoryFileStore, InMemorySequenceAllocator, InMemoryTicketRepository, RepositoryResult,
    TicketRepository,
};
use ticketing_core::state_machine::TicketStatus;
use ticketing_core::{FixedClock, TicketingConfig, TicketingContext, TicketingError};
use tokio::sync::Barrier;
use uuid::Uuid;

const REMARKS: &str = "Reviewed and moving forward";

/// Holds every armed load until both callers have read the same version
struct InterleavingRepository {
    inner: InMemoryTicketRepository,
    armed: AtomicBool,
    barrier: Barrier,
}

impl InterleavingRepository {
    fn new() -> Self {
        Self {
            inner: InMemoryTicketRepository::new(),
            armed: AtomicBool::new(false),
            barrier: Barrier::new(2),
        }
    }
}

#[async_trait]
impl TicketRepository for InterleavingRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Ticket>> {
        let found = self.inner.find_by_id(id).await?;
        if self.armed.load(Ordering::SeqCst) {
            self.barrier.wait().await;
        }
        Ok(found)
    }

    async fn save(&self, ticket: &Ticket) -> RepositoryResult<u64> {
        self.inner.save(ticket).await
    }

    async fn list(&self, module_id: &str) -> RepositoryResult<Vec<Ticket>> {
        self.inner.list(module_id).await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn test_interleaved_status_changes_never_lose_an_audit_entry() {
    let repository = Arc::new(InterleavingRepository::new());
    let context = TicketingContext::assemble(
        TicketingConfig::default(),
        repository.clone(),
        Arc::new(InMemorySequenceAllocator::new()),
        Arc::new(InMemoryFileStore::new()),
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap(),
        )),
    )
    .unwrap();
    let executive = User::new("Eva Novak", Role::ExecutiveOfficer, "Management");

    let ticket = context
        .tickets
        .create_ticket(
            &executive,
            NewTicket::new("maintenance", "Roof leak", "Civil", "Facilities"),
        )
        .await
        .unwrap();
    let ticket = context
        .tickets
        .change_status(&executive, ticket.id, TicketStatus::Active, REMARKS)
        .await
        .unwrap();
    assert_eq!(ticket.version, 2);

    repository.armed.store(true, Ordering::SeqCst);
    let (start, cancel) = tokio::join!(
        context
            .tickets
            .change_status(&executive, ticket.id, TicketStatus::InProgress, REMARKS),
        context
            .tickets
            .change_status(&executive, ticket.id, TicketStatus::Cancelled, REMARKS),
    );
    repository.armed.store(false, Ordering::SeqCst);

    let (winner, loser) = match (start, cancel) {
        (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
        other => panic!("exactly one change should commit, got {other:?}"),
    };
    assert!(
        matches!(loser, TicketingError::ConcurrentModification(_)),
        "got {loser:?}"
    );
    assert!(loser.is_user_facing());

    let stored = context
        .tickets
        .get_ticket(&executive, ticket.id)
        .await
        .unwrap();
    assert_eq!(stored.status, winner.status);
    assert_eq!(stored.version, 3);
    assert_eq!(stored.audit_trail, winner.audit_trail);

    let changes: Vec<_> = stored
        .audit_trail
        .iter()
        .filter(|e| e.action == AuditAction::StatusChange)
        .map(|e| (e.old_value.clone(), e.new_value.clone()))
        .collect();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].0.as_deref(), Some("ACTIVE"));
    assert_eq!(changes[1].1.as_deref(), Some(winner.status.as_str()));
}

#[tokio::test]
async fn test_saving_a_stale_copy_is_rejected() {
    let world = crate::common::TestWorld::new();
    let ticket = world.active_ticket().await;

    world
        .context
        .tickets
        .change_status(&world.executive, ticket.id, TicketStatus::InProgress, REMARKS)
        .await
        .unwrap();

    let err = world.context.repository.save(&ticket).await.unwrap_err();
    let err = TicketingError::from(err);
    assert!(
        matches!(err, TicketingError::ConcurrentModification(_)),
        "got {err:?}"
    );

    let stored = world
        .context
        .tickets
        .get_ticket(&world.executive, ticket.id)
        .await
        .unwrap();
    assert_eq!(stored.status, TicketStatus::InProgress);
}
