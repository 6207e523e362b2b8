//! Wiring of stores, publisher, clock and services from a [`TicketingConfig`].

use crate::clock::{Clock, SystemClock};
use crate::config::TicketingConfig;
use crate::database::{DatabaseConnection, DatabaseMigrations};
use crate::error::{Result, TicketingError};
use crate::events::EventPublisher;
use crate::models::ModuleRegistry;
use crate::repository::{
    FileStore, InMemoryFileStore, InMemorySequenceAllocator, InMemoryTicketRepository,
    PgSequenceAllocator, PgTicketRepository, SequenceAllocator, TicketRepository,
};
use crate::services::{StepService, TicketNumberAllocator, TicketService};
use crate::state_machine::{StepStateMachine, TicketStateMachine};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared handles for one ticketing deployment
pub struct TicketingContext {
    pub config: TicketingConfig,
    pub repository: Arc<dyn TicketRepository>,
    pub sequences: Arc<dyn SequenceAllocator>,
    pub file_store: Arc<dyn FileStore>,
    pub clock: Arc<dyn Clock>,
    pub events: EventPublisher,
    pub tickets: TicketService,
    pub steps: StepService,
}

impl std::fmt::Debug for TicketingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketingContext")
            .field("environment", &self.config.environment)
            .field("tickets", &self.tickets)
            .field("steps", &self.steps)
            .finish()
    }
}

impl TicketingContext {
    /// Everything in memory, on the system clock
    pub fn in_memory(config: TicketingConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Everything in memory, on the given clock
    pub fn with_clock(config: TicketingConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::assemble(
            config,
            Arc::new(InMemoryTicketRepository::new()),
            Arc::new(InMemorySequenceAllocator::new()),
            Arc::new(InMemoryFileStore::new()),
            clock,
        )
    }

    /// Tickets and sequences in PostgreSQL; uploaded bytes stay in memory
    pub fn postgres(config: TicketingConfig, pool: PgPool) -> Result<Self> {
        Self::assemble(
            config,
            Arc::new(PgTicketRepository::new(pool.clone())),
            Arc::new(PgSequenceAllocator::new(pool)),
            Arc::new(InMemoryFileStore::new()),
            Arc::new(SystemClock),
        )
    }

    /// Connect to PostgreSQL, apply outstanding migrations unless disabled, and wire the services
    pub async fn connect(config: TicketingConfig) -> Result<Self> {
        let db = DatabaseConnection::new(&config).await?;
        if !db.health_check().await? {
            return Err(TicketingError::PersistenceError(
                "database health check failed".to_string(),
            ));
        }
        if config.database.skip_migrations {
            tracing::info!("Skipping database migrations");
        } else {
            DatabaseMigrations::run_all(db.pool()).await?;
        }
        Self::postgres(config, db.pool().clone())
    }

    pub fn assemble(
        config: TicketingConfig,
        repository: Arc<dyn TicketRepository>,
        sequences: Arc<dyn SequenceAllocator>,
        file_store: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let events = if config.events.enabled {
            EventPublisher::new(config.events.channel_capacity)
        } else {
            EventPublisher::disabled()
        };
        let min_remarks = config.workflow.min_remark_length;

        let ticket_machine = TicketStateMachine::new(
            repository.clone(),
            clock.clone(),
            events.clone(),
            min_remarks,
        );
        let tickets = TicketService::new(
            repository.clone(),
            TicketNumberAllocator::new(sequences.clone(), config.numbering.width),
            ModuleRegistry::new(config.modules.iter().cloned()),
            ticket_machine,
            events.clone(),
            clock.clone(),
            config.numbering.max_attempts,
        );

        let step_machine = StepStateMachine::new(
            repository.clone(),
            file_store.clone(),
            clock.clone(),
            events.clone(),
            min_remarks,
        );
        let steps = StepService::new(
            repository.clone(),
            file_store.clone(),
            step_machine,
            events.clone(),
            clock.clone(),
        );

        tracing::info!(
            environment = %config.environment,
            modules = config.modules.len(),
            events_enabled = events.is_enabled(),
            "Ticketing context initialized"
        );

        Ok(Self {
            config,
            repository,
            sequences,
            file_store,
            clock,
            events,
            tickets,
            steps,
        })
    }
}
