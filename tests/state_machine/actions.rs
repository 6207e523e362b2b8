use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use ticketing_core::events::EventPublisher;
use ticketing_core::models::{NewTicket, Role, Ticket, User};
use ticketing_core::repository::{InMemoryTicketRepository, TicketRepository};
use ticketing_core::state_machine::errors::{ActionError, ActionResult};
use ticketing_core::state_machine::{StateAction, TicketStateMachine, TicketStatus, Transition};
use ticketing_core::{FixedClock, TicketingContext, TicketingConfig};

#[derive(Debug, Default)]
struct RecordingAction {
    seen: Mutex<Vec<Transition>>,
}

#[async_trait]
impl StateAction<Ticket> for RecordingAction {
    async fn execute(&self, _ticket: &Ticket, transition: &Transition) -> ActionResult<()> {
        self.seen.lock().push(transition.clone());
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Record transitions"
    }
}

#[derive(Debug)]
struct FailingAction;

#[async_trait]
impl StateAction<Ticket> for FailingAction {
    async fn execute(&self, _ticket: &Ticket, _transition: &Transition) -> ActionResult<()> {
        Err(ActionError::EventPublishFailed {
            event_name: "audit.mirror".to_string(),
        })
    }

    fn description(&self) -> &'static str {
        "Always fails"
    }
}

#[tokio::test]
async fn test_actions_run_after_commit_and_failures_do_not_roll_back() {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap(),
    ));
    let repository = Arc::new(InMemoryTicketRepository::new());
    let context = TicketingContext::assemble(
        TicketingConfig::default(),
        repository.clone(),
        Arc::new(ticketing_core::repository::InMemorySequenceAllocator::new()),
        Arc::new(ticketing_core::repository::InMemoryFileStore::new()),
        clock.clone(),
    )
    .unwrap();

    let employee = User::new("Ana Lima", Role::Employee, "Facilities");
    let draft = context
        .tickets
        .create_ticket(
            &employee,
            NewTicket::new("maintenance", "Leaking tap", "Plumbing", "Facilities"),
        )
        .await
        .unwrap();

    let recorder = Arc::new(RecordingAction::default());
    let machine = TicketStateMachine::new(
        repository.clone(),
        clock.clone(),
        EventPublisher::disabled(),
        10,
    )
    .with_action(Arc::new(FailingAction))
    .with_action(recorder.clone());

    let submitted = machine
        .change_status(&employee, draft.id, TicketStatus::Created, "Submitting now")
        .await
        .unwrap();
    assert_eq!(submitted.status, TicketStatus::Created);

    let seen = recorder.seen.lock().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].from_state.as_deref(), Some("DRAFT"));
    assert_eq!(seen[0].to_state, "CREATED");
    assert_eq!(seen[0].event, "submitted");
    assert_eq!(seen[0].occurred_at, submitted.updated_at);

    let stored = repository.find_by_id(draft.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TicketStatus::Created);
}
