use crate::common::*;
use ticketing_core::models::{AuditAction, NewTicket, Priority, TicketUpdate};
use ticketing_core::state_machine::{TicketEvent, TicketStatus};
use ticketing_core::TicketingError;

#[tokio::test]
async fn test_create_assigns_sequential_numbers_per_module() {
    let world = TestWorld::new();
    let first = world.draft_ticket().await;
    let second = world.draft_ticket().await;
    let grievance = world
        .context
        .tickets
        .create_ticket(
            &world.employee,
            NewTicket::new("grievances", "Late salary", "Payroll", "Facilities").submitted(),
        )
        .await
        .unwrap();

    assert_eq!(first.ticket_number, "MNT-0001");
    assert_eq!(second.ticket_number, "MNT-0002");
    assert_eq!(grievance.ticket_number, "GRV-0001");
    assert_eq!(grievance.status, TicketStatus::Created);

    let entry = &first.audit_trail[0];
    assert_eq!(first.audit_trail.len(), 1);
    assert_eq!(entry.action, AuditAction::Created);
    assert_eq!(entry.new_value.as_deref(), Some("DRAFT"));
    assert_eq!(first.created_by, world.employee.id);
}

#[tokio::test]
async fn test_create_rejects_unknown_category_and_module() {
    let world = TestWorld::new();

    let err = world
        .context
        .tickets
        .create_ticket(
            &world.employee,
            NewTicket::new("maintenance", "Late salary", "Payroll", "Facilities"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::ValidationError(_)), "got {err:?}");

    let err = world
        .context
        .tickets
        .create_ticket(
            &world.employee,
            NewTicket::new("fleet", "Flat tyre", "Vehicles", "Facilities"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_update_records_changed_fields() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;

    let updated = world
        .context
        .tickets
        .update_ticket(
            &world.employee,
            draft.id,
            TicketUpdate {
                title: Some("Broken light in east corridor".to_string()),
                priority: Some(Priority::High),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Broken light in east corridor");
    assert_eq!(updated.priority, Priority::High);
    let entry = updated.audit_trail.last().unwrap();
    assert_eq!(entry.action, AuditAction::Updated);
    assert_eq!(entry.new_value.as_deref(), Some("title, priority"));

    let unchanged = world
        .context
        .tickets
        .update_ticket(&world.employee, draft.id, TicketUpdate::default())
        .await
        .unwrap();
    assert_eq!(unchanged.audit_trail.len(), updated.audit_trail.len());
}

#[tokio::test]
async fn test_only_authorised_actors_edit() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;
    let update = TicketUpdate {
        description: Some("Sparks seen".to_string()),
        ..Default::default()
    };

    for actor in [&world.other_employee, &world.finance_officer] {
        let err = world
            .context
            .tickets
            .update_ticket(actor, draft.id, update.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");
    }

    for actor in [&world.facilities_officer, &world.executive] {
        world
            .context
            .tickets
            .update_ticket(actor, draft.id, update.clone())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_delete_is_limited_to_early_statuses() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;

    let deleted = world
        .context
        .tickets
        .delete_ticket(&world.employee, draft.id)
        .await
        .unwrap();
    assert_eq!(deleted.audit_trail.last().unwrap().action, AuditAction::Deleted);

    let err = world
        .context
        .tickets
        .get_ticket(&world.executive, draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::NotFound(_)), "got {err:?}");

    let active = world.active_ticket().await;
    let err = world
        .context
        .tickets
        .delete_ticket(&world.facilities_officer, active.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");

    world
        .context
        .tickets
        .delete_ticket(&world.executive, active.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_employees_see_only_their_tickets_and_basic_history() {
    let world = TestWorld::new();
    let ticket = world.active_ticket().await;

    let err = world
        .context
        .tickets
        .get_ticket(&world.other_employee, ticket.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");

    world
        .context
        .steps
        .add_step(
            &world.executive,
            ticket.id,
            ticketing_core::models::NewStep::titled("Inspect"),
        )
        .await
        .unwrap();

    let trail = world
        .context
        .tickets
        .audit_trail(&world.employee, ticket.id)
        .await
        .unwrap();
    assert!(trail.iter().all(|e| !e.action.is_step_action()));
    assert_eq!(trail.first().unwrap().new_value.as_deref(), Some("ACTIVE"));

    let full = world
        .context
        .tickets
        .audit_trail(&world.executive, ticket.id)
        .await
        .unwrap();
    assert_eq!(full.first().unwrap().action, AuditAction::StepAdded);
    assert_eq!(full.len(), trail.len() + 1);
}

#[tokio::test]
async fn test_available_transitions_are_role_scoped() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;

    let for_employee = world
        .context
        .tickets
        .available_transitions(&world.employee, draft.id)
        .await
        .unwrap();
    assert_eq!(for_employee.len(), 1);
    assert_eq!(for_employee[0].target, TicketStatus::Created);
    assert_eq!(for_employee[0].event, TicketEvent::Submit);
    assert_eq!(for_employee[0].label(), "Submit for Review");

    let active = world.active_ticket().await;
    let targets: Vec<_> = world
        .context
        .tickets
        .available_transitions(&world.facilities_officer, active.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.target)
        .collect();
    assert_eq!(
        targets,
        vec![
            TicketStatus::InProgress,
            TicketStatus::Completed,
            TicketStatus::Cancelled
        ]
    );
}
