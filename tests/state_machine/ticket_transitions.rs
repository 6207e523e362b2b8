use crate::common::*;
use ticketing_core::models::{AuditAction, NewDocumentRequirement, NewStep};
use ticketing_core::state_machine::TicketStatus;
use ticketing_core::TicketingError;

#[tokio::test]
async fn test_employee_submits_own_draft() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;
    assert_eq!(draft.status, TicketStatus::Draft);
    let before = draft.audit_trail.len();

    let submitted = world
        .context
        .tickets
        .change_status(&world.employee, draft.id, TicketStatus::Created, SUBMIT_REMARKS)
        .await
        .unwrap();

    assert_eq!(submitted.status, TicketStatus::Created);
    assert_eq!(submitted.audit_trail.len(), before + 1);

    let entry = submitted.audit_trail.last().unwrap();
    assert_eq!(entry.action, AuditAction::StatusChange);
    assert_eq!(entry.old_value.as_deref(), Some("DRAFT"));
    assert_eq!(entry.new_value.as_deref(), Some("CREATED"));
    assert_eq!(entry.remarks.as_deref(), Some(SUBMIT_REMARKS));
    assert_eq!(entry.actor_id, world.employee.id);
    assert_eq!(submitted.updated_at, entry.timestamp);
}

#[tokio::test]
async fn test_officer_of_another_department_is_unauthorized() {
    let world = TestWorld::new();
    let active = world.active_ticket().await;

    let err = world
        .context
        .tickets
        .change_status(
            &world.finance_officer,
            active.id,
            TicketStatus::Completed,
            OFFICER_REMARKS,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");

    let stored = world
        .context
        .tickets
        .get_ticket(&world.executive, active.id)
        .await
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Active);
    assert_eq!(stored.audit_trail, active.audit_trail);
}

#[tokio::test]
async fn test_department_officer_cannot_resolve_with_missing_documents() {
    let world = TestWorld::new();
    let ticket = world.in_progress_ticket().await;
    let with_step = world
        .context
        .steps
        .add_step(
            &world.executive,
            ticket.id,
            NewStep::titled("Replace fitting")
                .with_requirement(NewDocumentRequirement::mandatory("Electrical safety certificate"))
                .with_requirement(NewDocumentRequirement::optional("Photos")),
        )
        .await
        .unwrap();

    let err = world
        .context
        .tickets
        .change_status(
            &world.facilities_officer,
            ticket.id,
            TicketStatus::Resolved,
            OFFICER_REMARKS,
        )
        .await
        .unwrap_err();

    match err {
        TicketingError::MissingMandatoryDocuments { missing } => {
            assert_eq!(missing, vec!["Step 1: Electrical safety certificate".to_string()]);
        }
        other => panic!("Expected MissingMandatoryDocuments, got {other:?}"),
    }

    let stored = world
        .context
        .tickets
        .get_ticket(&world.executive, ticket.id)
        .await
        .unwrap();
    assert_eq!(stored.status, TicketStatus::InProgress);
    assert_eq!(stored.audit_trail.len(), with_step.audit_trail.len());
}

#[tokio::test]
async fn test_department_officer_resolves_once_documents_are_uploaded() {
    let world = TestWorld::new();
    let ticket = world.in_progress_ticket().await;
    let ticket = world
        .context
        .steps
        .add_step(
            &world.executive,
            ticket.id,
            NewStep::titled("Replace fitting")
                .with_requirement(NewDocumentRequirement::mandatory("Safety certificate")),
        )
        .await
        .unwrap();
    let step = &ticket.steps[0];
    let requirement_id = step.document_requirements[0].id;

    world
        .context
        .steps
        .upload_requirement_document(
            &world.facilities_officer,
            ticket.id,
            step.id,
            requirement_id,
            pdf("certificate.pdf", "signed certificate"),
        )
        .await
        .unwrap();

    let resolved = world
        .context
        .tickets
        .change_status(
            &world.facilities_officer,
            ticket.id,
            TicketStatus::Resolved,
            OFFICER_REMARKS,
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, TicketStatus::Resolved);
}

#[tokio::test]
async fn test_executive_is_not_held_by_document_gate() {
    let world = TestWorld::new();
    let ticket = world.in_progress_ticket().await;
    world
        .context
        .steps
        .add_step(
            &world.executive,
            ticket.id,
            NewStep::titled("Replace fitting")
                .with_requirement(NewDocumentRequirement::mandatory("Safety certificate")),
        )
        .await
        .unwrap();

    let resolved = world.advance(ticket.id, &[TicketStatus::Resolved]).await;
    assert_eq!(resolved.status, TicketStatus::Resolved);
}

#[tokio::test]
async fn test_invalid_transition_changes_nothing() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;

    let err = world
        .context
        .tickets
        .change_status(&world.executive, draft.id, TicketStatus::Closed, OFFICER_REMARKS)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TicketingError::InvalidTransition {
            from: TicketStatus::Draft,
            to: TicketStatus::Closed,
        }
    );

    let stored = world
        .context
        .tickets
        .get_ticket(&world.executive, draft.id)
        .await
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Draft);
    assert_eq!(stored.audit_trail, draft.audit_trail);
}

#[tokio::test]
async fn test_short_remarks_are_rejected_before_anything_else() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;

    let err = world
        .context
        .tickets
        .change_status(&world.finance_officer, draft.id, TicketStatus::Closed, "  ok  ")
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::ValidationError(_)), "got {err:?}");
}

#[tokio::test]
async fn test_employee_cannot_move_ticket_past_created() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;
    world
        .context
        .tickets
        .change_status(&world.employee, draft.id, TicketStatus::Created, SUBMIT_REMARKS)
        .await
        .unwrap();

    let err = world
        .context
        .tickets
        .change_status(&world.employee, draft.id, TicketStatus::Cancelled, SUBMIT_REMARKS)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            TicketingError::InvalidTransition {
                from: TicketStatus::Created,
                to: TicketStatus::Cancelled
            }
        ),
        "got {err:?}"
    );

    let err = world
        .context
        .tickets
        .change_status(&world.other_employee, draft.id, TicketStatus::Cancelled, SUBMIT_REMARKS)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");
}

#[tokio::test]
async fn test_full_lifecycle_with_reopen() {
    let world = TestWorld::new();
    let draft = world.draft_ticket().await;

    let closed = world
        .advance(
            draft.id,
            &[
                TicketStatus::Created,
                TicketStatus::Approved,
                TicketStatus::Active,
                TicketStatus::InProgress,
                TicketStatus::Resolved,
                TicketStatus::Completed,
                TicketStatus::Closed,
            ],
        )
        .await;
    assert_eq!(closed.status, TicketStatus::Closed);

    let reopened = world.advance(draft.id, &[TicketStatus::Active]).await;
    assert_eq!(reopened.status, TicketStatus::Active);

    let status_changes = reopened
        .audit_trail
        .iter()
        .filter(|e| e.action == AuditAction::StatusChange)
        .count();
    assert_eq!(status_changes, 8);
}

#[tokio::test]
async fn test_status_change_is_published() {
    let world = TestWorld::new();
    let mut events = world.context.events.subscribe();
    let draft = world.draft_ticket().await;
    world
        .context
        .tickets
        .change_status(&world.employee, draft.id, TicketStatus::Created, SUBMIT_REMARKS)
        .await
        .unwrap();

    let created = events.recv().await.unwrap();
    assert_eq!(created.name, "ticket.created");

    let changed = events.recv().await.unwrap();
    assert_eq!(changed.name, "ticket.status_changed");
    assert_eq!(changed.context["from_status"], "DRAFT");
    assert_eq!(changed.context["to_status"], "CREATED");
}
