use crate::common::*;
use ticketing_core::models::{AuditAction, NewDocumentRequirement, NewStep, StepUpdate};
use ticketing_core::repository::files::matches_content;
use ticketing_core::repository::FileStore;
use ticketing_core::state_machine::StepStatus;
use ticketing_core::TicketingError;

#[tokio::test]
async fn test_steps_are_numbered_and_audited() {
    let world = TestWorld::new();
    let ticket = world.active_ticket().await;

    let ticket = world
        .context
        .steps
        .add_step(&world.executive, ticket.id, NewStep::titled("Isolate circuit"))
        .await
        .unwrap();
    let ticket = world
        .context
        .steps
        .add_step(&world.executive, ticket.id, NewStep::titled("Replace fitting"))
        .await
        .unwrap();

    let numbers: Vec<_> = ticket.steps.iter().map(|s| s.step_number.as_str()).collect();
    assert_eq!(numbers, vec!["1", "2"]);
    assert!(ticket.steps.iter().all(|s| s.status == StepStatus::Pending));

    let entry = ticket.audit_trail.last().unwrap();
    assert_eq!(entry.action, AuditAction::StepAdded);
    assert_eq!(entry.new_value.as_deref(), Some("Step 2: Replace fitting"));
}

#[tokio::test]
async fn test_step_numbering_stops_at_the_largest_label() {
    let world = TestWorld::new();
    let ticket = world.active_ticket().await;

    let mut last = NewStep::titled("Archive");
    last.step_number = Some(u64::MAX.to_string());
    let ticket = world
        .context
        .steps
        .add_step(&world.executive, ticket.id, last)
        .await
        .unwrap();

    let err = world
        .context
        .steps
        .add_step(&world.executive, ticket.id, NewStep::titled("Next"))
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::ValidationError(_)), "got {err:?}");

    let stored = world
        .context
        .tickets
        .get_ticket(&world.executive, ticket.id)
        .await
        .unwrap();
    assert_eq!(stored.steps.len(), 1);
    assert_eq!(stored.audit_trail.len(), ticket.audit_trail.len());
}

#[tokio::test]
async fn test_only_executives_manage_steps() {
    let world = TestWorld::new();
    let ticket = world.active_ticket().await;

    let err = world
        .context
        .steps
        .add_step(&world.facilities_officer, ticket.id, NewStep::titled("Inspect"))
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");

    let ticket = world
        .context
        .steps
        .add_step(&world.executive, ticket.id, NewStep::titled("Inspect"))
        .await
        .unwrap();
    let step_id = ticket.steps[0].id;

    let err = world
        .context
        .steps
        .delete_step(&world.employee, ticket.id, step_id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");
}

#[tokio::test]
async fn test_update_and_delete_step() {
    let world = TestWorld::new();
    let ticket = world.active_ticket().await;
    let ticket = world
        .context
        .steps
        .add_step(&world.executive, ticket.id, NewStep::titled("Inspect"))
        .await
        .unwrap();
    let step_id = ticket.steps[0].id;

    let updated = world
        .context
        .steps
        .update_step(
            &world.executive,
            ticket.id,
            step_id,
            StepUpdate {
                title: Some("Inspect panel".to_string()),
                add_requirements: vec![NewDocumentRequirement::mandatory("Inspection report")],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let entry = updated.audit_trail.last().unwrap();
    assert_eq!(entry.action, AuditAction::StepUpdated);
    assert_eq!(entry.old_value.as_deref(), Some("Step 1: Inspect"));
    assert_eq!(entry.new_value.as_deref(), Some("Step 1: Inspect panel"));
    assert_eq!(updated.steps[0].document_requirements.len(), 1);

    let deleted = world
        .context
        .steps
        .delete_step(&world.executive, ticket.id, step_id)
        .await
        .unwrap();
    assert!(deleted.steps.is_empty());
    let entry = deleted.audit_trail.last().unwrap();
    assert_eq!(entry.action, AuditAction::StepDeleted);
    assert_eq!(entry.old_value.as_deref(), Some("Step 1: Inspect panel"));

    let err = world
        .context
        .steps
        .delete_step(&world.executive, ticket.id, step_id)
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_upload_fills_requirement_and_stores_bytes() {
    let world = TestWorld::new();
    let ticket = world.active_ticket().await;
    let ticket = world
        .context
        .steps
        .add_step(
            &world.executive,
            ticket.id,
            NewStep::titled("Permit").with_requirement(NewDocumentRequirement::mandatory("Work permit")),
        )
        .await
        .unwrap();
    let step = ticket.steps[0].clone();
    let requirement_id = step.document_requirements[0].id;

    let err = world
        .context
        .steps
        .upload_requirement_document(
            &world.employee,
            ticket.id,
            step.id,
            requirement_id,
            pdf("permit.pdf", "permit 42"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");

    let err = world
        .context
        .steps
        .upload_requirement_document(
            &world.facilities_officer,
            ticket.id,
            step.id,
            requirement_id,
            pdf("empty.pdf", ""),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::ValidationError(_)), "got {err:?}");

    let uploaded = world
        .context
        .steps
        .upload_requirement_document(
            &world.facilities_officer,
            ticket.id,
            step.id,
            requirement_id,
            pdf("permit.pdf", "permit 42"),
        )
        .await
        .unwrap();

    let file_ref = uploaded.steps[0].document_requirements[0]
        .uploaded_file
        .clone()
        .expect("requirement should be filled");
    assert_eq!(file_ref.name, "permit.pdf");
    assert_eq!(file_ref.uploaded_by, world.facilities_officer.id);
    assert!(uploaded.unmet_mandatory_requirements().is_empty());

    let bytes = world
        .context
        .file_store
        .fetch(&file_ref.digest)
        .await
        .unwrap()
        .expect("bytes should be stored");
    assert!(matches_content(&file_ref, &bytes));

    let entry = uploaded.audit_trail.last().unwrap();
    assert_eq!(entry.action, AuditAction::StepUpdated);
    assert_eq!(entry.new_value.as_deref(), Some("permit.pdf"));
}

#[tokio::test]
async fn test_comments_are_recorded_in_the_audit_trail() {
    let world = TestWorld::new();
    let ticket = world.active_ticket().await;
    let ticket = world
        .context
        .steps
        .add_step(&world.executive, ticket.id, NewStep::titled("Inspect"))
        .await
        .unwrap();
    let step_id = ticket.steps[0].id;

    let commented = world
        .context
        .steps
        .add_comment(&world.employee, ticket.id, step_id, "  Light is flickering again  ")
        .await
        .unwrap();
    let comments = &commented.steps[0].comments;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "Light is flickering again");
    assert_eq!(comments[0].created_by, world.employee.id);
    assert_eq!(commented.audit_trail.len(), ticket.audit_trail.len() + 1);

    let entry = commented.audit_trail.last().unwrap();
    assert_eq!(entry.action, AuditAction::StepUpdated);
    assert_eq!(entry.actor_id, world.employee.id);
    assert_eq!(entry.new_value.as_deref(), Some("Light is flickering again"));
    assert_eq!(entry.remarks.as_deref(), Some("Step 1: Inspect: comment added"));

    let err = world
        .context
        .steps
        .add_comment(&world.employee, ticket.id, step_id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::ValidationError(_)), "got {err:?}");

    let err = world
        .context
        .steps
        .add_comment(&world.finance_officer, ticket.id, step_id, "Checking in")
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::Unauthorized(_)), "got {err:?}");
}
