use crate::common::*;
use ticketing_core::models::{NewTicket, Priority, Role, User};
use ticketing_core::state_machine::TicketStatus;
use ticketing_core::{AssigneeFilter, TicketFilters, TicketingError};

async fn seed(world: &TestWorld) {
    let finance_employee = User::new("Fay Wong", Role::Employee, "Finance");
    let mut urgent = NewTicket::new("maintenance", "Water leak in server room", "Plumbing", "Facilities");
    urgent.priority = Priority::Critical;
    urgent.assigned_to = Some(world.facilities_officer.id);

    world
        .context
        .tickets
        .create_ticket(&world.employee, urgent)
        .await
        .unwrap();
    world.draft_ticket().await;
    world
        .context
        .tickets
        .create_ticket(
            &finance_employee,
            NewTicket::new("maintenance", "Printer jammed", "IT Equipment", "Finance").submitted(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_listing_respects_visibility() {
    let world = TestWorld::new();
    seed(&world).await;

    let all = world
        .context
        .tickets
        .list_tickets(&world.executive, "maintenance", &TicketFilters::new())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let facilities = world
        .context
        .tickets
        .list_tickets(&world.facilities_officer, "maintenance", &TicketFilters::new())
        .await
        .unwrap();
    assert_eq!(facilities.len(), 2);

    let own = world
        .context
        .tickets
        .list_tickets(&world.employee, "maintenance", &TicketFilters::new())
        .await
        .unwrap();
    assert_eq!(own.len(), 2);

    let none = world
        .context
        .tickets
        .list_tickets(&world.other_employee, "maintenance", &TicketFilters::new())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_filters_narrow_visible_tickets() {
    let world = TestWorld::new();
    seed(&world).await;
    let tickets = &world.context.tickets;

    let leak = tickets
        .list_tickets(
            &world.executive,
            "maintenance",
            &TicketFilters::new().search("LEAK"),
        )
        .await
        .unwrap();
    assert_eq!(leak.len(), 1);
    assert_eq!(leak[0].priority, Priority::Critical);

    let unassigned = tickets
        .list_tickets(
            &world.executive,
            "maintenance",
            &TicketFilters::new().assigned_to(AssigneeFilter::Unassigned),
        )
        .await
        .unwrap();
    assert_eq!(unassigned.len(), 2);

    let finance_created = tickets
        .list_tickets(
            &world.executive,
            "maintenance",
            &TicketFilters::new()
                .in_department("finance")
                .with_status(TicketStatus::Created),
        )
        .await
        .unwrap();
    assert_eq!(finance_created.len(), 1);
    assert_eq!(finance_created[0].title, "Printer jammed");
}

#[tokio::test]
async fn test_status_counts_cover_every_status() {
    let world = TestWorld::new();
    seed(&world).await;

    let counts = world
        .context
        .tickets
        .status_counts(&world.executive, "maintenance")
        .await
        .unwrap();
    assert_eq!(counts.len(), TicketStatus::ALL.len());
    assert_eq!(counts[&TicketStatus::Draft], 2);
    assert_eq!(counts[&TicketStatus::Created], 1);
    assert_eq!(counts[&TicketStatus::Closed], 0);

    let err = world
        .context
        .tickets
        .status_counts(&world.executive, "fleet")
        .await
        .unwrap_err();
    assert!(matches!(err, TicketingError::NotFound(_)), "got {err:?}");
}
