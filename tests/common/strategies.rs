use chrono::Utc;
use proptest::prelude::*;
use ticketing_core::models::{Priority, Role, Ticket, User};
use ticketing_core::state_machine::TicketStatus;
use uuid::Uuid;

pub fn status_strategy() -> impl Strategy<Value = TicketStatus> {
    prop::sample::select(TicketStatus::ALL.to_vec())
}

pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Employee),
        Just(Role::DepartmentOfficer),
        Just(Role::ExecutiveOfficer),
    ]
}

pub fn department_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Facilities".to_string(),
        "Finance".to_string(),
        "HR".to_string(),
    ])
}

/// Remarks of arbitrary length, including whitespace-only padding
pub fn remarks_strategy() -> impl Strategy<Value = String> {
    "[ ]{0,3}[a-zA-Z .]{0,20}[ ]{0,3}"
}

/// An actor and a ticket, where the actor may or may not be the creator
pub fn actor_and_ticket_strategy() -> impl Strategy<Value = (User, Ticket)> {
    (
        role_strategy(),
        department_strategy(),
        department_strategy(),
        status_strategy(),
        any::<bool>(),
    )
        .prop_map(|(role, actor_department, ticket_department, status, is_creator)| {
            let actor = User::new("Prop Actor", role, actor_department);
            let created_by = if is_creator { actor.id } else { Uuid::new_v4() };
            let now = Utc::now();
            let ticket = Ticket {
                id: Uuid::new_v4(),
                ticket_number: "MNT-0001".to_string(),
                module_id: "maintenance".to_string(),
                title: "Generated".to_string(),
                description: String::new(),
                status,
                priority: Priority::Medium,
                category: "Electrical".to_string(),
                department: ticket_department,
                created_by,
                assigned_to: None,
                created_at: now,
                updated_at: now,
                due_date: None,
                steps: Vec::new(),
                attachments: Vec::new(),
                audit_trail: Vec::new(),
                version: 0,
            };
            (actor, ticket)
        })
}
