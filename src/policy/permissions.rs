use crate::models::{Role, Ticket, User};
use crate::state_machine::transitions::next_states;
use crate::state_machine::TicketStatus;
use std::collections::BTreeSet;

/// Check if `actor` has any standing over `ticket` at all
pub fn has_authority(actor: &User, ticket: &Ticket) -> bool {
    match actor.role {
        Role::ExecutiveOfficer => true,
        Role::DepartmentOfficer => actor.in_department(&ticket.department),
        Role::Employee => ticket.is_created_by(actor.id),
    }
}

pub fn can_edit(actor: &User, ticket: &Ticket) -> bool {
    has_authority(actor, ticket)
}

/// Deletion is only possible before review starts, except for executive officers
pub fn can_delete(actor: &User, ticket: &Ticket) -> bool {
    match actor.role {
        Role::ExecutiveOfficer => true,
        Role::DepartmentOfficer | Role::Employee => {
            has_authority(actor, ticket) && ticket.status.is_deletable()
        }
    }
}

/// Officers may always attempt a status change (subject to [`allowed_transitions`]);
/// employees only on their own tickets before review starts
pub fn can_change_status(actor: &User, ticket: &Ticket) -> bool {
    match actor.role {
        Role::ExecutiveOfficer | Role::DepartmentOfficer => true,
        Role::Employee => ticket.is_created_by(actor.id) && ticket.status.is_deletable(),
    }
}

/// Narrow [`next_states`] to what `actor` may invoke on `ticket`.
///
/// Always a subset of `next_states(ticket.status)`.
pub fn allowed_transitions(actor: &User, ticket: &Ticket) -> BTreeSet<TicketStatus> {
    let reachable = next_states(ticket.status);
    match actor.role {
        Role::ExecutiveOfficer => reachable,
        Role::DepartmentOfficer if actor.in_department(&ticket.department) => reachable,
        Role::DepartmentOfficer => BTreeSet::new(),
        Role::Employee
            if ticket.is_created_by(actor.id) && ticket.status == TicketStatus::Draft =>
        {
            reachable
                .into_iter()
                .filter(|s| *s == TicketStatus::Created)
                .collect()
        }
        Role::Employee => BTreeSet::new(),
    }
}

/// Defining, editing and removing steps is reserved for executive officers
pub fn can_manage_steps(actor: &User) -> bool {
    actor.role == Role::ExecutiveOfficer
}

pub fn can_upload_documents(actor: &User, ticket: &Ticket) -> bool {
    actor.role.is_officer() && has_authority(actor, ticket)
}

pub fn can_change_step_status(actor: &User, ticket: &Ticket) -> bool {
    actor.role.is_officer() && has_authority(actor, ticket)
}
