use super::permissions::has_authority;
use crate::models::{AuditAction, AuditEntry, Role, Ticket, User};

/// Executive officers see everything, department officers their department, employees their own tickets
pub fn can_view(actor: &User, ticket: &Ticket) -> bool {
    has_authority(actor, ticket)
}

/// Employees see ticket-level history only; step activity is hidden from them
pub fn visible_audit_trail<'a>(actor: &User, trail: &'a [AuditEntry]) -> Vec<&'a AuditEntry> {
    trail
        .iter()
        .filter(|entry| match actor.role {
            Role::Employee => matches!(
                entry.action,
                AuditAction::StatusChange | AuditAction::Created | AuditAction::Updated
            ),
            Role::DepartmentOfficer | Role::ExecutiveOfficer => true,
        })
        .collect()
}

/// Users `actor` may assign tickets or steps to
pub fn assignable_users<'a>(actor: &User, users: &'a [User]) -> Vec<&'a User> {
    users
        .iter()
        .filter(|u| match actor.role {
            Role::ExecutiveOfficer => true,
            Role::DepartmentOfficer => u.in_department(&actor.department),
            Role::Employee => false,
        })
        .collect()
}
