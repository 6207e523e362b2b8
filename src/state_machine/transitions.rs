//! Static ticket status transition table.
//!
//! Reachability is independent of the actor; role scoping happens in
//! [`crate::policy::allowed_transitions`].

use super::states::TicketStatus;
use std::collections::BTreeSet;

/// Statuses reachable from `status` in one step
pub const fn allowed_targets(status: TicketStatus) -> &'static [TicketStatus] {
    use TicketStatus::*;
    match status {
        Draft => &[Created],
        Created => &[Approved, Active, Cancelled],
        Approved => &[Active, Cancelled],
        Active => &[InProgress, Completed, Cancelled],
        InProgress => &[Resolved, Cancelled],
        Resolved => &[Completed],
        // Reopen
        Completed => &[Closed, Active],
        Closed => &[Active],
        // Reinstate
        Cancelled => &[Created],
    }
}

/// Set form of [`allowed_targets`]; an empty set means the status is terminal
pub fn next_states(status: TicketStatus) -> BTreeSet<TicketStatus> {
    allowed_targets(status).iter().copied().collect()
}

pub fn is_valid_transition(from: TicketStatus, to: TicketStatus) -> bool {
    allowed_targets(from).contains(&to)
}
