//! # Access-Control Policy
//!
//! The only place role checks are made. Services and state machines call these
//! predicates before touching a ticket; a `false` answer rejects the request
//! before any mutation or audit entry is written.
//!
//! | Role | Authority over a ticket |
//! |------|-------------------------|
//! | Executive Officer | every ticket |
//! | Department Officer | tickets of their own department |
//! | Employee | tickets they created |

pub mod permissions;
pub mod visibility;

pub use crate::state_machine::transitions::next_states;
pub use permissions::{
    allowed_transitions, can_change_status, can_change_step_status, can_delete, can_edit,
    can_manage_steps, can_upload_documents, has_authority,
};
pub use visibility::{assignable_users, can_view, visible_audit_trail};
