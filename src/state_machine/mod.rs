// Ticket and step lifecycle.
//
// The static transition table lives in `transitions`; role scoping is applied
// by `crate::policy`. The two state machines combine both with the guards and
// persist accepted changes together with their audit entries.

pub mod actions;
pub mod errors;
pub mod events;
pub mod guards;
pub mod states;
pub mod step_state_machine;
pub mod ticket_state_machine;
pub mod transitions;

// Re-export main types for convenient access
pub use errors::{ActionError, GuardError, StateMachineError};
pub use events::TicketEvent;
pub use states::{StepStatus, TicketStatus};
pub use step_state_machine::StepStateMachine;
pub use ticket_state_machine::TicketStateMachine;
pub use transitions::{is_valid_transition, next_states};

// Common traits and utilities
pub use actions::{StateAction, Transition};
pub use guards::StateGuard;
