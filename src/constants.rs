//! # System Constants
//!
//! Defaults for the ticket policy. Most of these can be overridden through
//! [`crate::config::TicketingConfig`].

/// Trimmed character count a status-change remark must reach
pub const MIN_REMARK_LENGTH: usize = 10;

/// Zero-padded width of the numeric part of a ticket number (`MNT-0007`)
pub const DEFAULT_TICKET_NUMBER_WIDTH: usize = 4;

/// Attempts made to allocate and save a fresh ticket number before giving up
pub const DEFAULT_ALLOCATION_MAX_ATTEMPTS: u32 = 5;

pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Filter value selecting tickets with no assignee
pub const UNASSIGNED: &str = "unassigned";

pub const MAX_TITLE_LENGTH: usize = 200;

pub mod environments {
    pub const DEVELOPMENT: &str = "development";
    pub const TEST: &str = "test";
    pub const PRODUCTION: &str = "production";
}
