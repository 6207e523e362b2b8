//! # Structured Logging Module
//!
//! Environment-aware structured logging. Development and test get readable
//! console output at debug level; production gets JSON lines at info level.
//! `RUST_LOG`, when set, overrides the level.

use crate::constants::environments;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = std::env::var("RUST_LOG")
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(get_log_level(&environment)));

        let layer = if environment == environments::PRODUCTION {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A subscriber installed by the host application takes precedence
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("TICKETING_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| environments::DEVELOPMENT.to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        environments::PRODUCTION => "info".to_string(),
        environments::TEST | environments::DEVELOPMENT => "debug".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for ticket operations
pub fn log_ticket_operation(
    operation: &str,
    ticket_id: Option<Uuid>,
    ticket_number: Option<&str>,
    actor_id: Option<Uuid>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        ticket_id = ?ticket_id,
        ticket_number = ticket_number,
        actor_id = ?actor_id,
        status = %status,
        details = details,
        "🎫 TICKET_OPERATION"
    );
}

/// Log structured data for step operations
pub fn log_step_operation(
    operation: &str,
    ticket_id: Option<Uuid>,
    step_id: Option<Uuid>,
    step_number: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        ticket_id = ?ticket_id,
        step_id = ?step_id,
        step_number = step_number,
        status = %status,
        details = details,
        "🔧 STEP_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        "❌ ERROR"
    );
}
