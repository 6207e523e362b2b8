//! # Database Operations
//!
//! Connection pooling and schema migrations for the PostgreSQL backend.
//!
//! - [`connection`] - pool construction from [`crate::config::DatabaseConfig`] and health checks
//! - [`migrations`] - ordered application of the SQL files in `migrations/`
//!
//! ```rust,no_run
//! use ticketing_core::config::TicketingConfig;
//! use ticketing_core::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TicketingConfig::default();
//! let db = DatabaseConnection::from_config(&config).await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;
