//! # Ticketing Configuration
//!
//! Layered configuration: built-in defaults, `config/ticketing.toml`, an
//! environment overlay `config/ticketing.{env}.toml`, then `TICKETING__*`
//! environment variables (`TICKETING__DATABASE__POOL=20` sets `database.pool`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ticketing_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let width = manager.config().numbering.width;
//! let url = manager.config().database_url();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{
    environments, DEFAULT_ALLOCATION_MAX_ATTEMPTS, DEFAULT_EVENT_CHANNEL_CAPACITY,
    DEFAULT_TICKET_NUMBER_WIDTH, MIN_REMARK_LENGTH,
};
use crate::models::TicketModule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/ticketing.toml`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TicketingConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub numbering: NumberingConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub events: EventsConfig,

    /// Ticket modules; each has its own number prefix and category list
    #[serde(default = "default_modules")]
    pub modules: Vec<TicketModule>,
}

fn default_environment() -> String {
    environments::DEVELOPMENT.to_string()
}

fn default_modules() -> Vec<TicketModule> {
    vec![
        TicketModule {
            id: "maintenance".to_string(),
            name: "Maintenance".to_string(),
            description: "Facility and equipment maintenance requests".to_string(),
            prefix: "MNT".to_string(),
            categories: vec![
                "Electrical".to_string(),
                "Plumbing".to_string(),
                "Civil".to_string(),
                "IT Equipment".to_string(),
            ],
            active: true,
        },
        TicketModule {
            id: "grievances".to_string(),
            name: "Grievances".to_string(),
            description: "Employee grievances and complaints".to_string(),
            prefix: "GRV".to_string(),
            categories: vec![
                "Payroll".to_string(),
                "Workplace".to_string(),
                "Policy".to_string(),
            ],
            active: true,
        },
    ]
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            database: DatabaseConfig::default(),
            numbering: NumberingConfig::default(),
            workflow: WorkflowConfig::default(),
            events: EventsConfig::default(),
            modules: default_modules(),
        }
    }
}

/// Database connection and pooling configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual fields
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Explicit database name; otherwise `ticketing_{environment}`
    pub database: Option<String>,
    pub pool: u32,
    pub connect_timeout_seconds: u64,
    pub skip_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            username: "ticketing".to_string(),
            password: "ticketing".to_string(),
            database: None,
            pool: 10,
            connect_timeout_seconds: 30,
            skip_migrations: false,
        }
    }
}

impl DatabaseConfig {
    /// Get database name for the given environment
    pub fn database_name(&self, environment: &str) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| format!("ticketing_{environment}"))
    }
}

/// Ticket number format and allocation retries
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NumberingConfig {
    pub width: usize,
    pub max_attempts: u32,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_TICKET_NUMBER_WIDTH,
            max_attempts: DEFAULT_ALLOCATION_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Trimmed length a remark must reach on status changes and step completion
    pub min_remark_length: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            min_remark_length: MIN_REMARK_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    pub enabled: bool,
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl TicketingConfig {
    /// Connection URL, built from the individual fields when `database.url` is unset
    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database.url {
            return url.clone();
        }
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.database.username,
            self.database.password,
            self.database.host,
            self.database.port,
            self.database.database_name(&self.environment)
        )
    }

    pub fn is_production(&self) -> bool {
        self.environment == environments::PRODUCTION
    }

    pub fn module(&self, module_id: &str) -> Option<&TicketModule> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.environment.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "environment",
                "root configuration",
            ));
        }

        if self.database.url.is_none() && self.database.host.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "database.host",
                "database configuration",
            ));
        }

        if self.database.pool == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.pool",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if self.numbering.width == 0 || self.numbering.width > 12 {
            return Err(ConfigurationError::invalid_value(
                "numbering.width",
                self.numbering.width.to_string(),
                "width must be between 1 and 12",
            ));
        }

        if self.numbering.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "numbering.max_attempts",
                "0",
                "at least one allocation attempt is required",
            ));
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                "0",
                "channel capacity must be greater than 0",
            ));
        }

        let mut ids = HashSet::new();
        let mut prefixes = HashSet::new();
        for module in &self.modules {
            if module.id.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "modules.id",
                    "module configuration",
                ));
            }
            if module.prefix.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    format!("modules.{}.prefix", module.id),
                    "module configuration",
                ));
            }
            if !ids.insert(module.id.as_str()) {
                return Err(ConfigurationError::invalid_value(
                    "modules.id",
                    module.id.clone(),
                    "module ids must be unique",
                ));
            }
            if !prefixes.insert(module.prefix.to_ascii_uppercase()) {
                return Err(ConfigurationError::invalid_value(
                    format!("modules.{}.prefix", module.id),
                    module.prefix.clone(),
                    "module prefixes must be unique",
                ));
            }
        }

        Ok(())
    }
}
