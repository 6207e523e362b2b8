use crate::config::TicketingConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Connect using `DATABASE_URL`, falling back to the configured URL
    pub async fn new(config: &TicketingConfig) -> Result<Self, sqlx::Error> {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| config.database_url());
        Self::connect(&database_url, config).await
    }

    /// Connect to exactly the configured database
    pub async fn from_config(config: &TicketingConfig) -> Result<Self, sqlx::Error> {
        Self::connect(&config.database_url(), config).await
    }

    async fn connect(database_url: &str, config: &TicketingConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.pool)
            .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
            .connect(database_url)
            .await?;

        tracing::debug!(
            max_connections = config.database.pool,
            environment = %config.environment,
            "Database pool established"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
