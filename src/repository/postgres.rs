//! PostgreSQL-backed repository.
//!
//! A ticket aggregate spans `tickets`, `ticket_steps` and `audit_logs`; `save`
//! writes all three inside one transaction. The ticket row update is guarded
//! by `version`, so a stale aggregate rolls the whole transaction back.

use super::{RepositoryError, RepositoryResult, SequenceAllocator, TicketRepository};
use crate::models::{AuditEntry, Ticket, TicketStep};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

const TICKET_NUMBER_CONSTRAINT: &str = "tickets_module_number_key";

#[derive(Debug, FromRow)]
struct TicketRow {
    id: Uuid,
    ticket_number: String,
    module_id: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    category: String,
    department: String,
    created_by: Uuid,
    assigned_to: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
    attachments: Json<Vec<crate::models::FileRef>>,
    version: i64,
}

#[derive(Debug, FromRow)]
struct StepRow {
    ticket_id: Uuid,
    data: Json<TicketStep>,
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    ticket_id: Uuid,
    performed_by: Uuid,
    action: String,
    old_data: Option<String>,
    new_data: Option<String>,
    description: Option<String>,
    performed_at: DateTime<Utc>,
}

fn parse_field<T: FromStr<Err = String>>(field: &str, value: &str) -> RepositoryResult<T> {
    value
        .parse()
        .map_err(|reason| RepositoryError::InvalidData {
            field: field.to_string(),
            reason,
        })
}

impl AuditRow {
    fn into_entry(self) -> RepositoryResult<AuditEntry> {
        Ok(AuditEntry {
            id: self.id,
            ticket_id: self.ticket_id,
            actor_id: self.performed_by,
            action: parse_field("audit_logs.action", &self.action)?,
            old_value: self.old_data,
            new_value: self.new_data,
            remarks: self.description,
            timestamp: self.performed_at,
        })
    }
}

impl TicketRow {
    fn into_ticket(
        self,
        steps: Vec<TicketStep>,
        audit_trail: Vec<AuditEntry>,
    ) -> RepositoryResult<Ticket> {
        Ok(Ticket {
            id: self.id,
            ticket_number: self.ticket_number,
            module_id: self.module_id,
            title: self.title,
            description: self.description,
            status: parse_field("tickets.status", &self.status)?,
            priority: parse_field("tickets.priority", &self.priority)?,
            category: self.category,
            department: self.department,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            created_at: self.created_at,
            updated_at: self.updated_at,
            due_date: self.due_date,
            steps,
            attachments: self.attachments.0,
            audit_trail,
            version: u64::try_from(self.version).map_err(|err| RepositoryError::InvalidData {
                field: "tickets.version".to_string(),
                reason: err.to_string(),
            })?,
        })
    }
}

fn is_ticket_number_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(TICKET_NUMBER_CONSTRAINT)
        }
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load(&self, rows: Vec<TicketRow>) -> RepositoryResult<Vec<Ticket>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let step_rows = sqlx::query_as::<_, StepRow>(
            "SELECT ticket_id, data FROM ticket_steps WHERE ticket_id = ANY($1) ORDER BY ticket_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let audit_rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, ticket_id, performed_by, action, old_data, new_data, description, performed_at
            FROM audit_logs
            WHERE ticket_id = ANY($1)
            ORDER BY seq
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut steps: HashMap<Uuid, Vec<TicketStep>> = HashMap::new();
        for row in step_rows {
            steps.entry(row.ticket_id).or_default().push(row.data.0);
        }
        let mut trails: HashMap<Uuid, Vec<AuditEntry>> = HashMap::new();
        for row in audit_rows {
            trails
                .entry(row.ticket_id)
                .or_default()
                .push(row.into_entry()?);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                row.into_ticket(
                    steps.remove(&id).unwrap_or_default(),
                    trails.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Insert a new ticket row or update the stored one at `ticket.version`; returns the new version
    async fn write_ticket_row(
        tx: &mut Transaction<'_, Postgres>,
        ticket: &Ticket,
    ) -> RepositoryResult<u64> {
        let conflict = || RepositoryError::VersionConflict {
            id: ticket.id,
            expected: ticket.version,
        };
        let next = ticket.version + 1;
        let (expected, next_db) = match (i64::try_from(ticket.version), i64::try_from(next)) {
            (Ok(expected), Ok(next_db)) => (expected, next_db),
            _ => return Err(conflict()),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO tickets (
                id, ticket_number, module_id, title, description, status, priority,
                category, department, created_by, assigned_to, created_at, updated_at,
                due_date, attachments, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                ticket_number = EXCLUDED.ticket_number,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                priority = EXCLUDED.priority,
                category = EXCLUDED.category,
                department = EXCLUDED.department,
                assigned_to = EXCLUDED.assigned_to,
                updated_at = EXCLUDED.updated_at,
                due_date = EXCLUDED.due_date,
                attachments = EXCLUDED.attachments,
                version = EXCLUDED.version
            WHERE tickets.version = $17
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.ticket_number)
        .bind(&ticket.module_id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .bind(ticket.priority.as_str())
        .bind(&ticket.category)
        .bind(&ticket.department)
        .bind(ticket.created_by)
        .bind(ticket.assigned_to)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .bind(ticket.due_date)
        .bind(Json(&ticket.attachments))
        .bind(next_db)
        .bind(expected)
        .fetch_optional(&mut **tx)
        .await;

        match result {
            Ok(Some(row)) => {
                // A stale copy of a deleted ticket must not be re-inserted
                let inserted: bool = row.try_get("inserted")?;
                if inserted == (ticket.version == 0) {
                    Ok(next)
                } else {
                    Err(conflict())
                }
            }
            Ok(None) => Err(conflict()),
            Err(err) if is_ticket_number_conflict(&err) => {
                Err(RepositoryError::DuplicateTicketNumber {
                    module_id: ticket.module_id.clone(),
                    ticket_number: ticket.ticket_number.clone(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.load(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, ticket: &Ticket) -> RepositoryResult<u64> {
        let mut tx = self.pool.begin().await?;

        let version = Self::write_ticket_row(&mut tx, ticket).await?;

        sqlx::query("DELETE FROM ticket_steps WHERE ticket_id = $1")
            .bind(ticket.id)
            .execute(&mut *tx)
            .await?;
        for (position, step) in ticket.steps.iter().enumerate() {
            sqlx::query(
                "INSERT INTO ticket_steps (id, ticket_id, position, data) VALUES ($1, $2, $3, $4)",
            )
            .bind(step.id)
            .bind(ticket.id)
            .bind(position as i32)
            .bind(Json(step))
            .execute(&mut *tx)
            .await?;
        }

        for entry in &ticket.audit_trail {
            sqlx::query(
                r#"
                INSERT INTO audit_logs (
                    id, ticket_id, performed_by, action, old_data, new_data, description, performed_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(entry.id)
            .bind(ticket.id)
            .bind(entry.actor_id)
            .bind(entry.action.as_str())
            .bind(&entry.old_value)
            .bind(&entry.new_value)
            .bind(&entry.remarks)
            .bind(entry.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(version)
    }

    async fn list(&self, module_id: &str) -> RepositoryResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            "SELECT * FROM tickets WHERE module_id = $1 ORDER BY created_at, ticket_number",
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        self.load(rows).await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Counter rows in `ticket_sequences`, bumped with a single upsert
#[derive(Debug, Clone)]
pub struct PgSequenceAllocator {
    pool: PgPool,
}

impl PgSequenceAllocator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceAllocator for PgSequenceAllocator {
    async fn next_value(&self, module_id: &str) -> RepositoryResult<u64> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ticket_sequences (module_id, last_value)
            VALUES ($1, 1)
            ON CONFLICT (module_id) DO UPDATE
                SET last_value = ticket_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(module_id)
        .fetch_one(&self.pool)
        .await?;

        u64::try_from(value).map_err(|_| RepositoryError::InvalidData {
            field: "ticket_sequences.last_value".to_string(),
            reason: format!("negative counter {value}"),
        })
    }
}
