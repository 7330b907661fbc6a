//! Event log repository (append-only)

use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::AppResult,
    models::event_log::{EventKind, EventLogEntry},
};

#[derive(Clone)]
pub struct EventsRepository {
    pool: Pool<Postgres>,
}

impl EventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an entry through the given executor.
    ///
    /// Pass a transaction to make the entry commit or roll back with it, or
    /// the pool to persist it on its own.
    pub async fn record<'e, E>(
        &self,
        executor: E,
        kind: &EventKind,
        details: Option<serde_json::Value>,
    ) -> AppResult<EventLogEntry>
    where
        E: PgExecutor<'e>,
    {
        let entry = sqlx::query_as::<_, EventLogEntry>(
            "INSERT INTO event_log (event, details) VALUES ($1, $2) RETURNING *",
        )
        .bind(kind)
        .bind(details)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    /// Append an entry in its own implicit transaction
    pub async fn record_detached(
        &self,
        kind: &EventKind,
        details: Option<serde_json::Value>,
    ) -> AppResult<EventLogEntry> {
        self.record(&self.pool, kind, details).await
    }

    /// Page entries most recent first
    pub async fn list(
        &self,
        kind: Option<&EventKind>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<EventLogEntry>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_log WHERE ($1::TEXT IS NULL OR event = $1)",
        )
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, EventLogEntry>(
            r#"
            SELECT * FROM event_log
            WHERE ($1::TEXT IS NULL OR event = $1)
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
