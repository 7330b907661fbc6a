//! Event log service

use sqlx::PgExecutor;

use crate::{
    config::EventsConfig,
    error::{AppError, AppResult},
    models::event_log::{EventKind, EventLogEntry, EventQuery},
    repository::Repository,
};

/// One page of the audit trail
#[derive(Debug)]
pub struct EventPage {
    pub entries: Vec<EventLogEntry>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
    config: EventsConfig,
}

impl EventsService {
    pub fn new(repository: Repository, config: EventsConfig) -> Self {
        Self { repository, config }
    }

    /// Append an entry on the pool, outside any caller transaction.
    ///
    /// Used for outcomes whose transaction is rolled back.
    pub async fn log_event(&self, kind: EventKind, details: Option<serde_json::Value>) -> AppResult<EventLogEntry> {
        self.log_event_with(&self.repository.pool, kind, details).await
    }

    /// Append an entry through `executor`. Given a transaction, the entry is
    /// durable once that transaction commits and vanishes if it rolls back.
    pub async fn log_event_with<'e, E>(
        &self,
        executor: E,
        kind: EventKind,
        details: Option<serde_json::Value>,
    ) -> AppResult<EventLogEntry>
    where
        E: PgExecutor<'e>,
    {
        let entry = self.repository.events.record(executor, &kind, details).await?;
        tracing::debug!(id = entry.id, event = %entry.event, "event recorded");
        Ok(entry)
    }

    /// Page the audit trail most recent first
    pub async fn list(&self, query: &EventQuery) -> AppResult<EventPage> {
        let kind = query
            .event
            .as_deref()
            .map(str::parse::<EventKind>)
            .transpose()
            .map_err(AppError::Validation)?;
        let page = query.page.unwrap_or(1).max(1);
        let per_page = self.config.page_size(query.per_page);
        let offset = page_offset(page, per_page);

        let (entries, total) = self.repository.events.list(kind.as_ref(), per_page, offset).await?;

        Ok(EventPage {
            entries,
            total,
            page,
            per_page,
        })
    }
}

/// Row offset of a 1-based page, saturating instead of overflowing
fn page_offset(page: i64, per_page: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 50), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(0, 20), 0);
    }

    #[test]
    fn test_page_offset_saturates_on_huge_page() {
        assert_eq!(page_offset(i64::MAX, 50), i64::MAX);
        assert_eq!(page_offset(i64::MAX, 1), i64::MAX - 1);
    }
}
