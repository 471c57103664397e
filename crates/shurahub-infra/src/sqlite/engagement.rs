//! SQLite engagement repository: feedback and analytics events.

use shurahub_core::repository::engagement::EngagementRepository;
use shurahub_types::engagement::{AnalyticsEvent, Feedback};
use shurahub_types::error::RepositoryError;

use super::debate::format_datetime;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `EngagementRepository`. Insert-only.
pub struct SqliteEngagementRepository {
    pool: DatabasePool,
}

impl SqliteEngagementRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl EngagementRepository for SqliteEngagementRepository {
    async fn save_feedback(&self, feedback: &Feedback) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO feedback (email, message, category, user_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&feedback.email)
        .bind(&feedback.message)
        .bind(&feedback.category)
        .bind(&feedback.user_id)
        .bind(format_datetime(&feedback.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn record_event(&self, event: &AnalyticsEvent) -> Result<(), RepositoryError> {
        let data = serde_json::to_string(&event.event_data)
            .map_err(|e| RepositoryError::Query(format!("invalid event data: {e}")))?;

        sqlx::query(
            "INSERT INTO analytics_events (event_name, event_data, user_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&event.event_name)
        .bind(data)
        .bind(&event.user_id)
        .bind(format_datetime(&event.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }
}
