//! SQLite debate log repository.
//!
//! Implements `DebateRepository` from `shurahub-core`: raw queries, a private
//! row struct, inserts and rating updates on the writer, reads on the reader.

use chrono::{DateTime, SecondsFormat, Utc};
use shurahub_core::repository::debate::DebateRepository;
use shurahub_types::debate::{DebateRecord, Rater, StageEntry};
use shurahub_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `DebateRepository`.
pub struct SqliteDebateRepository {
    pool: DatabasePool,
}

impl SqliteDebateRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct DebateRow {
    debate_id: String,
    user_id: Option<String>,
    timestamp: String,
    user_prompt: String,
    opener_model: String,
    opener_response: String,
    critiquer_model: String,
    critiquer_response: String,
    synthesizer_model: String,
    synthesizer_response: String,
    opener_rating: Option<i64>,
    final_rating: Option<i64>,
}

impl DebateRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            debate_id: row.try_get("debate_id")?,
            user_id: row.try_get("user_id")?,
            timestamp: row.try_get("timestamp")?,
            user_prompt: row.try_get("user_prompt")?,
            opener_model: row.try_get("opener_model")?,
            opener_response: row.try_get("opener_response")?,
            critiquer_model: row.try_get("critiquer_model")?,
            critiquer_response: row.try_get("critiquer_response")?,
            synthesizer_model: row.try_get("synthesizer_model")?,
            synthesizer_response: row.try_get("synthesizer_response")?,
            opener_rating: row.try_get("opener_rating")?,
            final_rating: row.try_get("final_rating")?,
        })
    }

    fn into_record(self) -> Result<DebateRecord, RepositoryError> {
        Ok(DebateRecord {
            timestamp: parse_datetime(&self.timestamp)?,
            debate_id: self.debate_id,
            user_id: self.user_id,
            user_prompt: self.user_prompt,
            opener: StageEntry {
                model: self.opener_model,
                response: self.opener_response,
            },
            critiquer: StageEntry {
                model: self.critiquer_model,
                response: self.critiquer_response,
            },
            synthesizer: StageEntry {
                model: self.synthesizer_model,
                response: self.synthesizer_response,
            },
            opener_rating: self.opener_rating,
            final_rating: self.final_rating,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

// Fixed precision keeps lexical order equal to chronological order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<DebateRecord>, RepositoryError> {
    rows.iter()
        .map(|row| {
            DebateRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_record()
        })
        .collect()
}

impl DebateRepository for SqliteDebateRepository {
    async fn save_debate(&self, record: &DebateRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO debates (debate_id, user_id, timestamp, user_prompt, opener_model, opener_response, critiquer_model, critiquer_response, synthesizer_model, synthesizer_response, opener_rating, final_rating)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.debate_id)
        .bind(&record.user_id)
        .bind(format_datetime(&record.timestamp))
        .bind(&record.user_prompt)
        .bind(&record.opener.model)
        .bind(&record.opener.response)
        .bind(&record.critiquer.model)
        .bind(&record.critiquer.response)
        .bind(&record.synthesizer.model)
        .bind(&record.synthesizer.response)
        .bind(record.opener_rating)
        .bind(record.final_rating)
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("debate '{}' already exists", record.debate_id)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_debate(&self, debate_id: &str) -> Result<Option<DebateRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM debates WHERE debate_id = ?")
            .bind(debate_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let debate_row =
                    DebateRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(debate_row.into_record()?))
            }
            None => Ok(None),
        }
    }

    async fn list_debates(
        &self,
        user_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<DebateRecord>, RepositoryError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(
                    "SELECT * FROM debates WHERE user_id = ? ORDER BY timestamp DESC LIMIT ?",
                )
                .bind(user_id)
                .bind(limit)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM debates ORDER BY timestamp DESC LIMIT ?")
                    .bind(limit)
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(rows)
    }

    async fn update_rating(
        &self,
        debate_id: &str,
        rater: Rater,
        rating: i64,
    ) -> Result<(), RepositoryError> {
        let sql = match rater {
            Rater::Opener => "UPDATE debates SET opener_rating = ? WHERE debate_id = ?",
            Rater::Final => "UPDATE debates SET final_rating = ? WHERE debate_id = ?",
        };

        let result = sqlx::query(sql)
            .bind(rating)
            .bind(debate_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    async fn test_repo() -> (tempfile::TempDir, SqliteDebateRepository) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteDebateRepository::new(pool))
    }

    fn make_record(user_id: Option<&str>, prompt: &str, timestamp: DateTime<Utc>) -> DebateRecord {
        DebateRecord {
            debate_id: Uuid::new_v4().to_string(),
            user_id: user_id.map(str::to_string),
            timestamp,
            user_prompt: prompt.to_string(),
            opener: StageEntry {
                model: "llama-3.3-70b-versatile".to_string(),
                response: "Yes, mostly.".to_string(),
            },
            critiquer: StageEntry {
                model: "qwen/qwen3-32b".to_string(),
                response: "That ignores shift work.".to_string(),
            },
            synthesizer: StageEntry {
                model: "openai/gpt-oss-120b".to_string(),
                response: "It depends on the sector [1][2].".to_string(),
            },
            opener_rating: None,
            final_rating: None,
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let (_dir, repo) = test_repo().await;
        let record = make_record(Some("user-1"), "Is a 4-day week good?", Utc::now());

        repo.save_debate(&record).await.unwrap();
        let fetched = repo.get_debate(&record.debate_id).await.unwrap().unwrap();

        assert_eq!(fetched.debate_id, record.debate_id);
        assert_eq!(fetched.user_id.as_deref(), Some("user-1"));
        assert_eq!(fetched.user_prompt, "Is a 4-day week good?");
        assert_eq!(fetched.opener, record.opener);
        assert_eq!(fetched.critiquer, record.critiquer);
        assert_eq!(fetched.synthesizer, record.synthesizer);
        assert_eq!(
            fetched.timestamp.timestamp_micros(),
            record.timestamp.timestamp_micros()
        );
        assert!(fetched.opener_rating.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (_dir, repo) = test_repo().await;
        assert!(repo.get_debate("no-such-debate").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let (_dir, repo) = test_repo().await;
        let record = make_record(Some("user-1"), "q", Utc::now());
        repo.save_debate(&record).await.unwrap();

        let err = repo.save_debate(&record).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_filtered() {
        let (_dir, repo) = test_repo().await;
        let now = Utc::now();
        let old = make_record(Some("user-1"), "first", now - Duration::minutes(10));
        let new = make_record(Some("user-1"), "second", now);
        let other = make_record(Some("user-2"), "elsewhere", now - Duration::minutes(5));
        for record in [&old, &new, &other] {
            repo.save_debate(record).await.unwrap();
        }

        let mine = repo.list_debates(Some("user-1"), 10).await.unwrap();
        let prompts: Vec<&str> = mine.iter().map(|r| r.user_prompt.as_str()).collect();
        assert_eq!(prompts, vec!["second", "first"]);

        let all = repo.list_debates(None, 2).await.unwrap();
        let prompts: Vec<&str> = all.iter().map(|r| r.user_prompt.as_str()).collect();
        assert_eq!(prompts, vec!["second", "elsewhere"]);
    }

    #[tokio::test]
    async fn test_update_rating_sets_one_column() {
        let (_dir, repo) = test_repo().await;
        let record = make_record(Some("user-1"), "q", Utc::now());
        repo.save_debate(&record).await.unwrap();

        repo.update_rating(&record.debate_id, Rater::Final, 5)
            .await
            .unwrap();

        let fetched = repo.get_debate(&record.debate_id).await.unwrap().unwrap();
        assert_eq!(fetched.final_rating, Some(5));
        assert!(fetched.opener_rating.is_none());
    }

    #[tokio::test]
    async fn test_update_rating_missing_debate() {
        let (_dir, repo) = test_repo().await;
        let err = repo
            .update_rating("missing", Rater::Opener, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
