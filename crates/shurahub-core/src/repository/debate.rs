//! DebateRepository trait definition.

use shurahub_types::debate::{DebateRecord, Rater};
use shurahub_types::error::RepositoryError;

/// Repository trait for debate log persistence.
///
/// Implementations live in shurahub-infra (e.g., `SqliteDebateRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait DebateRepository: Send + Sync {
    /// Insert a completed debate. Each call is independent; no ordering is
    /// implied between calls.
    fn save_debate(
        &self,
        record: &DebateRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch one debate by its identifier.
    fn get_debate(
        &self,
        debate_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<DebateRecord>, RepositoryError>> + Send;

    /// List debates newest first, optionally restricted to one user.
    fn list_debates(
        &self,
        user_id: Option<&str>,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<DebateRecord>, RepositoryError>> + Send;

    /// Set the opener or final rating of a debate.
    ///
    /// Returns `RepositoryError::NotFound` when no debate has that id.
    fn update_rating(
        &self,
        debate_id: &str,
        rater: Rater,
        rating: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
