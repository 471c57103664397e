//! PersistenceSink -- best-effort, off-path logging of finished debates.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use shurahub_types::debate::Debate;

use crate::repository::debate::DebateRepository;

/// Hands finished debates to a [`DebateRepository`] on a background task.
///
/// Failures are logged and dropped. Nothing is reported back to the session.
pub struct PersistenceSink<R> {
    repo: Arc<R>,
    writes: TaskTracker,
}

impl<R: DebateRepository + 'static> PersistenceSink<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            writes: TaskTracker::new(),
        }
    }

    /// Store `debate` without waiting for the write.
    ///
    /// Returns `false` for debates with no identity, which are not logged.
    pub fn store(&self, debate: &Debate) -> bool {
        if debate.user_id().is_none() {
            debug!(debate_id = %debate.id(), "anonymous debate, skipping log");
            return false;
        }

        let record = debate.to_record();
        let debate_id = record.debate_id.clone();
        let repo = Arc::clone(&self.repo);
        let write = tokio::spawn(async move { repo.save_debate(&record).await });

        self.writes.spawn(async move {
            match write.await {
                Ok(Ok(())) => debug!(%debate_id, "debate logged"),
                Ok(Err(e)) => warn!(%debate_id, error = %e, "failed to log debate"),
                Err(e) => warn!(%debate_id, error = %e, "debate log task aborted"),
            }
        });
        true
    }

    /// Wait for every write started so far.
    ///
    /// Only short-lived callers need this; a server never waits on its logs.
    pub async fn flush(&self) {
        self.writes.close();
        self.writes.wait().await;
        self.writes.reopen();
    }

    /// Writes still in flight.
    pub fn pending(&self) -> usize {
        self.writes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::testing::{MemoryDebateRepository, sample_debate};

    #[tokio::test]
    async fn stores_debates_with_an_identity() {
        let repo = Arc::new(MemoryDebateRepository::default());
        let sink = PersistenceSink::new(Arc::clone(&repo));
        let debate = sample_debate(Some("visitor-9"));

        assert!(sink.store(&debate));
        sink.flush().await;

        let saved = repo.records();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].debate_id, debate.id().to_string());
        assert_eq!(saved[0].user_id.as_deref(), Some("visitor-9"));
    }

    #[tokio::test]
    async fn anonymous_debates_are_not_logged() {
        let repo = Arc::new(MemoryDebateRepository::default());
        let sink = PersistenceSink::new(Arc::clone(&repo));

        assert!(!sink.store(&sample_debate(None)));
        sink.flush().await;
        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn write_failures_are_swallowed() {
        let repo = Arc::new(MemoryDebateRepository::failing());
        let sink = PersistenceSink::new(Arc::clone(&repo));

        assert!(sink.store(&sample_debate(Some("u-1"))));
        sink.flush().await;

        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn panicking_write_does_not_poison_the_sink() {
        let repo = Arc::new(MemoryDebateRepository::panicking());
        let sink = PersistenceSink::new(Arc::clone(&repo));

        assert!(sink.store(&sample_debate(Some("u-1"))));
        sink.flush().await;
        assert_eq!(sink.pending(), 0);

        // Still usable after a flush.
        assert!(sink.store(&sample_debate(Some("u-2"))));
        sink.flush().await;
        assert_eq!(sink.pending(), 0);
        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn concurrent_stores_all_land() {
        let repo = Arc::new(MemoryDebateRepository::default());
        let sink = Arc::new(PersistenceSink::new(Arc::clone(&repo)));

        let mut sessions = tokio::task::JoinSet::new();
        for i in 0..8 {
            let sink = Arc::clone(&sink);
            sessions.spawn(async move { sink.store(&sample_debate(Some(&format!("v-{i}")))) });
        }
        while let Some(stored) = sessions.join_next().await {
            assert!(stored.unwrap());
        }
        sink.flush().await;

        assert_eq!(repo.records().len(), 8);
    }
}
