//! In-memory collaborators for debate tests.

use std::sync::Mutex;

use tokio::sync::Notify;

use shurahub_types::debate::{Debate, DebateRecord, Rater, StageResult, StageRole};
use shurahub_types::error::{RepositoryError, SinkError};
use shurahub_types::event::DebateEvent;

use super::sink::EventSink;
use crate::repository::debate::DebateRepository;

#[derive(Default)]
pub(crate) struct MemoryDebateRepository {
    records: Mutex<Vec<DebateRecord>>,
    fail: bool,
    panic: bool,
    pub saved: Notify,
}

impl MemoryDebateRepository {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<DebateRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl DebateRepository for MemoryDebateRepository {
    async fn save_debate(&self, record: &DebateRecord) -> Result<(), RepositoryError> {
        if self.panic {
            panic!("repository panicked");
        }
        if self.fail {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        self.saved.notify_one();
        Ok(())
    }

    async fn get_debate(&self, debate_id: &str) -> Result<Option<DebateRecord>, RepositoryError> {
        Ok(self
            .records()
            .into_iter()
            .find(|r| r.debate_id == debate_id))
    }

    async fn list_debates(
        &self,
        user_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<DebateRecord>, RepositoryError> {
        Ok(self
            .records()
            .into_iter()
            .rev()
            .filter(|r| user_id.is_none() || r.user_id.as_deref() == user_id)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_rating(
        &self,
        debate_id: &str,
        rater: Rater,
        rating: i64,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.debate_id == debate_id)
            .ok_or(RepositoryError::NotFound)?;
        match rater {
            Rater::Opener => record.opener_rating = Some(rating),
            Rater::Final => record.final_rating = Some(rating),
        }
        Ok(())
    }
}

/// Collects frames; optionally reports the transport closed after `close_after` frames.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub events: Vec<DebateEvent>,
    pub close_after: Option<usize>,
    pub attempts_after_close: usize,
}

impl EventSink for RecordingSink {
    async fn emit(&mut self, event: DebateEvent) -> Result<(), SinkError> {
        if let Some(limit) = self.close_after {
            if self.events.len() >= limit {
                self.attempts_after_close += 1;
                return Err(SinkError::Closed);
            }
        }
        self.events.push(event);
        Ok(())
    }
}

pub(crate) fn sample_debate(user_id: Option<&str>) -> Debate {
    let stage = |role: StageRole| StageResult {
        role,
        requested_model: "m-req".to_string(),
        actual_model: "m-act".to_string(),
        response_text: format!("{role} text"),
    };
    Debate::assemble(
        user_id.map(str::to_string),
        "Is a 4-day work week good?".to_string(),
        stage(StageRole::Opener),
        stage(StageRole::Critiquer),
        stage(StageRole::Synthesizer),
    )
}
