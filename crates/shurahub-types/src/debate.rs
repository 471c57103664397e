//! Debate domain types.
//!
//! A [`Debate`] is one three-stage exchange triggered by a single user
//! message. Its stages are held in a fixed-size array so the stage count and
//! order cannot drift, and its fields are only readable once assembled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One of the three fixed roles in a debate, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageRole {
    Opener,
    Critiquer,
    Synthesizer,
}

impl StageRole {
    /// All roles in the order they run.
    pub const ORDER: [StageRole; 3] = [StageRole::Opener, StageRole::Critiquer, StageRole::Synthesizer];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageRole::Opener => "opener",
            StageRole::Critiquer => "critiquer",
            StageRole::Synthesizer => "synthesizer",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opener" => Ok(StageRole::Opener),
            "critiquer" => Ok(StageRole::Critiquer),
            "synthesizer" => Ok(StageRole::Synthesizer),
            other => Err(format!("invalid stage role: '{other}'")),
        }
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub role: StageRole,
    /// Model identifier drawn from the pool for this stage.
    pub requested_model: String,
    /// Model identifier the provider reported (or the placeholder on total failure).
    pub actual_model: String,
    /// Never empty: a total provider failure substitutes the sentinel text.
    pub response_text: String,
}

/// Lifecycle of a single debate run.
///
/// `Aborted` is only reachable when the client transport closes mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    Init,
    Opening,
    Critiquing,
    Synthesizing,
    RecordReady,
    Logging,
    Done,
    Aborted,
}

impl DebatePhase {
    /// Phase entered when a stage starts.
    pub fn for_stage(role: StageRole) -> Self {
        match role {
            StageRole::Opener => DebatePhase::Opening,
            StageRole::Critiquer => DebatePhase::Critiquing,
            StageRole::Synthesizer => DebatePhase::Synthesizing,
        }
    }
}

impl fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebatePhase::Init => "init",
            DebatePhase::Opening => "opening",
            DebatePhase::Critiquing => "critiquing",
            DebatePhase::Synthesizing => "synthesizing",
            DebatePhase::RecordReady => "record_ready",
            DebatePhase::Logging => "logging",
            DebatePhase::Done => "done",
            DebatePhase::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// A completed debate. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debate {
    id: Uuid,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
    user_prompt: String,
    stages: [StageResult; 3],
}

impl Debate {
    /// Assemble a debate with a fresh v4 identifier and the current time.
    pub fn assemble(
        user_id: Option<String>,
        user_prompt: String,
        opener: StageResult,
        critiquer: StageResult,
        synthesizer: StageResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            user_prompt,
            stages: [opener, critiquer, synthesizer],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    /// Stages in pipeline order: opener, critiquer, synthesizer.
    pub fn stages(&self) -> &[StageResult; 3] {
        &self.stages
    }

    pub fn stage(&self, role: StageRole) -> &StageResult {
        match role {
            StageRole::Opener => &self.stages[0],
            StageRole::Critiquer => &self.stages[1],
            StageRole::Synthesizer => &self.stages[2],
        }
    }

    /// Flatten into the shape handed to persistence.
    pub fn to_record(&self) -> DebateRecord {
        let entry = |role| {
            let stage = self.stage(role);
            StageEntry {
                model: stage.actual_model.clone(),
                response: stage.response_text.clone(),
            }
        };
        DebateRecord {
            debate_id: self.id.to_string(),
            user_id: self.user_id.clone(),
            timestamp: self.created_at,
            user_prompt: self.user_prompt.clone(),
            opener: entry(StageRole::Opener),
            critiquer: entry(StageRole::Critiquer),
            synthesizer: entry(StageRole::Synthesizer),
            opener_rating: None,
            final_rating: None,
        }
    }
}

/// Model and response recorded for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    pub model: String,
    pub response: String,
}

/// Persisted debate row, also returned by the history API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateRecord {
    pub debate_id: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_prompt: String,
    pub opener: StageEntry,
    pub critiquer: StageEntry,
    pub synthesizer: StageEntry,
    #[serde(default)]
    pub opener_rating: Option<i64>,
    #[serde(default)]
    pub final_rating: Option<i64>,
}

/// Which rating column a review targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rater {
    Opener,
    Final,
}

impl Rater {
    pub fn column(&self) -> &'static str {
        match self {
            Rater::Opener => "opener_rating",
            Rater::Final => "final_rating",
        }
    }
}
