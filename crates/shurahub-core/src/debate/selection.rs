//! Model pool and per-debate model selection.

use std::sync::Arc;

use rand::Rng;
use rand::seq::index;

use shurahub_types::error::ConfigError;

/// Number of stages, and therefore models, per debate.
pub const STAGE_COUNT: usize = 3;

/// Immutable, non-empty, ordered list of model identifiers.
///
/// Cheap to clone; every session shares the same backing slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPool {
    models: Arc<[String]>,
}

impl ModelPool {
    pub fn new(models: Vec<String>) -> Result<Self, ConfigError> {
        let models: Vec<String> = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if models.is_empty() {
            return Err(ConfigError::EmptyModelPool);
        }
        Ok(Self {
            models: models.into(),
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Pick the opener, critiquer and synthesizer models.
    ///
    /// With at least three models, three distinct ones are sampled uniformly
    /// without replacement. Smaller pools are repeated cyclically in their
    /// configured order, so `[a, b]` always yields `[a, b, a]`.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> [String; STAGE_COUNT] {
        let pool = &self.models;
        if pool.len() >= STAGE_COUNT {
            let picked = index::sample(rng, pool.len(), STAGE_COUNT).into_vec();
            std::array::from_fn(|i| pool[picked[i]].clone())
        } else {
            std::array::from_fn(|i| pool[i % pool.len()].clone())
        }
    }
}
