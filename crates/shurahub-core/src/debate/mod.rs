//! The debate pipeline: model selection, prompts, session memory, the
//! orchestrator itself, and where its output goes.

pub mod context;
pub mod orchestrator;
pub mod persistence;
pub mod prompt;
pub mod selection;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;
