//! LLM provider abstractions for Shurahub.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ModelGateway`: one stage's model call with streaming and fallback phases

pub mod box_provider;
pub mod gateway;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;
