//! Infrastructure layer for Shurahub.
//!
//! Implementations of the traits defined in `shurahub-core`: the
//! OpenAI-compatible LLM provider, the SQLite debate log, and HS256 session
//! verification. Also owns configuration loading.

pub mod auth;
pub mod config;
pub mod llm;
pub mod sqlite;
