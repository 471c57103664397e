//! Shared domain types for Shurahub.
//!
//! This crate contains the core domain types used across the Shurahub debate
//! service: debates and their stages, session identity, wire frames, LLM
//! request/response shapes, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod debate;
pub mod engagement;
pub mod error;
pub mod event;
pub mod llm;
pub mod session;
