//! Business logic and repository trait definitions for Shurahub.
//!
//! This crate defines the "ports" (repository, identity and provider traits)
//! that the infrastructure layer implements, plus the debate pipeline that
//! drives them. It depends only on `shurahub-types` -- never on
//! `shurahub-infra` or any database/IO crate.

pub mod debate;
pub mod identity;
pub mod llm;
pub mod repository;
