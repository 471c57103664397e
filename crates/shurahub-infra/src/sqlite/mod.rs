//! SQLite storage layer.
//!
//! Debate log and engagement persistence backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod debate;
pub mod engagement;
pub mod pool;
