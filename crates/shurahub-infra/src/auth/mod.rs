//! Session-token verification.

pub mod jwt;
