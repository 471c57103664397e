//! HTTP request handlers.

pub mod debates;
pub mod engagement;
pub mod health;
pub mod ws;
