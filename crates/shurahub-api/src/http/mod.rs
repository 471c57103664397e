//! HTTP layer: the debate websocket at `/ws`, the debate history and rating
//! endpoints under `/api`, and `/health`.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
