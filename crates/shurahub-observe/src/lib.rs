//! Observability setup for Shurahub: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
