//! Observability setup for UFDR: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
