//! Observability setup for semdex: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
