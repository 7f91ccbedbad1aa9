//! Observability setup for Orchestra: structured logging through `tracing`
//! and optional OpenTelemetry span export.

pub mod tracing_setup;
