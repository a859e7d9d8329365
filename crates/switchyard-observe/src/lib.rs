//! Observability setup for Switchyard: tracing subscriber initialisation with
//! pretty or JSON output and optional OpenTelemetry export.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
