//! Observability setup for cadet.

pub mod tracing_setup;
