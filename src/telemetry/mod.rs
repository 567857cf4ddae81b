//! Telemetry
//!
//! Request/response log sinks. Ambient diagnostics go through `tracing`.

pub mod logging;

pub use logging::{format_exchange, InMemoryLogSink, LogSink, TracingLogSink, WriterLogSink};
