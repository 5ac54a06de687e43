//! # tollgate-observability
//!
//! Structured tracing (subscriber setup, span macros, log events) and
//! counters over access decisions.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{DecisionMetrics, DecisionMetricsSnapshot};
