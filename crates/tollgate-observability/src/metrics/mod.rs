//! Counters over resolver outcomes.

pub mod decision_metrics;

pub use decision_metrics::{DecisionMetrics, DecisionMetricsSnapshot};
