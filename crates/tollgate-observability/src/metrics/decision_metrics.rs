//! Per-reason decision counts, configuration errors, and recorded usage.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use tollgate_core::models::{AccessDecision, AccessReason, TierDecision};

/// Lock-free counters shared across request threads.
#[derive(Debug, Default)]
pub struct DecisionMetrics {
    granted: AtomicU64,
    not_in_catalog: AtomicU64,
    quota_exceeded: AtomicU64,
    inactive_subscription: AtomicU64,
    unavailable: AtomicU64,
    configuration_errors: AtomicU64,
    usage_recorded: AtomicU64,
}

/// Point-in-time copy of [`DecisionMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionMetricsSnapshot {
    pub granted: u64,
    pub not_in_catalog: u64,
    pub quota_exceeded: u64,
    pub inactive_subscription: u64,
    pub unavailable: u64,
    pub configuration_errors: u64,
    /// Sum of deltas actually added to usage counters.
    pub usage_recorded: u64,
}

impl DecisionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, decision: &AccessDecision) {
        self.record_reason(decision.reason);
    }

    pub fn record_tier(&self, decision: &TierDecision) {
        self.record_reason(decision.reason);
    }

    fn record_reason(&self, reason: AccessReason) {
        let counter = match reason {
            AccessReason::Granted => &self.granted,
            AccessReason::NotInCatalog => &self.not_in_catalog,
            AccessReason::QuotaExceeded => &self.quota_exceeded,
            AccessReason::InactiveSubscription => &self.inactive_subscription,
            AccessReason::Unavailable => &self.unavailable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_configuration_error(&self) {
        self.configuration_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_usage(&self, delta: u64) {
        self.usage_recorded.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DecisionMetricsSnapshot {
        DecisionMetricsSnapshot {
            granted: self.granted.load(Ordering::Relaxed),
            not_in_catalog: self.not_in_catalog.load(Ordering::Relaxed),
            quota_exceeded: self.quota_exceeded.load(Ordering::Relaxed),
            inactive_subscription: self.inactive_subscription.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            configuration_errors: self.configuration_errors.load(Ordering::Relaxed),
            usage_recorded: self.usage_recorded.load(Ordering::Relaxed),
        }
    }
}

impl DecisionMetricsSnapshot {
    /// Decisions counted, excluding configuration errors.
    pub fn total_decisions(&self) -> u64 {
        self.granted
            + self.not_in_catalog
            + self.quota_exceeded
            + self.inactive_subscription
            + self.unavailable
    }

    /// Share of decisions that denied access.
    pub fn denial_rate(&self) -> f64 {
        let total = self.total_decisions();
        if total == 0 {
            return 0.0;
        }
        (total - self.granted) as f64 / total as f64
    }
}
