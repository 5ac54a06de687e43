//! UsageStore: per-owner, per-feature counters scoped to the current billing
//! period, with lazy reset.
//!
//! No background job resets counters. The first read or write after a period
//! lapses computes the covering period from the anchor and upserts a fresh
//! zero-count record for it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tollgate_core::errors::TollgateResult;
use tollgate_core::models::{BillingPeriod, UsageRecord};
use tollgate_core::traits::IUsageStorage;

use crate::clock::BillingPeriodClock;

/// Metering front end over any [`IUsageStorage`].
#[derive(Clone)]
pub struct UsageStore {
    storage: Arc<dyn IUsageStorage>,
}

impl UsageStore {
    pub fn new(storage: Arc<dyn IUsageStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn IUsageStorage> {
        &self.storage
    }

    /// The current-period record for `(owner, feature)`, created with a zero
    /// count if this is the first access in the period.
    ///
    /// `anchor` is the subscription's current period (or the calendar month
    /// for accounts without one); the period actually used is the one in its
    /// sequence that covers `now`.
    pub fn get_usage(
        &self,
        owner: &str,
        feature_slug: &str,
        anchor: &BillingPeriod,
        now: DateTime<Utc>,
    ) -> TollgateResult<UsageRecord> {
        let period = BillingPeriodClock::period_containing(anchor, now)?;
        self.storage
            .get_or_create_usage(owner, feature_slug, &period, now)
    }

    /// Atomically add `delta` to the current period's count. Never fails on
    /// quota; the caller decides what an over-quota count means.
    pub fn increment(
        &self,
        owner: &str,
        feature_slug: &str,
        anchor: &BillingPeriod,
        now: DateTime<Utc>,
        delta: u64,
    ) -> TollgateResult<UsageRecord> {
        let period = BillingPeriodClock::period_containing(anchor, now)?;
        self.storage
            .increment_usage(owner, feature_slug, &period, delta, now)
    }

    /// Every stored period for `(owner, feature)`, newest first.
    pub fn history(&self, owner: &str, feature_slug: &str) -> TollgateResult<Vec<UsageRecord>> {
        self.storage.usage_history(owner, feature_slug)
    }
}
