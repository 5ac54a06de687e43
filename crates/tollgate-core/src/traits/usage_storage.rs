use chrono::{DateTime, Utc};

use crate::errors::TollgateResult;
use crate::models::{BillingPeriod, UsageRecord};

/// Persisted per-owner, per-feature, per-period usage counters.
///
/// Implementations must make both writes safe under concurrent callers:
/// creation is upsert-once on `(subscription_id, feature_slug, period.start)`,
/// and increments on the same key must never be lost.
///
/// Counts saturate at `MAX_USAGE_COUNT` rather than failing. Timestamps are
/// kept at microsecond precision; `BillingPeriod` boundaries already are.
pub trait IUsageStorage: Send + Sync {
    /// Return the record for the period, creating a zero-count one if absent.
    fn get_or_create_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period: &BillingPeriod,
        now: DateTime<Utc>,
    ) -> TollgateResult<UsageRecord>;

    /// Atomically add `delta` to the period's count (creating the record if
    /// needed) and return the updated record.
    fn increment_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period: &BillingPeriod,
        delta: u64,
        now: DateTime<Utc>,
    ) -> TollgateResult<UsageRecord>;

    /// Record for an exact period, without creating it.
    fn find_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period_start: DateTime<Utc>,
    ) -> TollgateResult<Option<UsageRecord>>;

    /// Every stored period for the key, newest first.
    fn usage_history(
        &self,
        subscription_id: &str,
        feature_slug: &str,
    ) -> TollgateResult<Vec<UsageRecord>>;

    /// Delete records whose period ended before `cutoff`. Returns the number removed.
    fn prune_usage_before(&self, cutoff: DateTime<Utc>) -> TollgateResult<usize>;
}
