//! In-process stores backed by `DashMap`, for embedding the engine without
//! SQLite and for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use dashmap::DashMap;

use tollgate_core::constants::{MAX_USAGE_COUNT, TIMESTAMP_SUBSEC_DIGITS};
use tollgate_core::errors::TollgateResult;
use tollgate_core::models::{BillingPeriod, SubscriptionRecord, UsageRecord};
use tollgate_core::traits::{ISubscriptionRepository, IUsageStorage};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UsageKey {
    subscription_id: String,
    feature_slug: String,
    period_start: DateTime<Utc>,
}

impl UsageKey {
    fn new(subscription_id: &str, feature_slug: &str, period_start: DateTime<Utc>) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            feature_slug: feature_slug.to_string(),
            period_start,
        }
    }
}

/// Usage counters in a sharded concurrent map. Creation and increments run
/// under the key's shard lock, so they are upsert-once and lossless.
#[derive(Clone, Default)]
pub struct InMemoryUsageStore {
    records: Arc<DashMap<UsageKey, UsageRecord>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all owners and periods.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IUsageStorage for InMemoryUsageStore {
    fn get_or_create_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period: &BillingPeriod,
        now: DateTime<Utc>,
    ) -> TollgateResult<UsageRecord> {
        let key = UsageKey::new(subscription_id, feature_slug, period.start);
        let entry = self.records.entry(key).or_insert_with(|| {
            tracing::debug!(
                subscription_id,
                feature_slug,
                period_start = %period.start,
                "opened usage period"
            );
            UsageRecord::new(subscription_id, feature_slug, period, now)
        });
        Ok(entry.value().clone())
    }

    fn increment_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period: &BillingPeriod,
        delta: u64,
        now: DateTime<Utc>,
    ) -> TollgateResult<UsageRecord> {
        let key = UsageKey::new(subscription_id, feature_slug, period.start);
        let mut entry = self
            .records
            .entry(key)
            .or_insert_with(|| UsageRecord::new(subscription_id, feature_slug, period, now));
        let record = entry.value_mut();
        record.count = record.count.saturating_add(delta).min(MAX_USAGE_COUNT);
        record.updated_at = now.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS);
        Ok(record.clone())
    }

    fn find_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period_start: DateTime<Utc>,
    ) -> TollgateResult<Option<UsageRecord>> {
        let key = UsageKey::new(subscription_id, feature_slug, period_start);
        Ok(self.records.get(&key).map(|r| r.value().clone()))
    }

    fn usage_history(
        &self,
        subscription_id: &str,
        feature_slug: &str,
    ) -> TollgateResult<Vec<UsageRecord>> {
        let mut history: Vec<UsageRecord> = self
            .records
            .iter()
            .filter(|r| r.subscription_id == subscription_id && r.feature_slug == feature_slug)
            .map(|r| r.value().clone())
            .collect();
        history.sort_by(|a, b| b.period_start.cmp(&a.period_start));
        Ok(history)
    }

    fn prune_usage_before(&self, cutoff: DateTime<Utc>) -> TollgateResult<usize> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = record.period_end >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

/// Subscription snapshots keyed by account id.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: DashMap<String, SubscriptionRecord>,
    lookups: AtomicU64,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the account's subscription.
    pub fn put(&self, record: SubscriptionRecord) -> TollgateResult<()> {
        record.validate()?;
        self.subscriptions.insert(record.account_id.clone(), record);
        Ok(())
    }

    pub fn remove(&self, account_id: &str) -> Option<SubscriptionRecord> {
        self.subscriptions.remove(account_id).map(|(_, v)| v)
    }

    /// How many times `current_subscription` has been called.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl ISubscriptionRepository for InMemorySubscriptionStore {
    fn current_subscription(&self, account_id: &str) -> TollgateResult<Option<SubscriptionRecord>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.subscriptions.get(account_id).map(|r| r.value().clone()))
    }
}
