//! EntitlementEngine: wires the tier, subscription and usage repositories to
//! the resolver.
//!
//! The catalog is loaded once at construction. Subscriptions are fetched per
//! call, optionally through a TTL cache.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use tollgate_core::config::{MeteringConfig, TollgateConfig};
use tollgate_core::errors::TollgateResult;
use tollgate_core::models::{AccessDecision, SubscriptionRecord, Tier, TierDecision, UsageRecord};
use tollgate_core::traits::{ISubscriptionRepository, ITierRepository, IUsageStorage};
use tollgate_observability::tracing_setup::events;
use tollgate_observability::{DecisionMetrics, DecisionMetricsSnapshot};
use tollgate_storage::{StorageEngine, UsageRetention};

use crate::cache::CachedSubscriptionRepository;
use crate::catalog::TierCatalog;
use crate::resolver::EntitlementResolver;
use crate::usage::UsageStore;

pub struct EntitlementEngine {
    resolver: EntitlementResolver,
    subscriptions: Arc<dyn ISubscriptionRepository>,
    cache: Option<Arc<CachedSubscriptionRepository>>,
    retention: UsageRetention,
    metering: MeteringConfig,
}

impl EntitlementEngine {
    /// Compose an engine from explicit repositories.
    pub fn new(
        config: &TollgateConfig,
        tiers: &dyn ITierRepository,
        subscriptions: Arc<dyn ISubscriptionRepository>,
        usage: Arc<dyn IUsageStorage>,
    ) -> TollgateResult<Self> {
        config.validate()?;
        let catalog = Arc::new(TierCatalog::load(tiers, &config.catalog)?);

        let metering = config.metering.clone();
        let (subscriptions, cache) = if metering.subscription_cache_ttl_secs == 0 {
            (subscriptions, None)
        } else {
            let cached = Arc::new(CachedSubscriptionRepository::new(
                subscriptions,
                Duration::from_secs(metering.subscription_cache_ttl_secs),
                metering.subscription_cache_capacity,
            ));
            (
                Arc::clone(&cached) as Arc<dyn ISubscriptionRepository>,
                Some(cached),
            )
        };

        let resolver = EntitlementResolver::new(catalog, UsageStore::new(usage));
        Ok(Self {
            resolver,
            subscriptions,
            cache,
            retention: UsageRetention::new(metering.usage_retention_days),
            metering,
        })
    }

    /// SQLite-backed engine at `config.storage.db_path`. The same database
    /// serves tiers, subscriptions and usage.
    pub fn open(config: &TollgateConfig) -> TollgateResult<Self> {
        let storage = Arc::new(StorageEngine::open_with_readers(
            Path::new(&config.storage.db_path),
            config.storage.read_pool_size,
        )?);
        let usage: Arc<dyn IUsageStorage> = storage.clone();
        Self::new(config, storage.as_ref(), storage.clone(), usage)
    }

    pub fn resolver(&self) -> &EntitlementResolver {
        &self.resolver
    }

    pub fn catalog(&self) -> &TierCatalog {
        self.resolver.catalog()
    }

    pub fn list_tiers(&self) -> &[Tier] {
        self.resolver.catalog().list_tiers()
    }

    /// The account's subscription as seen through the cache.
    pub fn subscription(&self, account_id: &str) -> TollgateResult<Option<SubscriptionRecord>> {
        self.subscriptions.current_subscription(account_id)
    }

    pub fn check_access(
        &self,
        account_id: &str,
        feature_slug: &str,
        now: DateTime<Utc>,
    ) -> TollgateResult<AccessDecision> {
        let subscription = self.subscription(account_id)?;
        self.resolver
            .check_access(account_id, subscription.as_ref(), feature_slug, now)
    }

    pub fn record_usage(
        &self,
        account_id: &str,
        feature_slug: &str,
        now: DateTime<Utc>,
    ) -> TollgateResult<AccessDecision> {
        self.record_usage_by(account_id, feature_slug, now, 1)
    }

    pub fn record_usage_by(
        &self,
        account_id: &str,
        feature_slug: &str,
        now: DateTime<Utc>,
        delta: u64,
    ) -> TollgateResult<AccessDecision> {
        let subscription = self.subscription(account_id)?;
        self.resolver
            .record_usage_by(account_id, subscription.as_ref(), feature_slug, now, delta)
    }

    pub fn check_tier(
        &self,
        account_id: &str,
        required_tier_slug: &str,
    ) -> TollgateResult<TierDecision> {
        let subscription = self.subscription(account_id)?;
        self.resolver
            .check_tier(account_id, subscription.as_ref(), required_tier_slug)
    }

    pub fn usage_summary(
        &self,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> TollgateResult<Vec<AccessDecision>> {
        let subscription = self.subscription(account_id)?;
        self.resolver
            .usage_summary(account_id, subscription.as_ref(), now)
    }

    /// Like [`check_access`](Self::check_access), but storage and subscription
    /// failures become an `Unavailable` denial. Configuration errors still
    /// propagate.
    pub fn check_access_fail_closed(
        &self,
        account_id: &str,
        feature_slug: &str,
        now: DateTime<Utc>,
    ) -> TollgateResult<AccessDecision> {
        match self.check_access(account_id, feature_slug, now) {
            Ok(decision) => Ok(decision),
            Err(err) if err.is_configuration() => Err(err),
            Err(err) => {
                events::failed_closed(account_id, feature_slug, &err);
                let decision = AccessDecision::fail_closed(feature_slug);
                self.resolver.metrics().record(&decision);
                Ok(decision)
            }
        }
    }

    /// Past usage periods for the account's current usage owner, newest first.
    pub fn usage_history(
        &self,
        account_id: &str,
        feature_slug: &str,
    ) -> TollgateResult<Vec<UsageRecord>> {
        let subscription = self.subscription(account_id)?;
        let owner = tollgate_core::models::usage_owner(account_id, subscription.as_ref());
        self.resolver.usage().history(&owner, feature_slug)
    }

    /// Whether the decision's usage has reached the configured warning threshold.
    pub fn is_near_limit(&self, decision: &AccessDecision) -> bool {
        decision.is_near_limit(self.metering.near_limit_threshold)
    }

    /// Forget the cached subscription for an account.
    pub fn invalidate_subscription(&self, account_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(account_id);
        }
    }

    /// Delete usage periods that ended before the retention window.
    pub fn compact_usage(&self, now: DateTime<Utc>) -> TollgateResult<usize> {
        self.retention
            .run(self.resolver.usage().storage().as_ref(), now)
    }

    pub fn metrics(&self) -> DecisionMetricsSnapshot {
        self.resolver.metrics().snapshot()
    }

    pub fn metrics_handle(&self) -> Arc<DecisionMetrics> {
        Arc::clone(self.resolver.metrics())
    }
}

impl std::fmt::Debug for EntitlementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementEngine")
            .field("resolver", &self.resolver)
            .field("cached", &self.cache.is_some())
            .field("retention", &self.retention)
            .field("metering", &self.metering)
            .finish_non_exhaustive()
    }
}
