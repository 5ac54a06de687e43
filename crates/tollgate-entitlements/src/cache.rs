//! Read-through subscription cache using moka.
//!
//! Caches both present and absent subscriptions per account for a bounded
//! TTL. Lookup errors are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use tollgate_core::errors::TollgateResult;
use tollgate_core::models::SubscriptionRecord;
use tollgate_core::traits::ISubscriptionRepository;

pub struct CachedSubscriptionRepository {
    inner: Arc<dyn ISubscriptionRepository>,
    cache: Cache<String, Option<SubscriptionRecord>>,
}

impl CachedSubscriptionRepository {
    pub fn new(inner: Arc<dyn ISubscriptionRepository>, ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    /// Drop the cached entry for an account, e.g. when a billing webhook lands.
    pub fn invalidate(&self, account_id: &str) {
        self.cache.invalidate(account_id);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of cached accounts.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ISubscriptionRepository for CachedSubscriptionRepository {
    fn current_subscription(&self, account_id: &str) -> TollgateResult<Option<SubscriptionRecord>> {
        if let Some(hit) = self.cache.get(account_id) {
            return Ok(hit);
        }
        tracing::debug!(account_id, "subscription cache miss");
        let fresh = self.inner.current_subscription(account_id)?;
        self.cache.insert(account_id.to_string(), fresh.clone());
        Ok(fresh)
    }
}
