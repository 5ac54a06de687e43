//! StorageEngine: the SQLite implementation of the usage, subscription and
//! tier repositories. Pending migrations run on open.

use std::path::Path;

use chrono::{DateTime, Utc};

use tollgate_core::config::defaults::DEFAULT_READ_POOL_SIZE;
use tollgate_core::errors::TollgateResult;
use tollgate_core::models::{BillingPeriod, SubscriptionRecord, Tier, UsageRecord};
use tollgate_core::traits::{ISubscriptionRepository, ITierRepository, IUsageStorage};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{subscription_ops, tier_ops, usage_ops};

/// Serves usage counters, subscription snapshots and the tier list from one
/// SQLite database.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open (creating if needed) a file-backed store with the default reader count.
    pub fn open(path: &Path) -> TollgateResult<Self> {
        Self::open_with_readers(path, DEFAULT_READ_POOL_SIZE)
    }

    pub fn open_with_readers(path: &Path, read_pool_size: usize) -> TollgateResult<Self> {
        Self::initialize(ConnectionPool::open(path, read_pool_size)?)
    }

    /// A private in-memory database. All reads go through the writer.
    pub fn open_in_memory() -> TollgateResult<Self> {
        Self::initialize(ConnectionPool::open_in_memory()?)
    }

    fn initialize(pool: ConnectionPool) -> TollgateResult<Self> {
        let applied = pool.writer.with_conn(migrations::run_migrations)?;
        tracing::debug!(applied, path = ?pool.db_path, "storage engine ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn with_reader<F, T>(&self, f: F) -> TollgateResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> TollgateResult<T>,
    {
        self.pool.with_reader(f)
    }

    // --- Billing sync inputs (written by the billing collaborator, never by the resolver) ---

    pub fn upsert_tier(&self, tier: &Tier) -> TollgateResult<()> {
        self.pool
            .writer
            .with_conn(|conn| tier_ops::upsert_tier(conn, tier))
    }

    pub fn upsert_subscription(
        &self,
        record: &SubscriptionRecord,
        now: DateTime<Utc>,
    ) -> TollgateResult<()> {
        self.pool
            .writer
            .with_conn(|conn| subscription_ops::upsert_subscription(conn, record, now))
    }

    pub fn delete_subscription(&self, account_id: &str) -> TollgateResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| subscription_ops::delete_by_account(conn, account_id))
    }

    /// Number of usage records currently stored (all owners, all periods).
    pub fn usage_record_count(&self) -> TollgateResult<usize> {
        self.with_reader(usage_ops::count_records)
    }
}

impl IUsageStorage for StorageEngine {
    fn get_or_create_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period: &BillingPeriod,
        now: DateTime<Utc>,
    ) -> TollgateResult<UsageRecord> {
        self.pool.writer.with_conn(|conn| {
            usage_ops::get_or_create(conn, subscription_id, feature_slug, period, now)
        })
    }

    fn increment_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period: &BillingPeriod,
        delta: u64,
        now: DateTime<Utc>,
    ) -> TollgateResult<UsageRecord> {
        self.pool.writer.with_conn(|conn| {
            usage_ops::increment(conn, subscription_id, feature_slug, period, delta, now)
        })
    }

    fn find_usage(
        &self,
        subscription_id: &str,
        feature_slug: &str,
        period_start: DateTime<Utc>,
    ) -> TollgateResult<Option<UsageRecord>> {
        self.with_reader(|conn| usage_ops::find(conn, subscription_id, feature_slug, period_start))
    }

    fn usage_history(
        &self,
        subscription_id: &str,
        feature_slug: &str,
    ) -> TollgateResult<Vec<UsageRecord>> {
        self.with_reader(|conn| usage_ops::history(conn, subscription_id, feature_slug))
    }

    fn prune_usage_before(&self, cutoff: DateTime<Utc>) -> TollgateResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| usage_ops::prune_before(conn, cutoff))
    }
}

impl ISubscriptionRepository for StorageEngine {
    fn current_subscription(&self, account_id: &str) -> TollgateResult<Option<SubscriptionRecord>> {
        self.with_reader(|conn| subscription_ops::get_by_account(conn, account_id))
    }
}

impl ITierRepository for StorageEngine {
    fn list_tiers(&self) -> TollgateResult<Vec<Tier>> {
        self.with_reader(tier_ops::list_tiers)
    }
}
