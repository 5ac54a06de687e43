//! Facade wiring: repositories, cache, fail-closed checks, compaction.

use std::sync::Arc;

use tollgate_core::config::TollgateConfig;
use tollgate_core::errors::{StorageError, TollgateResult};
use tollgate_core::models::{AccessReason, SubscriptionRecord, Tier};
use tollgate_core::traits::{ISubscriptionRepository, IUsageStorage};
use tollgate_core::TollgateError;
use tollgate_entitlements::EntitlementEngine;
use tollgate_storage::{InMemorySubscriptionStore, InMemoryUsageStore, StorageEngine};

use test_fixtures::{active_monthly, fixture_tiers, ts};

struct UnreachableSubscriptions;

impl ISubscriptionRepository for UnreachableSubscriptions {
    fn current_subscription(&self, _account_id: &str) -> TollgateResult<Option<SubscriptionRecord>> {
        Err(TollgateError::StorageError(StorageError::Unavailable {
            reason: "billing replica offline".into(),
        }))
    }
}

fn uncached_config() -> TollgateConfig {
    let mut config = TollgateConfig::default();
    config.metering.subscription_cache_ttl_secs = 0;
    config
}

fn in_memory_engine(
    config: &TollgateConfig,
) -> (EntitlementEngine, Arc<InMemorySubscriptionStore>, Arc<InMemoryUsageStore>) {
    let subscriptions = Arc::new(InMemorySubscriptionStore::new());
    let usage = Arc::new(InMemoryUsageStore::new());
    let engine = EntitlementEngine::new(
        config,
        &fixture_tiers(),
        subscriptions.clone(),
        usage.clone(),
    )
    .unwrap();
    (engine, subscriptions, usage)
}

#[test]
fn looks_up_subscription_per_call() {
    let (engine, subscriptions, _) = in_memory_engine(&uncached_config());
    subscriptions.put(active_monthly("acct", "pro")).unwrap();

    let decision = engine.check_access("acct", "zoning_analysis", ts(2025, 1, 3)).unwrap();
    assert!(decision.has_access);
    assert_eq!(decision.effective_tier.as_deref(), Some("pro"));
    assert_eq!(engine.list_tiers().len(), 4);
}

#[test]
fn cached_subscription_is_reused_until_invalidated() {
    let (engine, subscriptions, _) = in_memory_engine(&TollgateConfig::default());
    subscriptions.put(active_monthly("acct", "basic")).unwrap();
    let now = ts(2025, 1, 3);

    engine.check_access("acct", "zoning_analysis", now).unwrap();
    subscriptions.put(active_monthly("acct", "pro")).unwrap();

    let stale = engine.check_access("acct", "zoning_analysis", now).unwrap();
    assert_eq!(stale.reason, AccessReason::NotInCatalog);
    assert_eq!(subscriptions.lookup_count(), 1);

    engine.invalidate_subscription("acct");
    let fresh = engine.check_access("acct", "zoning_analysis", now).unwrap();
    assert!(fresh.has_access);
    assert_eq!(subscriptions.lookup_count(), 2);
}

#[test]
fn fail_closed_denies_when_subscriptions_are_unreachable() {
    let config = uncached_config();
    let engine = EntitlementEngine::new(
        &config,
        &fixture_tiers(),
        Arc::new(UnreachableSubscriptions),
        Arc::new(InMemoryUsageStore::new()),
    )
    .unwrap();
    let now = ts(2025, 1, 3);

    let err = engine.check_access("acct", "basic_roi", now).unwrap_err();
    assert!(err.is_store_unavailable());

    let decision = engine.check_access_fail_closed("acct", "basic_roi", now).unwrap();
    assert!(!decision.has_access);
    assert!(!decision.is_within_limit);
    assert_eq!(decision.reason, AccessReason::Unavailable);
    assert_eq!(decision.effective_tier, None);
    assert_eq!(engine.metrics().unavailable, 1);
}

#[test]
fn fail_closed_still_surfaces_configuration_errors() {
    let (engine, _, _) = in_memory_engine(&uncached_config());
    let err = engine
        .check_access_fail_closed("acct", "nonexistent_feature", ts(2025, 1, 3))
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn catalog_falls_back_to_configured_tiers() {
    let config = TollgateConfig::from_toml(
        r#"
        [metering]
        subscription_cache_ttl_secs = 0

        [[catalog.tiers]]
        slug = "free"
        name = "Free"

        [catalog.tiers.features.reports]
        limit = 2
        "#,
    )
    .unwrap();
    let engine = EntitlementEngine::new(
        &config,
        &Vec::<Tier>::new(),
        Arc::new(InMemorySubscriptionStore::new()),
        Arc::new(InMemoryUsageStore::new()),
    )
    .unwrap();
    let now = ts(2025, 1, 3);

    engine.record_usage("acct", "reports", now).unwrap();
    let second = engine.record_usage("acct", "reports", now).unwrap();
    assert_eq!(second.reason, AccessReason::QuotaExceeded);
    assert!(engine.is_near_limit(&second));
}

#[test]
fn empty_config_uses_builtin_catalog() {
    let engine = EntitlementEngine::new(
        &uncached_config(),
        &Vec::<Tier>::new(),
        Arc::new(InMemorySubscriptionStore::new()),
        Arc::new(InMemoryUsageStore::new()),
    )
    .unwrap();
    let slugs: Vec<&str> = engine.list_tiers().iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, ["free", "basic", "pro", "enterprise"]);
    assert!(engine.catalog().is_known_feature("zoning_analysis"));
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = uncached_config();
    config.metering.near_limit_threshold = 1.5;
    let err = EntitlementEngine::new(
        &config,
        &fixture_tiers(),
        Arc::new(InMemorySubscriptionStore::new()),
        Arc::new(InMemoryUsageStore::new()),
    )
    .unwrap_err();
    assert!(matches!(err, TollgateError::ConfigError(_)));
}

#[test]
fn compaction_removes_expired_periods() {
    let (engine, _, usage) = in_memory_engine(&uncached_config());
    engine.record_usage("acct", "deal_finder", ts(2023, 1, 10)).unwrap();
    engine.record_usage("acct", "deal_finder", ts(2025, 2, 10)).unwrap();

    let removed = engine.compact_usage(ts(2025, 2, 20)).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(usage.len(), 1);
    assert_eq!(engine.usage_history("acct", "deal_finder").unwrap().len(), 1);
}

#[test]
fn sqlite_engine_reads_tiers_and_subscriptions_from_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tollgate.db");
    {
        let storage = StorageEngine::open(&db_path).unwrap();
        for tier in fixture_tiers() {
            storage.upsert_tier(&tier).unwrap();
        }
        storage
            .upsert_subscription(&active_monthly("acct", "pro"), ts(2025, 1, 1))
            .unwrap();
    }

    let mut config = uncached_config();
    config.storage.db_path = db_path.to_string_lossy().into_owned();
    let now = ts(2025, 1, 3);

    {
        let engine = EntitlementEngine::open(&config).unwrap();
        let decision = engine.record_usage_by("acct", "api_access", now, 40).unwrap();
        assert_eq!(decision.usage_count, Some(40));
        assert_eq!(decision.usage_limit, Some(1000));
    }

    let engine = EntitlementEngine::open(&config).unwrap();
    let decision = engine.check_access("acct", "api_access", now).unwrap();
    assert_eq!(decision.usage_count, Some(40));

    let storage = StorageEngine::open(&db_path).unwrap();
    let record = storage
        .find_usage("sub_acct", "api_access", ts(2025, 1, 1))
        .unwrap()
        .unwrap();
    assert_eq!(record.count, 40);
}
