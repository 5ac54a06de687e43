//! File-backed persistence: restart survival, migration idempotence, and
//! round-trips for tiers and subscriptions.

use chrono::Duration;

use tollgate_core::constants::MAX_USAGE_COUNT;
use tollgate_core::models::{BillingPeriod, SubscriptionStatus, Tier};
use tollgate_core::traits::{ISubscriptionRepository, ITierRepository, IUsageStorage};
use tollgate_core::TollgateError;
use tollgate_storage::migrations::{self, LATEST_VERSION};
use tollgate_storage::{InMemoryUsageStore, StorageEngine};

use test_fixtures::{active_monthly, fixture_subscription, fixture_tiers, january_2025, ts};

#[test]
fn usage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("usage.db");
    let period = january_2025();

    {
        let engine = StorageEngine::open(&db_path).unwrap();
        engine
            .increment_usage("sub_1", "deal_finder", &period, 3, ts(2025, 1, 5))
            .unwrap();
    }

    let engine = StorageEngine::open(&db_path).unwrap();
    let record = engine
        .find_usage("sub_1", "deal_finder", period.start)
        .unwrap()
        .expect("record persisted");
    assert_eq!(record.count, 3);
    assert_eq!(record.period_end, period.end);
    assert_eq!(record.updated_at, ts(2025, 1, 5));
}

#[test]
fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("migrate.db");

    let engine = StorageEngine::open(&db_path).unwrap();
    let version = engine
        .pool()
        .writer
        .with_conn(migrations::current_version)
        .unwrap();
    assert_eq!(version, LATEST_VERSION);
    drop(engine);

    let engine = StorageEngine::open(&db_path).unwrap();
    let applied = engine
        .pool()
        .writer
        .with_conn(migrations::run_migrations)
        .unwrap();
    assert_eq!(applied, 0);
}

#[test]
fn get_or_create_returns_existing_record() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let period = january_2025();

    let first = engine
        .get_or_create_usage("sub_1", "pdf_reports", &period, ts(2025, 1, 2))
        .unwrap();
    assert_eq!(first.count, 0);

    engine
        .increment_usage("sub_1", "pdf_reports", &period, 2, ts(2025, 1, 3))
        .unwrap();
    let again = engine
        .get_or_create_usage("sub_1", "pdf_reports", &period, ts(2025, 1, 4))
        .unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.count, 2);
    assert_eq!(engine.usage_record_count().unwrap(), 1);
}

#[test]
fn periods_are_kept_separately() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let jan = january_2025();
    let feb = tollgate_core::BillingPeriod::new(ts(2025, 2, 1), ts(2025, 3, 1)).unwrap();

    engine
        .increment_usage("sub_1", "deal_finder", &jan, 5, ts(2025, 1, 20))
        .unwrap();
    engine
        .get_or_create_usage("sub_1", "deal_finder", &feb, ts(2025, 2, 1))
        .unwrap();

    let history = engine.usage_history("sub_1", "deal_finder").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].period_start, feb.start);
    assert_eq!(history[0].count, 0);
    assert_eq!(history[1].count, 5);
}

#[test]
fn tiers_round_trip() {
    let engine = StorageEngine::open_in_memory().unwrap();
    for tier in fixture_tiers() {
        engine.upsert_tier(&tier).unwrap();
    }

    let tiers = engine.list_tiers().unwrap();
    let slugs: Vec<&str> = tiers.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, ["free", "basic", "pro", "enterprise"]);

    let free = &tiers[0];
    assert_eq!(free.grant("deal_finder").unwrap().limit, Some(5));
    assert!(!free.grant("pdf_reports").unwrap().enabled);
    assert_eq!(tiers[2].grant("zoning_analysis").unwrap().limit, None);
}

#[test]
fn upsert_tier_replaces_grants() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let tier = Tier::new("solo", "Solo", 1)
        .with_feature("a", tollgate_core::FeatureGrant::limited(1))
        .with_feature("b", tollgate_core::FeatureGrant::unlimited());
    engine.upsert_tier(&tier).unwrap();

    let narrowed =
        Tier::new("solo", "Solo Plus", 1).with_feature("a", tollgate_core::FeatureGrant::limited(9));
    engine.upsert_tier(&narrowed).unwrap();

    let tiers = engine.list_tiers().unwrap();
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0].name, "Solo Plus");
    assert_eq!(tiers[0].features.len(), 1);
    assert_eq!(tiers[0].grant("a").unwrap().limit, Some(9));
}

#[test]
fn subscription_round_trip_keeps_optional_fields() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let trial = fixture_subscription("acct_trial");
    engine.upsert_subscription(&trial, ts(2025, 1, 1)).unwrap();

    let stored = engine.current_subscription("acct_trial").unwrap().unwrap();
    assert_eq!(stored, trial);
    assert_eq!(stored.trial_ends_at, Some(ts(2025, 1, 15)));
}

#[test]
fn canceled_spelling_is_normalised() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let lapsed = fixture_subscription("acct_lapsed");
    assert_eq!(lapsed.status, SubscriptionStatus::Cancelled);
    engine.upsert_subscription(&lapsed, ts(2025, 1, 1)).unwrap();

    let stored = engine.current_subscription("acct_lapsed").unwrap().unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Cancelled);
    assert!(!stored.is_active());
}

#[test]
fn new_subscription_replaces_previous_for_account() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .upsert_subscription(&active_monthly("acct", "basic"), ts(2025, 1, 1))
        .unwrap();

    let mut upgraded = active_monthly("acct", "pro");
    upgraded.id = "sub_acct_v2".to_string();
    engine.upsert_subscription(&upgraded, ts(2025, 1, 10)).unwrap();

    let stored = engine.current_subscription("acct").unwrap().unwrap();
    assert_eq!(stored.id, "sub_acct_v2");
    assert_eq!(stored.tier_slug, "pro");
}

#[test]
fn unexpected_status_transition_is_still_applied() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let mut sub = active_monthly("acct", "pro");
    sub.status = SubscriptionStatus::Cancelled;
    engine.upsert_subscription(&sub, ts(2025, 1, 1)).unwrap();

    sub.status = SubscriptionStatus::Active;
    engine.upsert_subscription(&sub, ts(2025, 1, 2)).unwrap();

    let stored = engine.current_subscription("acct").unwrap().unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Active);
}

#[test]
fn inverted_subscription_period_is_rejected() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let mut sub = active_monthly("acct", "pro");
    sub.current_period_end = sub.current_period_start;

    let err = engine.upsert_subscription(&sub, ts(2025, 1, 1)).unwrap_err();
    assert!(matches!(err, TollgateError::InvalidSubscription { .. }));
    assert!(engine.current_subscription("acct").unwrap().is_none());
}

#[test]
fn delete_subscription_reports_presence() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .upsert_subscription(&active_monthly("acct", "pro"), ts(2025, 1, 1))
        .unwrap();
    assert!(engine.delete_subscription("acct").unwrap());
    assert!(!engine.delete_subscription("acct").unwrap());
    assert!(engine.current_subscription("acct").unwrap().is_none());
}

#[test]
fn file_backed_engine_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StorageEngine::open(&dir.path().join("wal.db")).unwrap();
    let wal = engine
        .pool()
        .writer
        .with_conn(tollgate_storage::pool::pragmas::verify_wal_mode)
        .unwrap();
    assert!(wal);
    assert!(engine.pool().db_path.is_some());
}

#[test]
fn in_memory_engine_has_no_reader_pool() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert!(engine.pool().readers.is_none());
    assert!(engine.pool().db_path.is_none());
}

#[test]
fn reader_pool_size_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StorageEngine::open_with_readers(&dir.path().join("big.db"), 64).unwrap();
    let readers = engine.pool().readers.as_ref().unwrap();
    assert_eq!(readers.size(), tollgate_storage::pool::read_pool::MAX_READERS);
}

#[test]
fn overflowing_increment_saturates_and_row_stays_readable() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let period = january_2025();
    let now = ts(2025, 1, 2);

    engine.increment_usage("sub_1", "deal_finder", &period, 1, now).unwrap();
    let saturated = engine
        .increment_usage("sub_1", "deal_finder", &period, i64::MAX as u64, now)
        .unwrap();
    assert_eq!(saturated.count, MAX_USAGE_COUNT);

    let again = engine.increment_usage("sub_1", "deal_finder", &period, 1, now).unwrap();
    assert_eq!(again.count, MAX_USAGE_COUNT);
    let read = engine.get_or_create_usage("sub_1", "deal_finder", &period, now).unwrap();
    assert_eq!(read.count, MAX_USAGE_COUNT);

    let huge = engine
        .increment_usage("sub_2", "deal_finder", &period, u64::MAX, now)
        .unwrap();
    assert_eq!(huge.count, MAX_USAGE_COUNT);
}

#[test]
fn sub_microsecond_period_bounds_key_identically_in_both_stores() {
    let start = ts(2025, 1, 1) + Duration::nanoseconds(1_234_567);
    let period = BillingPeriod::new(start, ts(2025, 2, 1)).unwrap();
    assert_eq!(period.start, ts(2025, 1, 1) + Duration::microseconds(1_234));
    let now = ts(2025, 1, 2) + Duration::nanoseconds(999);

    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = InMemoryUsageStore::new();
    let a = engine.increment_usage("sub_1", "deal_finder", &period, 2, now).unwrap();
    let b = memory.increment_usage("sub_1", "deal_finder", &period, 2, now).unwrap();

    assert_eq!(a.period_start, b.period_start);
    assert_eq!(a.period_end, b.period_end);
    assert_eq!(a.updated_at, b.updated_at);
    assert!(engine.find_usage("sub_1", "deal_finder", period.start).unwrap().is_some());
    assert!(memory.find_usage("sub_1", "deal_finder", period.start).unwrap().is_some());
}
