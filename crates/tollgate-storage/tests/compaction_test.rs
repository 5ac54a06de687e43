//! Retention compaction over both usage stores.

use tollgate_core::models::BillingPeriod;
use tollgate_core::traits::IUsageStorage;
use tollgate_storage::{InMemoryUsageStore, StorageEngine, UsageRetention};

use test_fixtures::ts;

fn seed(storage: &dyn IUsageStorage) {
    let old = BillingPeriod::new(ts(2023, 1, 1), ts(2023, 2, 1)).unwrap();
    let recent = BillingPeriod::new(ts(2025, 1, 1), ts(2025, 2, 1)).unwrap();
    storage
        .increment_usage("sub_1", "deal_finder", &old, 4, ts(2023, 1, 9))
        .unwrap();
    storage
        .increment_usage("sub_1", "deal_finder", &recent, 2, ts(2025, 1, 9))
        .unwrap();
}

#[test]
fn cutoff_is_retention_days_before_now() {
    let retention = UsageRetention::new(30);
    assert_eq!(retention.cutoff(ts(2025, 3, 1)), ts(2025, 1, 30));
}

#[test]
fn huge_retention_never_panics() {
    let retention = UsageRetention::new(u64::MAX);
    let cutoff = retention.cutoff(ts(2025, 3, 1));
    assert!(cutoff < ts(2025, 3, 1));
}

#[test]
fn sqlite_compaction_drops_expired_periods() {
    let engine = StorageEngine::open_in_memory().unwrap();
    seed(&engine);

    let removed = UsageRetention::new(400).run(&engine, ts(2025, 2, 15)).unwrap();
    assert_eq!(removed, 1);

    let history = engine.usage_history("sub_1", "deal_finder").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].count, 2);
}

#[test]
fn in_memory_compaction_drops_expired_periods() {
    let store = InMemoryUsageStore::new();
    seed(&store);

    let removed = UsageRetention::default().run(&store, ts(2025, 2, 15)).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn current_period_is_never_compacted() {
    let engine = StorageEngine::open_in_memory().unwrap();
    seed(&engine);

    let removed = UsageRetention::new(0).run(&engine, ts(2025, 1, 20)).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(engine.usage_record_count().unwrap(), 1);
}
