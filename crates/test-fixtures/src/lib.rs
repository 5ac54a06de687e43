//! Shared fixtures for Tollgate tests: a four-tier catalog, a handful of
//! subscription snapshots, and timestamp helpers.
//!
//! JSON fixtures live under this crate's `fixtures/` directory.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;

use tollgate_core::models::{BillingPeriod, SubscriptionRecord, SubscriptionStatus, Tier};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// free / basic / pro / enterprise.
///
/// Free meters `deal_finder` at 5 and `property_search` at 10; Pro grants
/// `zoning_analysis` without a quota and meters `api_access` at 1000.
pub fn fixture_tiers() -> Vec<Tier> {
    load_fixture("catalog/tiers.json")
}

/// Subscription snapshots keyed by distinct account ids.
pub fn fixture_subscriptions() -> Vec<SubscriptionRecord> {
    load_fixture("subscriptions/accounts.json")
}

/// A fixture subscription by account id.
///
/// # Panics
/// Panics if no fixture uses that account.
pub fn fixture_subscription(account_id: &str) -> SubscriptionRecord {
    fixture_subscriptions()
        .into_iter()
        .find(|s| s.account_id == account_id)
        .unwrap_or_else(|| panic!("no subscription fixture for account {account_id}"))
}

/// Midnight UTC on the given day.
pub fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    ts_hms(year, month, day, 0, 0, 0)
}

pub fn ts_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture timestamp {year}-{month}-{day}"))
}

/// 2025-01-01T00:00Z .. 2025-02-01T00:00Z.
pub fn january_2025() -> BillingPeriod {
    BillingPeriod::new(ts(2025, 1, 1), ts(2025, 2, 1)).expect("valid fixture period")
}

/// A subscription over `period` with a derived id `sub_<account_id>`.
pub fn subscription(
    account_id: &str,
    tier_slug: &str,
    status: SubscriptionStatus,
    period: BillingPeriod,
) -> SubscriptionRecord {
    SubscriptionRecord::new(
        format!("sub_{account_id}"),
        account_id,
        tier_slug,
        status,
        period.start,
        period.end,
    )
    .expect("valid fixture subscription")
}

/// An active subscription for January 2025.
pub fn active_monthly(account_id: &str, tier_slug: &str) -> SubscriptionRecord {
    subscription(account_id, tier_slug, SubscriptionStatus::Active, january_2025())
}
