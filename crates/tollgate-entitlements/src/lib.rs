//! # tollgate-entitlements
//!
//! Decides whether an account may use a feature right now, given its tier,
//! subscription status and current-period usage, and records usage after the
//! protected action runs.
//!
//! - [`TierCatalog`]: immutable tier → feature grant table, loaded once.
//! - [`BillingPeriodClock`]: cadence inference and lazy period rollover.
//! - [`UsageStore`]: per-period counters over any `IUsageStorage`.
//! - [`EntitlementResolver`]: the access decision algorithm.
//! - [`EntitlementEngine`]: facade wiring repositories, cache and resolver.

pub mod cache;
pub mod catalog;
pub mod clock;
pub mod engine;
pub mod resolver;
pub mod usage;

pub use cache::CachedSubscriptionRepository;
pub use catalog::TierCatalog;
pub use clock::{BillingPeriodClock, Cadence};
pub use engine::EntitlementEngine;
pub use resolver::EntitlementResolver;
pub use usage::UsageStore;
