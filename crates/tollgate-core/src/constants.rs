/// Tollgate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Slug of the tier every account falls back to.
pub const FREE_TIER_SLUG: &str = "free";

/// Display name used when the free tier has to be synthesised.
pub const FREE_TIER_NAME: &str = "Free";

/// Prefix for usage owners that have no subscription (implicit free tier).
pub const FREE_USAGE_OWNER_PREFIX: &str = "free:";

/// Largest month-based cadence recognised when inferring a billing cadence.
pub const MAX_CADENCE_MONTHS: u32 = 36;

/// Periods walked forward from the estimated index when locating the period
/// that covers an instant. The estimate is never off by more than one.
pub const ROLLOVER_SEARCH_STEPS: u64 = 4;

/// Usage counts saturate here. It is the largest value an SQLite INTEGER holds.
pub const MAX_USAGE_COUNT: u64 = i64::MAX as u64;

/// Sub-second digits kept on stored timestamps (microseconds).
pub const TIMESTAMP_SUBSEC_DIGITS: u16 = 6;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;
