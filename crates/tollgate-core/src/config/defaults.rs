// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "tollgate.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Catalog ---
pub const DEFAULT_FREE_TIER_SLUG: &str = "free";

// --- Metering ---
pub const DEFAULT_NEAR_LIMIT_THRESHOLD: f64 = 0.8;
pub const DEFAULT_SUBSCRIPTION_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_SUBSCRIPTION_CACHE_CAPACITY: u64 = 10_000;
pub const DEFAULT_USAGE_RETENTION_DAYS: u64 = 400;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_JSON: bool = true;
