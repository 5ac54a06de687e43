use serde::{Deserialize, Serialize};

use super::defaults;

/// Usage metering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteringConfig {
    /// Fraction of a quota (0.0–1.0) at which a decision counts as near its limit.
    pub near_limit_threshold: f64,
    /// Time-to-live of cached subscription lookups, in seconds. 0 disables the cache.
    pub subscription_cache_ttl_secs: u64,
    /// Maximum number of cached subscription lookups.
    pub subscription_cache_capacity: u64,
    /// Usage records whose period ended more than this many days ago are compacted.
    pub usage_retention_days: u64,
}

impl Default for MeteringConfig {
    fn default() -> Self {
        Self {
            near_limit_threshold: defaults::DEFAULT_NEAR_LIMIT_THRESHOLD,
            subscription_cache_ttl_secs: defaults::DEFAULT_SUBSCRIPTION_CACHE_TTL_SECS,
            subscription_cache_capacity: defaults::DEFAULT_SUBSCRIPTION_CACHE_CAPACITY,
            usage_retention_days: defaults::DEFAULT_USAGE_RETENTION_DAYS,
        }
    }
}
