//! Usage records whose period ended more than `retention_days` ago → delete.

use chrono::{DateTime, Duration, Utc};

use tollgate_core::config::defaults::DEFAULT_USAGE_RETENTION_DAYS;
use tollgate_core::errors::TollgateResult;
use tollgate_core::traits::IUsageStorage;

/// Retention policy for closed usage periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRetention {
    pub retention_days: u64,
}

impl Default for UsageRetention {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_USAGE_RETENTION_DAYS,
        }
    }
}

impl UsageRetention {
    pub fn new(retention_days: u64) -> Self {
        Self { retention_days }
    }

    /// Records whose period ended strictly before this instant are expired.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = i64::try_from(self.retention_days).unwrap_or(i64::MAX);
        Duration::try_days(days)
            .and_then(|d| now.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Delete expired records from `storage`. Returns the number removed.
    pub fn run(&self, storage: &dyn IUsageStorage, now: DateTime<Utc>) -> TollgateResult<usize> {
        let cutoff = self.cutoff(now);
        let removed = storage.prune_usage_before(cutoff)?;
        tracing::info!(
            removed,
            cutoff = %cutoff,
            retention_days = self.retention_days,
            "compacted usage records"
        );
        Ok(removed)
    }
}
