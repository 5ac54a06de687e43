use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::TIMESTAMP_SUBSEC_DIGITS;
use crate::errors::{TollgateError, TollgateResult};

/// A billing window. Invariant: `end > start`, both held at microsecond
/// precision so every store keys the same period identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    /// Boundaries are truncated to microseconds before validation.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> TollgateResult<Self> {
        let start = start.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS);
        let end = end.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS);
        if end <= start {
            return Err(TollgateError::InvalidPeriod {
                reason: format!("period end {end} is not after start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// Both boundaries are inclusive; a period only lapses once `now > end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
