//! Billing period arithmetic: cadence inference, staleness, and lazy rollover.
//!
//! A period's length is read off the period itself. Whole-month cadences are
//! anchored on the original start, so the k-th period of a monthly
//! subscription starting on the 31st begins on `start + k months` rather than
//! drifting to the 28th after February.

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};

use tollgate_core::constants::{MAX_CADENCE_MONTHS, ROLLOVER_SEARCH_STEPS};
use tollgate_core::errors::{TollgateError, TollgateResult};
use tollgate_core::models::BillingPeriod;

/// How often a billing period repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Whole calendar months (1 = monthly, 12 = yearly).
    Months(u32),
    /// Any other length, repeated verbatim.
    Fixed(Duration),
}

/// Stateless period calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BillingPeriodClock;

impl BillingPeriodClock {
    /// `Months(m)` when `start + m months == end` for some `m` in 1..=36,
    /// otherwise the fixed duration `end - start`.
    pub fn cadence(period: &BillingPeriod) -> Cadence {
        for months in 1..=MAX_CADENCE_MONTHS {
            match period.start.checked_add_months(Months::new(months)) {
                Some(end) if end == period.end => return Cadence::Months(months),
                Some(end) if end < period.end => continue,
                _ => break,
            }
        }
        Cadence::Fixed(period.length())
    }

    /// A period lapses only once `now` is strictly past its end.
    pub fn is_stale(period: &BillingPeriod, now: DateTime<Utc>) -> bool {
        now > period.end
    }

    /// The period immediately following `period`.
    pub fn next_period(period: &BillingPeriod) -> TollgateResult<BillingPeriod> {
        Self::nth_period(period, 1)
    }

    /// The `n`-th period after `anchor` (0 is `anchor` itself).
    pub fn nth_period(anchor: &BillingPeriod, n: u32) -> TollgateResult<BillingPeriod> {
        period_at(anchor, Self::cadence(anchor), u64::from(n))
    }

    /// The period in the anchor's sequence that covers `now`. Instants before
    /// the anchor map to the anchor itself.
    ///
    /// The index is computed from the elapsed time, then the search walks
    /// forward from one period earlier so the inclusive end of the previous
    /// period wins at an exact boundary.
    pub fn period_containing(
        anchor: &BillingPeriod,
        now: DateTime<Utc>,
    ) -> TollgateResult<BillingPeriod> {
        if !Self::is_stale(anchor, now) {
            return Ok(*anchor);
        }
        let cadence = Self::cadence(anchor);
        let first = estimate_index(anchor, cadence, now)?.saturating_sub(1);
        for n in first..first.saturating_add(ROLLOVER_SEARCH_STEPS) {
            let period = period_at(anchor, cadence, n)?;
            if !Self::is_stale(&period, now) {
                tracing::debug!(
                    anchor_start = %anchor.start,
                    period_start = %period.start,
                    period_end = %period.end,
                    index = n,
                    "rolled billing period forward"
                );
                return Ok(period);
            }
        }
        Err(TollgateError::InvalidPeriod {
            reason: format!("no period after {} covers {now}", anchor.start),
        })
    }

    /// The UTC calendar month containing `now`. Used for accounts without a
    /// subscription.
    pub fn calendar_month(now: DateTime<Utc>) -> TollgateResult<BillingPeriod> {
        let start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .ok_or_else(|| TollgateError::InvalidPeriod {
                reason: format!("no month start for {now}"),
            })?;
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| TollgateError::InvalidPeriod {
                reason: format!("month after {start} is out of range"),
            })?;
        BillingPeriod::new(start, end)
    }
}

fn period_at(anchor: &BillingPeriod, cadence: Cadence, n: u64) -> TollgateResult<BillingPeriod> {
    if n == 0 {
        return Ok(*anchor);
    }
    let next = n.checked_add(1).ok_or_else(|| out_of_range(anchor.start))?;
    let (start, end) = match cadence {
        Cadence::Months(months) => (
            add_months(anchor.start, months, n)?,
            add_months(anchor.start, months, next)?,
        ),
        Cadence::Fixed(length) => (
            add_fixed(anchor.start, length, n)?,
            add_fixed(anchor.start, length, next)?,
        ),
    };
    BillingPeriod::new(start, end)
}

/// Index of the period starting at or before `now`, exact for fixed cadences
/// and at most one too high for month cadences (day clamping).
fn estimate_index(
    anchor: &BillingPeriod,
    cadence: Cadence,
    now: DateTime<Utc>,
) -> TollgateResult<u64> {
    match cadence {
        Cadence::Months(months) => {
            let elapsed = (i64::from(now.year()) - i64::from(anchor.start.year())) * 12
                + i64::from(now.month())
                - i64::from(anchor.start.month());
            Ok(u64::try_from(elapsed).unwrap_or(0) / u64::from(months.max(1)))
        }
        Cadence::Fixed(length) => {
            let elapsed = (now - anchor.start)
                .num_microseconds()
                .ok_or_else(|| out_of_range(anchor.start))?;
            let step = length
                .num_microseconds()
                .filter(|us| *us > 0)
                .ok_or_else(|| out_of_range(anchor.start))?;
            Ok(u64::try_from(elapsed / step).unwrap_or(0))
        }
    }
}

fn add_months(start: DateTime<Utc>, months: u32, n: u64) -> TollgateResult<DateTime<Utc>> {
    u64::from(months)
        .checked_mul(n)
        .and_then(|total| u32::try_from(total).ok())
        .and_then(|total| start.checked_add_months(Months::new(total)))
        .ok_or_else(|| out_of_range(start))
}

fn add_fixed(start: DateTime<Utc>, length: Duration, n: u64) -> TollgateResult<DateTime<Utc>> {
    let n = i64::try_from(n).map_err(|_| out_of_range(start))?;
    length
        .num_microseconds()
        .and_then(|us| us.checked_mul(n))
        .map(Duration::microseconds)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| out_of_range(start))
}

fn out_of_range(start: DateTime<Utc>) -> TollgateError {
    TollgateError::InvalidPeriod {
        reason: format!("period sequence from {start} leaves the representable range"),
    }
}
