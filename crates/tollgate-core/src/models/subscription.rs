use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BillingPeriod;
use crate::constants::MILLIS_PER_DAY;
use crate::errors::{TollgateError, TollgateResult};

/// Billing-provider subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    #[serde(alias = "canceled")]
    Cancelled,
    Unpaid,
}

impl SubscriptionStatus {
    /// Statuses that entitle the holder to their stored tier.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Transitions the billing provider may legitimately report.
    /// Re-reporting the current status is always allowed.
    pub fn can_transition_to(&self, next: SubscriptionStatus) -> bool {
        use SubscriptionStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Trialing, Active)
                | (Trialing, PastDue)
                | (Trialing, Cancelled)
                | (Active, Cancelled)
                | (Active, PastDue)
                | (PastDue, Active)
                | (PastDue, Unpaid)
                | (Unpaid, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
            Self::Unpaid => "unpaid",
        }
    }

    /// Parse the stored representation (accepts the `canceled` spelling).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "trialing" => Some(Self::Trialing),
            "active" => Some(Self::Active),
            "past_due" => Some(Self::PastDue),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of an account's subscription as last reported by the
/// billing provider. The engine never writes these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub account_id: String,
    pub tier_slug: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl SubscriptionRecord {
    /// Build a record, enforcing `current_period_end > current_period_start`.
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        tier_slug: impl Into<String>,
        status: SubscriptionStatus,
        current_period_start: DateTime<Utc>,
        current_period_end: DateTime<Utc>,
    ) -> TollgateResult<Self> {
        let record = Self {
            id: id.into(),
            account_id: account_id.into(),
            tier_slug: tier_slug.into(),
            status,
            current_period_start,
            current_period_end,
            cancel_at_period_end: false,
            trial_ends_at: None,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> TollgateResult<()> {
        if self.current_period_end <= self.current_period_start {
            return Err(TollgateError::InvalidSubscription {
                id: self.id.clone(),
                reason: format!(
                    "current_period_end {} is not after current_period_start {}",
                    self.current_period_end, self.current_period_start
                ),
            });
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Trialing and, when the provider reported a trial end, not yet past it.
    pub fn is_trialing(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Trialing
            && self.trial_ends_at.map_or(true, |ends| now < ends)
    }

    pub fn will_cancel_at_period_end(&self) -> bool {
        self.cancel_at_period_end
    }

    /// Whole days left in the current period, rounded up; never negative.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.current_period_end - now).num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        ((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY) as u64
    }

    pub fn current_period(&self) -> TollgateResult<BillingPeriod> {
        BillingPeriod::new(self.current_period_start, self.current_period_end).map_err(|_| {
            TollgateError::InvalidSubscription {
                id: self.id.clone(),
                reason: "current period is empty or inverted".to_string(),
            }
        })
    }
}
