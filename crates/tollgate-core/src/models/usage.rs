use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::{BillingPeriod, SubscriptionRecord};
use crate::constants::{FREE_USAGE_OWNER_PREFIX, TIMESTAMP_SUBSEC_DIGITS};

/// Usage counter for one feature within one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: String,
    pub subscription_id: String,
    pub feature_slug: String,
    pub count: u64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UsageRecord {
    /// A fresh zero-count record for `period`.
    pub fn new(
        subscription_id: impl Into<String>,
        feature_slug: impl Into<String>,
        period: &BillingPeriod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subscription_id: subscription_id.into(),
            feature_slug: feature_slug.into(),
            count: 0,
            period_start: period.start,
            period_end: period.end,
            updated_at: now.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS),
        }
    }

    pub fn period(&self) -> BillingPeriod {
        BillingPeriod {
            start: self.period_start,
            end: self.period_end,
        }
    }
}

/// Key that usage is recorded under: the subscription id when one exists,
/// otherwise a namespaced account id for the implicit free tier.
pub fn usage_owner(account_id: &str, subscription: Option<&SubscriptionRecord>) -> String {
    match subscription {
        Some(sub) => sub.id.clone(),
        None => format!("{FREE_USAGE_OWNER_PREFIX}{account_id}"),
    }
}
