use serde::{Deserialize, Serialize};

use super::BillingPeriod;

/// Why an access decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    Granted,
    /// The effective tier does not grant the feature (upgrade needed).
    NotInCatalog,
    /// The feature is granted but this period's quota is used up.
    QuotaExceeded,
    /// The stored tier would grant it but the subscription is not in good standing.
    InactiveSubscription,
    /// The store could not be consulted; denied by default.
    Unavailable,
}

impl AccessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::NotInCatalog => "not_in_catalog",
            Self::QuotaExceeded => "quota_exceeded",
            Self::InactiveSubscription => "inactive_subscription",
            Self::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for AccessReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a feature access check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub feature_slug: String,
    /// Tier the decision was made against. `None` only for fail-closed denials.
    pub effective_tier: Option<String>,
    pub has_access: bool,
    /// Current-period usage. `None` when the feature is not metered.
    pub usage_count: Option<u64>,
    /// Per-period quota. `None` means unlimited (or not applicable).
    pub usage_limit: Option<u64>,
    pub is_within_limit: bool,
    pub reason: AccessReason,
    /// Period the usage count belongs to, for metered features.
    pub period: Option<BillingPeriod>,
}

impl AccessDecision {
    pub fn not_in_catalog(feature_slug: &str, effective_tier: &str) -> Self {
        Self {
            feature_slug: feature_slug.to_string(),
            effective_tier: Some(effective_tier.to_string()),
            has_access: false,
            usage_count: None,
            usage_limit: None,
            is_within_limit: true,
            reason: AccessReason::NotInCatalog,
            period: None,
        }
    }

    pub fn unlimited(feature_slug: &str, effective_tier: &str) -> Self {
        Self {
            feature_slug: feature_slug.to_string(),
            effective_tier: Some(effective_tier.to_string()),
            has_access: true,
            usage_count: None,
            usage_limit: None,
            is_within_limit: true,
            reason: AccessReason::Granted,
            period: None,
        }
    }

    /// Quota-bound decision: within limit iff `count < limit`.
    /// Reaching the limit denies access even though the feature is enabled.
    pub fn metered(
        feature_slug: &str,
        effective_tier: &str,
        count: u64,
        limit: u64,
        period: BillingPeriod,
    ) -> Self {
        let is_within_limit = count < limit;
        Self {
            feature_slug: feature_slug.to_string(),
            effective_tier: Some(effective_tier.to_string()),
            has_access: is_within_limit,
            usage_count: Some(count),
            usage_limit: Some(limit),
            is_within_limit,
            reason: if is_within_limit {
                AccessReason::Granted
            } else {
                AccessReason::QuotaExceeded
            },
            period: Some(period),
        }
    }

    /// Denial used when the decision could not be computed.
    pub fn fail_closed(feature_slug: &str) -> Self {
        Self {
            feature_slug: feature_slug.to_string(),
            effective_tier: None,
            has_access: false,
            usage_count: None,
            usage_limit: None,
            is_within_limit: false,
            reason: AccessReason::Unavailable,
            period: None,
        }
    }

    /// Quota left this period. `None` for unmetered features.
    pub fn remaining(&self) -> Option<u64> {
        self.usage_limit
            .map(|limit| limit.saturating_sub(self.usage_count.unwrap_or(0)))
    }

    /// Share of the quota consumed, in percent. May exceed 100.
    pub fn usage_percent(&self) -> Option<f64> {
        let limit = self.usage_limit?;
        let count = self.usage_count.unwrap_or(0);
        if limit == 0 {
            return Some(100.0);
        }
        Some((count as f64 / limit as f64) * 100.0)
    }

    /// Whether usage has reached `threshold` (0.0–1.0) of the quota.
    pub fn is_near_limit(&self, threshold: f64) -> bool {
        match self.usage_percent() {
            Some(percent) => percent >= threshold * 100.0,
            None => false,
        }
    }

    /// Denials that a tier change (rather than waiting for a reset) would fix.
    pub fn requires_upgrade(&self) -> bool {
        matches!(
            self.reason,
            AccessReason::NotInCatalog | AccessReason::InactiveSubscription
        )
    }
}

/// Outcome of a tier-level gate ("requires Pro or above").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDecision {
    pub required_tier: String,
    pub effective_tier: String,
    pub has_access: bool,
    pub reason: AccessReason,
}
