//! EntitlementResolver: combines the tier catalog, subscription status and
//! current-period usage into an [`AccessDecision`].
//!
//! Resolution order:
//! 1. No subscription, or one not in good standing, resolves to the free tier
//!    regardless of the stored tier slug.
//! 2. A feature the effective tier does not grant (or grants disabled) is
//!    `NotInCatalog`.
//! 3. An unlimited grant is `Granted` without touching usage storage.
//! 4. A quota-bound grant is `Granted` iff `count < limit`, else `QuotaExceeded`.
//!
//! A feature slug unknown to every tier is a configuration error, never a
//! silent denial.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tollgate_core::errors::{CatalogError, TollgateResult};
use tollgate_core::models::{
    usage_owner, AccessDecision, AccessReason, BillingPeriod, FeatureGrant, SubscriptionRecord,
    Tier, TierDecision,
};
use tollgate_observability::tracing_setup::events;
use tollgate_observability::DecisionMetrics;

use crate::catalog::TierCatalog;
use crate::clock::BillingPeriodClock;
use crate::usage::UsageStore;

pub struct EntitlementResolver {
    catalog: Arc<TierCatalog>,
    usage: UsageStore,
    metrics: Arc<DecisionMetrics>,
}

impl EntitlementResolver {
    pub fn new(catalog: Arc<TierCatalog>, usage: UsageStore) -> Self {
        Self {
            catalog,
            usage,
            metrics: Arc::new(DecisionMetrics::new()),
        }
    }

    /// Share a metrics sink with other components.
    pub fn with_metrics(mut self, metrics: Arc<DecisionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn usage(&self) -> &UsageStore {
        &self.usage
    }

    pub fn metrics(&self) -> &Arc<DecisionMetrics> {
        &self.metrics
    }

    /// The tier the account is entitled to right now.
    pub fn effective_tier(&self, subscription: Option<&SubscriptionRecord>) -> TollgateResult<&Tier> {
        match subscription {
            Some(sub) if sub.is_active() => Ok(self.catalog.get_tier(&sub.tier_slug)?),
            _ => Ok(self.catalog.free_tier()),
        }
    }

    pub fn check_access(
        &self,
        account_id: &str,
        subscription: Option<&SubscriptionRecord>,
        feature_slug: &str,
        now: DateTime<Utc>,
    ) -> TollgateResult<AccessDecision> {
        let span = tollgate_observability::access_check_span!(account_id, feature_slug);
        let _guard = span.enter();

        let result = self.decide(account_id, subscription, feature_slug, now, 0);
        self.observe(account_id, feature_slug, result)
    }

    /// Record one use of the feature. Call after the protected action ran.
    pub fn record_usage(
        &self,
        account_id: &str,
        subscription: Option<&SubscriptionRecord>,
        feature_slug: &str,
        now: DateTime<Utc>,
    ) -> TollgateResult<AccessDecision> {
        self.record_usage_by(account_id, subscription, feature_slug, now, 1)
    }

    /// Record `delta` uses and return the post-increment decision.
    ///
    /// Features the effective tier does not grant, and unlimited features,
    /// are not counted. Over-quota recording still counts.
    pub fn record_usage_by(
        &self,
        account_id: &str,
        subscription: Option<&SubscriptionRecord>,
        feature_slug: &str,
        now: DateTime<Utc>,
        delta: u64,
    ) -> TollgateResult<AccessDecision> {
        let span = tollgate_observability::usage_record_span!(account_id, feature_slug, delta);
        let _guard = span.enter();

        let result = self.decide(account_id, subscription, feature_slug, now, delta);
        self.observe(account_id, feature_slug, result)
    }

    /// Tier-level gate: granted when the effective tier ranks at or above
    /// `required_tier_slug`.
    pub fn check_tier(
        &self,
        account_id: &str,
        subscription: Option<&SubscriptionRecord>,
        required_tier_slug: &str,
    ) -> TollgateResult<TierDecision> {
        let span = tollgate_observability::tier_check_span!(account_id, required_tier_slug);
        let _guard = span.enter();

        let result = self.decide_tier(subscription, required_tier_slug);
        match result {
            Ok(decision) => {
                self.metrics.record_tier(&decision);
                Ok(decision)
            }
            Err(err) => {
                if err.is_configuration() {
                    self.metrics.record_configuration_error();
                    events::configuration_error(account_id, required_tier_slug, &err);
                }
                Err(err)
            }
        }
    }

    /// Current-period decisions for every quota-bound feature of the
    /// effective tier, in feature slug order. Reads only; records nothing.
    pub fn usage_summary(
        &self,
        account_id: &str,
        subscription: Option<&SubscriptionRecord>,
        now: DateTime<Utc>,
    ) -> TollgateResult<Vec<AccessDecision>> {
        let tier = self.effective_tier(subscription)?;
        let owner = usage_owner(account_id, subscription);
        let anchor = usage_anchor(subscription, now)?;

        tier.metered_features()
            .map(|(feature_slug, grant)| -> TollgateResult<AccessDecision> {
                let limit = grant.limit.unwrap_or(0);
                let record = self.usage.get_usage(&owner, feature_slug, &anchor, now)?;
                Ok(AccessDecision::metered(
                    feature_slug,
                    &tier.slug,
                    record.count,
                    limit,
                    record.period(),
                ))
            })
            .collect()
    }

    /// Shared path for checks (`delta == 0`) and recordings.
    fn decide(
        &self,
        account_id: &str,
        subscription: Option<&SubscriptionRecord>,
        feature_slug: &str,
        now: DateTime<Utc>,
        delta: u64,
    ) -> TollgateResult<AccessDecision> {
        if !self.catalog.is_known_feature(feature_slug) {
            return Err(CatalogError::UnknownFeature {
                feature_slug: feature_slug.to_string(),
            }
            .into());
        }

        let tier = self.effective_tier(subscription)?;
        let limit = match tier.grant(feature_slug) {
            Some(FeatureGrant {
                enabled: true,
                limit,
            }) => *limit,
            _ => return Ok(AccessDecision::not_in_catalog(feature_slug, &tier.slug)),
        };
        let Some(limit) = limit else {
            return Ok(AccessDecision::unlimited(feature_slug, &tier.slug));
        };

        let owner = usage_owner(account_id, subscription);
        let anchor = usage_anchor(subscription, now)?;
        let record = if delta == 0 {
            self.usage.get_usage(&owner, feature_slug, &anchor, now)?
        } else {
            let record = self
                .usage
                .increment(&owner, feature_slug, &anchor, now, delta)?;
            self.metrics.record_usage(delta);
            record
        };

        let decision =
            AccessDecision::metered(feature_slug, &tier.slug, record.count, limit, record.period());
        if delta > 0 && record.count >= limit && record.count.saturating_sub(delta) < limit {
            events::quota_exceeded(account_id, &decision);
        }
        Ok(decision)
    }

    fn decide_tier(
        &self,
        subscription: Option<&SubscriptionRecord>,
        required_tier_slug: &str,
    ) -> TollgateResult<TierDecision> {
        let required = self.catalog.get_tier(required_tier_slug)?;
        let effective = self.effective_tier(subscription)?;

        let has_access = self.catalog.meets_tier(&effective.slug, &required.slug);
        let reason = if has_access {
            AccessReason::Granted
        } else {
            match subscription {
                Some(sub)
                    if !sub.is_active() && self.catalog.meets_tier(&sub.tier_slug, &required.slug) =>
                {
                    AccessReason::InactiveSubscription
                }
                _ => AccessReason::NotInCatalog,
            }
        };

        Ok(TierDecision {
            required_tier: required.slug.clone(),
            effective_tier: effective.slug.clone(),
            has_access,
            reason,
        })
    }

    fn observe(
        &self,
        account_id: &str,
        feature_slug: &str,
        result: TollgateResult<AccessDecision>,
    ) -> TollgateResult<AccessDecision> {
        match &result {
            Ok(decision) => {
                self.metrics.record(decision);
                events::access_decided(account_id, decision);
            }
            Err(err) if err.is_configuration() => {
                self.metrics.record_configuration_error();
                events::configuration_error(account_id, feature_slug, err);
            }
            Err(_) => {}
        }
        result
    }
}

/// The period usage is anchored on: the subscription's current period, or
/// the calendar month for accounts without one.
fn usage_anchor(
    subscription: Option<&SubscriptionRecord>,
    now: DateTime<Utc>,
) -> TollgateResult<BillingPeriod> {
    match subscription {
        Some(sub) => sub.current_period(),
        None => BillingPeriodClock::calendar_month(now),
    }
}

impl std::fmt::Debug for EntitlementResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementResolver")
            .field("tiers", &self.catalog.len())
            .finish_non_exhaustive()
    }
}
