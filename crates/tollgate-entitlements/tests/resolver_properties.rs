//! Property tests over the resolver.

use std::sync::Arc;

use proptest::prelude::*;

use tollgate_core::models::{AccessReason, FeatureGrant, Tier};
use tollgate_entitlements::{EntitlementResolver, TierCatalog, UsageStore};
use tollgate_storage::InMemoryUsageStore;

use test_fixtures::{active_monthly, fixture_tiers, ts};

fn resolver_for(tiers: Vec<Tier>) -> EntitlementResolver {
    let catalog = Arc::new(TierCatalog::new(tiers, "free").unwrap());
    EntitlementResolver::new(catalog, UsageStore::new(Arc::new(InMemoryUsageStore::new())))
}

proptest! {
    #[test]
    fn prop_within_limit_iff_count_below_limit(limit in 0u64..20, uses in 0u64..30) {
        let tiers = vec![
            Tier::new("free", "Free", 0).with_feature("metered", FeatureGrant::limited(limit)),
        ];
        let resolver = resolver_for(tiers);
        let now = ts(2025, 1, 10);
        if uses > 0 {
            resolver.record_usage_by("acct", None, "metered", now, uses).unwrap();
        }
        let decision = resolver.check_access("acct", None, "metered", now).unwrap();
        prop_assert_eq!(decision.is_within_limit, uses < limit);
        prop_assert_eq!(decision.has_access, uses < limit);
        prop_assert_eq!(decision.usage_count, Some(uses));
    }

    #[test]
    fn prop_ungranted_features_are_not_in_catalog(
        tier_index in 0usize..4,
        feature in prop::sample::select(vec![
            "property_search", "basic_roi", "deal_finder", "pdf_reports",
            "zoning_analysis", "advanced_analytics", "api_access", "white_label",
        ]),
    ) {
        let tiers = fixture_tiers();
        let tier = tiers[tier_index].clone();
        let resolver = resolver_for(tiers);
        let sub = active_monthly("acct", &tier.slug);

        let decision = resolver.check_access("acct", Some(&sub), feature, ts(2025, 1, 10)).unwrap();
        let granted = tier.grant(feature).map_or(false, |g| g.enabled);
        if granted {
            prop_assert_ne!(decision.reason, AccessReason::NotInCatalog);
        } else {
            prop_assert!(!decision.has_access);
            prop_assert_eq!(decision.reason, AccessReason::NotInCatalog);
        }
    }

    #[test]
    fn prop_unlimited_is_always_within_limit(uses in 0u64..5000) {
        let tiers = vec![
            Tier::new("free", "Free", 0).with_feature("open", FeatureGrant::unlimited()),
        ];
        let resolver = resolver_for(tiers);
        let now = ts(2025, 1, 10);
        let decision = resolver.record_usage_by("acct", None, "open", now, uses).unwrap();
        prop_assert!(decision.is_within_limit);
        prop_assert!(decision.has_access);
        prop_assert_eq!(decision.usage_limit, None);
    }
}
