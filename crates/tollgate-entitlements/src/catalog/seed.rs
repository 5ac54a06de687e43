//! Built-in tier catalog used when neither the tier repository nor the config
//! provides one.

use tollgate_core::models::{FeatureGrant, Tier};

/// free / basic / pro / enterprise, in display order.
pub fn default_tiers() -> Vec<Tier> {
    vec![
        Tier::new("free", "Free", 0)
            .with_feature("property_search", FeatureGrant::limited(10))
            .with_feature("basic_roi", FeatureGrant::unlimited())
            .with_feature("deal_finder", FeatureGrant::limited(5)),
        Tier::new("basic", "Basic", 1)
            .with_feature("property_search", FeatureGrant::unlimited())
            .with_feature("basic_roi", FeatureGrant::unlimited())
            .with_feature("full_roi", FeatureGrant::unlimited())
            .with_feature("pdf_reports", FeatureGrant::limited(5))
            .with_feature("basic_analytics", FeatureGrant::unlimited())
            .with_feature("deal_finder", FeatureGrant::limited(25)),
        Tier::new("pro", "Pro", 2)
            .with_feature("property_search", FeatureGrant::unlimited())
            .with_feature("basic_roi", FeatureGrant::unlimited())
            .with_feature("full_roi", FeatureGrant::unlimited())
            .with_feature("pdf_reports", FeatureGrant::unlimited())
            .with_feature("basic_analytics", FeatureGrant::unlimited())
            .with_feature("advanced_analytics", FeatureGrant::unlimited())
            .with_feature("api_access", FeatureGrant::unlimited())
            .with_feature("data_export", FeatureGrant::unlimited())
            .with_feature("deal_finder", FeatureGrant::unlimited())
            .with_feature("zoning_analysis", FeatureGrant::unlimited()),
        Tier::new("enterprise", "Enterprise", 3)
            .with_feature("property_search", FeatureGrant::unlimited())
            .with_feature("basic_roi", FeatureGrant::unlimited())
            .with_feature("full_roi", FeatureGrant::unlimited())
            .with_feature("pdf_reports", FeatureGrant::unlimited())
            .with_feature("basic_analytics", FeatureGrant::unlimited())
            .with_feature("advanced_analytics", FeatureGrant::unlimited())
            .with_feature("api_access", FeatureGrant::unlimited())
            .with_feature("data_export", FeatureGrant::unlimited())
            .with_feature("deal_finder", FeatureGrant::unlimited())
            .with_feature("zoning_analysis", FeatureGrant::unlimited())
            .with_feature("white_label", FeatureGrant::unlimited()),
    ]
}
