use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a tier grants for a single feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGrant {
    /// Whether the feature is available at all on the tier.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Per-period quota. `None` means unlimited.
    #[serde(default)]
    pub limit: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl FeatureGrant {
    /// Enabled with no quota.
    pub fn unlimited() -> Self {
        Self {
            enabled: true,
            limit: None,
        }
    }

    /// Enabled with a per-period quota.
    pub fn limited(limit: u64) -> Self {
        Self {
            enabled: true,
            limit: Some(limit),
        }
    }

    /// Listed on the tier but switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            limit: None,
        }
    }

    /// Enabled and quota-bound, i.e. usage must be metered.
    pub fn is_metered(&self) -> bool {
        self.enabled && self.limit.is_some()
    }
}

/// A named subscription level and the features it grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureGrant>,
}

impl Tier {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, display_order: i32) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            display_order,
            features: BTreeMap::new(),
        }
    }

    /// Builder-style grant registration.
    pub fn with_feature(mut self, feature_slug: impl Into<String>, grant: FeatureGrant) -> Self {
        self.features.insert(feature_slug.into(), grant);
        self
    }

    /// Grant for a feature, if the tier lists it.
    pub fn grant(&self, feature_slug: &str) -> Option<&FeatureGrant> {
        self.features.get(feature_slug)
    }

    /// Enabled, quota-bound features in slug order.
    pub fn metered_features(&self) -> impl Iterator<Item = (&str, &FeatureGrant)> {
        self.features
            .iter()
            .filter(|(_, grant)| grant.is_metered())
            .map(|(slug, grant)| (slug.as_str(), grant))
    }
}
