use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::Tier;

/// Tier catalog configuration.
///
/// An empty `tiers` list means "use the built-in seed catalog".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Slug of the tier used for accounts without an active subscription.
    pub free_tier_slug: String,
    /// Tier definitions, in any order.
    pub tiers: Vec<Tier>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            free_tier_slug: defaults::DEFAULT_FREE_TIER_SLUG.to_string(),
            tiers: Vec::new(),
        }
    }
}
