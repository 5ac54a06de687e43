//! TierCatalog: in-memory tier table populated once at startup.
//!
//! The free tier is always resolvable. If the backing tiers omit it, an empty
//! free tier is synthesised below every other tier's display order.

pub mod seed;

use std::collections::{HashMap, HashSet};

use tollgate_core::config::CatalogConfig;
use tollgate_core::constants::FREE_TIER_NAME;
use tollgate_core::errors::{CatalogError, TollgateResult};
use tollgate_core::models::{FeatureGrant, Tier};
use tollgate_core::traits::ITierRepository;

/// Immutable lookup table over tiers and their grants.
#[derive(Debug, Clone)]
pub struct TierCatalog {
    /// Sorted by display order, then name.
    tiers: Vec<Tier>,
    index: HashMap<String, usize>,
    free_slug: String,
    known_features: HashSet<String>,
}

impl TierCatalog {
    /// Build a catalog from an explicit tier list. Duplicate slugs are rejected.
    pub fn new(tiers: Vec<Tier>, free_tier_slug: &str) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for tier in &tiers {
            if !seen.insert(tier.slug.as_str()) {
                return Err(CatalogError::DuplicateTier {
                    slug: tier.slug.clone(),
                });
            }
        }

        let mut tiers = tiers;
        if !tiers.iter().any(|t| t.slug == free_tier_slug) {
            let lowest = tiers.iter().map(|t| t.display_order).min().unwrap_or(1);
            tracing::warn!(
                free_tier_slug,
                "free tier missing from catalog, synthesising one without grants"
            );
            tiers.push(Tier::new(
                free_tier_slug,
                FREE_TIER_NAME,
                lowest.saturating_sub(1),
            ));
        }
        tiers.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });

        let index = tiers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.slug.clone(), i))
            .collect();
        let known_features = tiers
            .iter()
            .flat_map(|t| t.features.keys().cloned())
            .collect();

        Ok(Self {
            tiers,
            index,
            free_slug: free_tier_slug.to_string(),
            known_features,
        })
    }

    /// Catalog from the `[catalog]` config section, or the built-in seed
    /// catalog when no tiers are configured.
    pub fn from_config(config: &CatalogConfig) -> TollgateResult<Self> {
        let tiers = if config.tiers.is_empty() {
            tracing::info!("no tiers configured, using the built-in catalog");
            seed::default_tiers()
        } else {
            config.tiers.clone()
        };
        let catalog = Self::new(tiers, &config.free_tier_slug)?;
        tracing::info!(tiers = catalog.len(), "tier catalog loaded");
        Ok(catalog)
    }

    /// Catalog from a tier repository, falling back to `config` when the
    /// repository holds no tiers.
    pub fn load(repository: &dyn ITierRepository, config: &CatalogConfig) -> TollgateResult<Self> {
        let tiers = repository.list_tiers()?;
        if tiers.is_empty() {
            return Self::from_config(config);
        }
        let catalog = Self::new(tiers, &config.free_tier_slug)?;
        tracing::info!(tiers = catalog.len(), "tier catalog loaded from repository");
        Ok(catalog)
    }

    pub fn get_tier(&self, slug: &str) -> Result<&Tier, CatalogError> {
        self.index
            .get(slug)
            .map(|&i| &self.tiers[i])
            .ok_or_else(|| CatalogError::TierNotFound {
                slug: slug.to_string(),
            })
    }

    /// All tiers ordered by display order, ties broken by name.
    pub fn list_tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn free_tier(&self) -> &Tier {
        // The constructor guarantees the free slug is indexed.
        &self.tiers[self.index[&self.free_slug]]
    }

    pub fn free_tier_slug(&self) -> &str {
        &self.free_slug
    }

    /// True iff any tier lists the feature, enabled or not.
    pub fn is_known_feature(&self, feature_slug: &str) -> bool {
        self.known_features.contains(feature_slug)
    }

    pub fn grant(&self, tier_slug: &str, feature_slug: &str) -> Option<&FeatureGrant> {
        self.get_tier(tier_slug).ok()?.grant(feature_slug)
    }

    /// Whether `tier_slug` ranks at or above `required_slug`. Unknown slugs never meet.
    pub fn meets_tier(&self, tier_slug: &str, required_slug: &str) -> bool {
        match (self.get_tier(tier_slug), self.get_tier(required_slug)) {
            (Ok(tier), Ok(required)) => tier.display_order >= required.display_order,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
