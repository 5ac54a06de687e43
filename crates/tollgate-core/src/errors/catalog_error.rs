/// Tier catalog errors. These indicate deploy or configuration mistakes,
/// never an access denial.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("feature '{feature_slug}' is not defined by any tier")]
    UnknownFeature { feature_slug: String },

    #[error("tier not found: {slug}")]
    TierNotFound { slug: String },

    #[error("duplicate tier slug in catalog: {slug}")]
    DuplicateTier { slug: String },
}
