pub mod catalog_config;
pub mod defaults;
pub mod metering_config;
pub mod observability_config;
pub mod storage_config;

use serde::{Deserialize, Serialize};

pub use catalog_config::CatalogConfig;
pub use metering_config::MeteringConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;

use crate::errors::{TollgateError, TollgateResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TollgateConfig {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub metering: MeteringConfig,
    pub observability: ObservabilityConfig,
}

impl TollgateConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load config from a TOML file on disk.
    pub fn from_file(path: &std::path::Path) -> TollgateResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TollgateError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml(&raw).map_err(|e| TollgateError::ConfigError(e.to_string()))
    }

    /// Reject values that would make the engine misbehave silently.
    pub fn validate(&self) -> TollgateResult<()> {
        let threshold = self.metering.near_limit_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(TollgateError::ConfigError(format!(
                "metering.near_limit_threshold must be within 0.0..=1.0, got {threshold}"
            )));
        }
        if self.catalog.free_tier_slug.trim().is_empty() {
            return Err(TollgateError::ConfigError(
                "catalog.free_tier_slug must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
