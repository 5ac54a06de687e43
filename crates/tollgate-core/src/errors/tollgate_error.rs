use super::{CatalogError, StorageError};

/// Top-level error type for the Tollgate engine.
/// All subsystem errors convert into this via `From` impls.
///
/// Expected denials (feature not granted, quota reached) are never errors;
/// they are returned as [`crate::models::AccessDecision`] values.
#[derive(Debug, thiserror::Error)]
pub enum TollgateError {
    #[error("configuration error: {0}")]
    Configuration(#[from] CatalogError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("invalid subscription {id}: {reason}")]
    InvalidSubscription { id: String, reason: String },

    #[error("invalid billing period: {reason}")]
    InvalidPeriod { reason: String },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl TollgateError {
    /// True for catalog misconfiguration. These must be surfaced to operators
    /// rather than folded into a denial.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// True when the backing store could not serve the request.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StorageError(_))
    }
}

/// Convenience type alias.
pub type TollgateResult<T> = Result<T, TollgateError>;
