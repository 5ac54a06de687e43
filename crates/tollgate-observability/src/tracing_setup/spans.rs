//! Span definitions per resolver operation.

/// Create an access-check span.
#[macro_export]
macro_rules! access_check_span {
    ($account_id:expr, $feature_slug:expr) => {
        tracing::info_span!(
            "tollgate.access_check",
            account_id = %$account_id,
            feature_slug = %$feature_slug
        )
    };
}

/// Create a usage-record span.
#[macro_export]
macro_rules! usage_record_span {
    ($account_id:expr, $feature_slug:expr, $delta:expr) => {
        tracing::info_span!(
            "tollgate.usage_record",
            account_id = %$account_id,
            feature_slug = %$feature_slug,
            delta = $delta
        )
    };
}

/// Create a tier-check span.
#[macro_export]
macro_rules! tier_check_span {
    ($account_id:expr, $required_tier:expr) => {
        tracing::info_span!(
            "tollgate.tier_check",
            account_id = %$account_id,
            required_tier = %$required_tier
        )
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ACCESS_CHECK: &str = "tollgate.access_check";
    pub const USAGE_RECORD: &str = "tollgate.usage_record";
    pub const TIER_CHECK: &str = "tollgate.tier_check";
}
