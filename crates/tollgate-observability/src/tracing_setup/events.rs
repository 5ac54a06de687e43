//! Structured log events for access decisions.
//!
//! Each function emits a `tracing` event with an `event` field so log
//! pipelines can filter on it.

use tollgate_core::models::AccessDecision;

/// Log the outcome of an access check or usage record.
pub fn access_decided(account_id: &str, decision: &AccessDecision) {
    tracing::debug!(
        event = "access_decided",
        account_id = %account_id,
        feature_slug = %decision.feature_slug,
        effective_tier = ?decision.effective_tier,
        has_access = decision.has_access,
        usage_count = ?decision.usage_count,
        usage_limit = ?decision.usage_limit,
        reason = %decision.reason,
        "access decided"
    );
}

/// Log a quota crossing. Emitted once per denial, not per check.
pub fn quota_exceeded(account_id: &str, decision: &AccessDecision) {
    tracing::info!(
        event = "quota_exceeded",
        account_id = %account_id,
        feature_slug = %decision.feature_slug,
        usage_count = ?decision.usage_count,
        usage_limit = ?decision.usage_limit,
        "usage quota exceeded"
    );
}

/// Log a catalog misconfiguration surfaced by a request.
pub fn configuration_error(account_id: &str, subject: &str, error: &dyn std::fmt::Display) {
    tracing::error!(
        event = "configuration_error",
        account_id = %account_id,
        subject = %subject,
        error = %error,
        "entitlement configuration error"
    );
}

/// Log a denial caused by an unavailable dependency.
pub fn failed_closed(account_id: &str, feature_slug: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(
        event = "failed_closed",
        account_id = %account_id,
        feature_slug = %feature_slug,
        error = %error,
        "access denied because a dependency was unavailable"
    );
}
