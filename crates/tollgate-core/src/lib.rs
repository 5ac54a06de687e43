//! # tollgate-core
//!
//! Foundation crate for the Tollgate entitlement engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::TollgateConfig;
pub use errors::{TollgateError, TollgateResult};
pub use models::{
    AccessDecision, AccessReason, BillingPeriod, FeatureGrant, SubscriptionRecord,
    SubscriptionStatus, Tier, TierDecision, UsageRecord,
};
