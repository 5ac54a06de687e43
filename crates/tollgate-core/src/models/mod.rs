mod decision;
mod period;
mod subscription;
mod tier;
mod usage;

pub use decision::{AccessDecision, AccessReason, TierDecision};
pub use period::BillingPeriod;
pub use subscription::{SubscriptionRecord, SubscriptionStatus};
pub use tier::{FeatureGrant, Tier};
pub use usage::{usage_owner, UsageRecord};
