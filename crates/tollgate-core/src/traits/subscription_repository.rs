use crate::errors::TollgateResult;
use crate::models::SubscriptionRecord;

/// Read access to subscriptions as last synced from the billing provider.
pub trait ISubscriptionRepository: Send + Sync {
    /// The account's current subscription, or `None` for implicit free tier.
    fn current_subscription(&self, account_id: &str) -> TollgateResult<Option<SubscriptionRecord>>;
}
