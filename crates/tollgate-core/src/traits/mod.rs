mod subscription_repository;
mod tier_repository;
mod usage_storage;

pub use subscription_repository::ISubscriptionRepository;
pub use tier_repository::ITierRepository;
pub use usage_storage::IUsageStorage;
