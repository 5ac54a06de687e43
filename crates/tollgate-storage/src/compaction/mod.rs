pub mod expired_usage;

pub use expired_usage::UsageRetention;
