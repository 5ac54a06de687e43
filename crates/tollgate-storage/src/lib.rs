//! # tollgate-storage
//!
//! Persistence for the Tollgate entitlement engine.
//! Implements `IUsageStorage`, `ISubscriptionRepository` and `ITierRepository`
//! over SQLite (single write connection + read pool, WAL mode), and provides a
//! DashMap-backed `InMemoryUsageStore` for embedding and tests.

pub mod compaction;
pub mod engine;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use compaction::UsageRetention;
pub use engine::StorageEngine;
pub use memory::{InMemorySubscriptionStore, InMemoryUsageStore};

/// Helper to convert a string message into a TollgateError::StorageError.
pub fn to_storage_err(msg: String) -> tollgate_core::TollgateError {
    tollgate_core::TollgateError::StorageError(tollgate_core::errors::StorageError::SqliteError {
        message: msg,
    })
}

/// Helper for failures that mean the store cannot serve requests at all.
pub fn to_unavailable_err(msg: String) -> tollgate_core::TollgateError {
    tollgate_core::TollgateError::StorageError(tollgate_core::errors::StorageError::Unavailable {
        reason: msg,
    })
}
