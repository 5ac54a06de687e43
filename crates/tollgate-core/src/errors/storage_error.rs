/// Storage-layer errors for usage, subscription, and tier persistence.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}
