//! v003: usage_records, unique per (owner, feature, period start).

use rusqlite::Connection;

use tollgate_core::errors::TollgateResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TollgateResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS usage_records (
            id               TEXT PRIMARY KEY,
            subscription_id  TEXT NOT NULL,
            feature_slug     TEXT NOT NULL,
            usage_count      INTEGER NOT NULL DEFAULT 0 CHECK (usage_count >= 0),
            period_start     TEXT NOT NULL,
            period_end       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            UNIQUE (subscription_id, feature_slug, period_start)
        );

        CREATE INDEX IF NOT EXISTS idx_usage_period_end ON usage_records(period_end);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
