//! v002: subscriptions (one current subscription per account).

use rusqlite::Connection;

use tollgate_core::errors::TollgateResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TollgateResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS subscriptions (
            id                    TEXT PRIMARY KEY,
            account_id            TEXT NOT NULL UNIQUE,
            tier_slug             TEXT NOT NULL,
            status                TEXT NOT NULL,
            current_period_start  TEXT NOT NULL,
            current_period_end    TEXT NOT NULL,
            cancel_at_period_end  INTEGER NOT NULL DEFAULT 0,
            trial_ends_at         TEXT,
            updated_at            TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            CHECK (current_period_end > current_period_start)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
