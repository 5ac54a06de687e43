//! v001: schema_version, tiers, tier_features.

use rusqlite::Connection;

use tollgate_core::errors::TollgateResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TollgateResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS tiers (
            slug          TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS tier_features (
            tier_slug     TEXT NOT NULL REFERENCES tiers(slug) ON DELETE CASCADE,
            feature_slug  TEXT NOT NULL,
            enabled       INTEGER NOT NULL DEFAULT 1,
            usage_limit   INTEGER CHECK (usage_limit IS NULL OR usage_limit >= 0),
            PRIMARY KEY (tier_slug, feature_slug)
        );

        CREATE INDEX IF NOT EXISTS idx_tier_features_feature ON tier_features(feature_slug);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
