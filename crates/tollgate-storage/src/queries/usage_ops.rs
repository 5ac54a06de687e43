//! Upsert-once creation, atomic increment, history and pruning of usage records.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use tollgate_core::constants::MAX_USAGE_COUNT;
use tollgate_core::errors::TollgateResult;
use tollgate_core::models::{BillingPeriod, UsageRecord};

use super::{fmt_ts, parse_ts};
use crate::to_storage_err;

const USAGE_COLUMNS: &str =
    "id, subscription_id, feature_slug, usage_count, period_start, period_end, updated_at";

fn row_to_usage(row: &Row<'_>) -> rusqlite::Result<UsageRecord> {
    let count: i64 = row.get(3)?;
    let period_start: String = row.get(4)?;
    let period_end: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(UsageRecord {
        id: row.get(0)?,
        subscription_id: row.get(1)?,
        feature_slug: row.get(2)?,
        count: count.max(0) as u64,
        period_start: parse_ts(4, &period_start)?,
        period_end: parse_ts(5, &period_end)?,
        updated_at: parse_ts(6, &updated_at)?,
    })
}

/// Deltas past the column range clamp to it; the count saturates there anyway.
fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value.min(MAX_USAGE_COUNT)).unwrap_or(i64::MAX)
}

/// Insert a zero-count record unless one already exists for the period, then
/// return whichever record is stored. Concurrent first accesses converge on
/// the same row.
pub fn get_or_create(
    conn: &Connection,
    subscription_id: &str,
    feature_slug: &str,
    period: &BillingPeriod,
    now: DateTime<Utc>,
) -> TollgateResult<UsageRecord> {
    let fresh = UsageRecord::new(subscription_id, feature_slug, period, now);
    let inserted = conn
        .execute(
            &format!(
                "INSERT INTO usage_records ({USAGE_COLUMNS}) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)
                 ON CONFLICT(subscription_id, feature_slug, period_start) DO NOTHING"
            ),
            params![
                fresh.id,
                subscription_id,
                feature_slug,
                fmt_ts(period.start),
                fmt_ts(period.end),
                fmt_ts(now),
            ],
        )
        .map_err(|e| to_storage_err(format!("get_or_create usage: {e}")))?;

    if inserted > 0 {
        tracing::debug!(
            subscription_id,
            feature_slug,
            period_start = %period.start,
            period_end = %period.end,
            "opened usage period"
        );
    }

    find(conn, subscription_id, feature_slug, period.start)?.ok_or_else(|| {
        to_storage_err(format!(
            "usage record for {subscription_id}/{feature_slug} missing after upsert"
        ))
    })
}

/// Add `delta` in a single statement. The conflict branch runs inside SQLite's
/// own write lock, so no read-modify-write window exists. The sum saturates at
/// `i64::MAX`; an overflowing `+` would otherwise store a REAL.
pub fn increment(
    conn: &Connection,
    subscription_id: &str,
    feature_slug: &str,
    period: &BillingPeriod,
    delta: u64,
    now: DateTime<Utc>,
) -> TollgateResult<UsageRecord> {
    let delta = to_sql_count(delta);
    let id = uuid::Uuid::new_v4().to_string();
    conn.query_row(
        &format!(
            "INSERT INTO usage_records ({USAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(subscription_id, feature_slug, period_start)
             DO UPDATE SET usage_count = MIN(usage_count, 9223372036854775807 - excluded.usage_count)
                                        + excluded.usage_count,
                           updated_at = excluded.updated_at
             RETURNING {USAGE_COLUMNS}"
        ),
        params![
            id,
            subscription_id,
            feature_slug,
            delta,
            fmt_ts(period.start),
            fmt_ts(period.end),
            fmt_ts(now),
        ],
        row_to_usage,
    )
    .map_err(|e| to_storage_err(format!("increment usage: {e}")))
}

pub fn find(
    conn: &Connection,
    subscription_id: &str,
    feature_slug: &str,
    period_start: DateTime<Utc>,
) -> TollgateResult<Option<UsageRecord>> {
    conn.query_row(
        &format!(
            "SELECT {USAGE_COLUMNS} FROM usage_records
             WHERE subscription_id = ?1 AND feature_slug = ?2 AND period_start = ?3"
        ),
        params![subscription_id, feature_slug, fmt_ts(period_start)],
        row_to_usage,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// All periods for the key, newest first.
pub fn history(
    conn: &Connection,
    subscription_id: &str,
    feature_slug: &str,
) -> TollgateResult<Vec<UsageRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {USAGE_COLUMNS} FROM usage_records
             WHERE subscription_id = ?1 AND feature_slug = ?2
             ORDER BY period_start DESC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![subscription_id, feature_slug], row_to_usage)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Delete records whose period ended strictly before `cutoff`.
pub fn prune_before(conn: &Connection, cutoff: DateTime<Utc>) -> TollgateResult<usize> {
    conn.execute(
        "DELETE FROM usage_records WHERE period_end < ?1",
        params![fmt_ts(cutoff)],
    )
    .map_err(|e| to_storage_err(format!("prune usage: {e}")))
}

/// Total number of stored usage records.
pub fn count_records(conn: &Connection) -> TollgateResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM usage_records", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count.max(0) as usize)
}
