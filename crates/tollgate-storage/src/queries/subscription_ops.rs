//! Subscription snapshots as delivered by the billing provider's webhooks.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use tollgate_core::errors::TollgateResult;
use tollgate_core::models::{SubscriptionRecord, SubscriptionStatus};

use super::{fmt_ts, parse_ts};
use crate::to_storage_err;

const SUBSCRIPTION_COLUMNS: &str = "id, account_id, tier_slug, status, current_period_start, \
     current_period_end, cancel_at_period_end, trial_ends_at";

fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<SubscriptionRecord> {
    let status: String = row.get(3)?;
    let start: String = row.get(4)?;
    let end: String = row.get(5)?;
    let cancel: i32 = row.get(6)?;
    let trial: Option<String> = row.get(7)?;
    let status = SubscriptionStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown subscription status '{status}'").into(),
        )
    })?;
    Ok(SubscriptionRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        tier_slug: row.get(2)?,
        status,
        current_period_start: parse_ts(4, &start)?,
        current_period_end: parse_ts(5, &end)?,
        cancel_at_period_end: cancel != 0,
        trial_ends_at: trial.map(|t| parse_ts(7, &t)).transpose()?,
    })
}

/// Store the provider's latest view of an account's subscription. An account
/// holds one subscription; a new id for the same account replaces the old row.
pub fn upsert_subscription(
    conn: &Connection,
    record: &SubscriptionRecord,
    now: DateTime<Utc>,
) -> TollgateResult<()> {
    record.validate()?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("upsert_subscription begin: {e}")))?;

    let result = (|| -> TollgateResult<()> {
        if let Some(previous) = get_by_account_inner(&tx, &record.account_id)? {
            if previous.id == record.id && !previous.status.can_transition_to(record.status) {
                tracing::warn!(
                    subscription_id = %record.id,
                    from = %previous.status,
                    to = %record.status,
                    "billing provider reported an unexpected status transition"
                );
            }
        }
        tx.execute(
            "DELETE FROM subscriptions WHERE account_id = ?1 AND id != ?2",
            params![record.account_id, record.id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tx.execute(
            &format!(
                "INSERT INTO subscriptions ({SUBSCRIPTION_COLUMNS}, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    account_id = excluded.account_id,
                    tier_slug = excluded.tier_slug,
                    status = excluded.status,
                    current_period_start = excluded.current_period_start,
                    current_period_end = excluded.current_period_end,
                    cancel_at_period_end = excluded.cancel_at_period_end,
                    trial_ends_at = excluded.trial_ends_at,
                    updated_at = excluded.updated_at"
            ),
            params![
                record.id,
                record.account_id,
                record.tier_slug,
                record.status.as_str(),
                fmt_ts(record.current_period_start),
                fmt_ts(record.current_period_end),
                record.cancel_at_period_end as i32,
                record.trial_ends_at.map(fmt_ts),
                fmt_ts(now),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(())
    })();

    match result {
        Ok(()) => tx
            .commit()
            .map_err(|e| to_storage_err(format!("upsert_subscription commit: {e}"))),
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn get_by_account_inner(
    conn: &Connection,
    account_id: &str,
) -> TollgateResult<Option<SubscriptionRecord>> {
    conn.query_row(
        &format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE account_id = ?1"),
        params![account_id],
        row_to_subscription,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn get_by_account(
    conn: &Connection,
    account_id: &str,
) -> TollgateResult<Option<SubscriptionRecord>> {
    get_by_account_inner(conn, account_id)
}

/// Remove an account's subscription (the provider deleted it outright).
pub fn delete_by_account(conn: &Connection, account_id: &str) -> TollgateResult<bool> {
    let removed = conn
        .execute(
            "DELETE FROM subscriptions WHERE account_id = ?1",
            params![account_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(removed > 0)
}
