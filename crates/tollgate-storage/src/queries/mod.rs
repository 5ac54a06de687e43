//! SQL for each table. Every function takes a borrowed connection so the
//! engine decides which connection (writer or reader) it runs on.

pub mod subscription_ops;
pub mod tier_ops;
pub mod usage_ops;

use chrono::{DateTime, SecondsFormat, Utc};

/// Canonical timestamp text. Fixed width, so string order equals time order
/// and the usage uniqueness key compares exactly.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
