//! Per-connection PRAGMAs, by connection role.

use std::time::Duration;

use rusqlite::Connection;

use tollgate_core::errors::TollgateResult;

use crate::to_storage_err;

/// How long a connection waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Writer,
    Reader,
}

/// Configure a freshly opened connection.
///
/// Writers switch the file to WAL so readers never block on increments.
/// In-memory databases report `memory` and stay that way.
pub fn apply(conn: &Connection, role: Role) -> TollgateResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| to_storage_err(e.to_string()))?;
    match role {
        Role::Writer => {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .map_err(|e| to_storage_err(e.to_string()))?;
            tracing::debug!(journal_mode = %mode, "write connection configured");
            conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;")
                .map_err(|e| to_storage_err(e.to_string()))?;
        }
        Role::Reader => {
            conn.execute_batch("PRAGMA query_only = ON;")
                .map_err(|e| to_storage_err(e.to_string()))?;
        }
    }
    Ok(())
}

/// Current journal mode, lowercased.
pub fn journal_mode(conn: &Connection) -> TollgateResult<String> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.to_ascii_lowercase())
}

pub fn verify_wal_mode(conn: &Connection) -> TollgateResult<bool> {
    Ok(journal_mode(conn)? == "wal")
}
