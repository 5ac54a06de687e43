//! Forward-only schema migrations. Each one runs in its own IMMEDIATE
//! transaction together with its `schema_version` row, so a failed
//! migration leaves the previous version intact.

mod v001_initial_schema;
mod v002_subscription_tables;
mod v003_usage_tables;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use tollgate_core::errors::{StorageError, TollgateResult};
use tollgate_core::TollgateError;

use crate::to_storage_err;

struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Connection) -> TollgateResult<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        up: v001_initial_schema::migrate,
    },
    Migration {
        version: 2,
        name: "subscription_tables",
        up: v002_subscription_tables::migrate,
    },
    Migration {
        version: 3,
        name: "usage_tables",
        up: v003_usage_tables::migrate,
    },
];

/// Schema version after every migration has run.
pub const LATEST_VERSION: u32 = 3;

/// Highest applied version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> TollgateResult<u32> {
    let has_table = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(|e| to_storage_err(e.to_string()))?;
    if !has_table {
        return Ok(0);
    }
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Apply every pending migration in order. Returns how many ran.
pub fn run_migrations(conn: &Connection) -> TollgateResult<u32> {
    let current = current_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        debug!(version = current, "schema up to date");
        return Ok(0);
    }

    info!(from = current, to = LATEST_VERSION, "migrating schema");
    for migration in &pending {
        apply(conn, migration)?;
    }
    Ok(pending.len() as u32)
}

fn apply(conn: &Connection, migration: &Migration) -> TollgateResult<()> {
    let version = migration.version;
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| failed(version, format!("begin: {e}")))?;

    let outcome = (migration.up)(conn).and_then(|()| {
        conn.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            rusqlite::params![version, migration.name],
        )
        .map(|_| ())
        .map_err(|e| to_storage_err(e.to_string()))
    });

    match outcome {
        Ok(()) => {
            conn.execute_batch("COMMIT")
                .map_err(|e| failed(version, format!("commit: {e}")))?;
            info!(version, name = migration.name, "applied migration");
            Ok(())
        }
        Err(e) => {
            warn!(version, name = migration.name, error = %e, "migration failed, rolling back");
            let _ = conn.execute_batch("ROLLBACK");
            Err(failed(version, e.to_string()))
        }
    }
}

fn failed(version: u32, reason: String) -> TollgateError {
    TollgateError::StorageError(StorageError::MigrationFailed { version, reason })
}
