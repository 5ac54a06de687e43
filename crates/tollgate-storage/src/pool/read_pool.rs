//! Query-only reader connections over a WAL database.
//!
//! A read takes the first idle connection, scanning from a rotating start
//! index, and only blocks when every connection is busy.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, TryLockError};

use rusqlite::{Connection, OpenFlags};

use tollgate_core::errors::TollgateResult;

use super::pragmas::{self, Role};
use crate::to_unavailable_err;

/// Upper bound on reader connections, whatever the config asks for.
pub const MAX_READERS: usize = 8;

pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    /// Open `size` readers (clamped to 1..=8) on an existing database file.
    pub fn open(path: &Path, size: usize) -> TollgateResult<Self> {
        let size = size.clamp(1, MAX_READERS);
        let connections = (0..size)
            .map(|_| {
                let conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|e| to_unavailable_err(format!("{}: {e}", path.display())))?;
                pragmas::apply(&conn, Role::Reader)?;
                Ok(Mutex::new(conn))
            })
            .collect::<TollgateResult<Vec<_>>>()?;
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> TollgateResult<T>
    where
        F: FnOnce(&Connection) -> TollgateResult<T>,
    {
        let len = self.connections.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;
        for offset in 0..len {
            match self.connections[(start + offset) % len].try_lock() {
                Ok(guard) => return f(&guard),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => return Err(poisoned()),
            }
        }
        let guard = self.connections[start].lock().map_err(|_| poisoned())?;
        f(&guard)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

fn poisoned() -> tollgate_core::TollgateError {
    to_unavailable_err("reader connection lock poisoned".to_string())
}
