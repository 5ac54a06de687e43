//! The single write connection. Every usage increment and lazy-reset insert
//! is serialized here, which is what makes concurrent increments on one
//! counter lossless.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use tollgate_core::errors::TollgateResult;

use super::pragmas::{self, Role};
use crate::to_unavailable_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> TollgateResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| to_unavailable_err(format!("{}: {e}", path.display())))?;
        Self::configure(conn)
    }

    pub fn open_in_memory() -> TollgateResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_unavailable_err(e.to_string()))?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> TollgateResult<Self> {
        pragmas::apply(&conn, Role::Writer)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` while holding the write lock. A poisoned lock means a previous
    /// writer panicked mid-statement; the store is reported unavailable.
    pub fn with_conn<F, T>(&self, f: F) -> TollgateResult<T>
    where
        F: FnOnce(&Connection) -> TollgateResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| to_unavailable_err("write connection lock poisoned".to_string()))?;
        f(&guard)
    }
}
