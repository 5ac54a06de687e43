//! SQLite connections: one serialized writer and, for file-backed stores, a
//! small pool of query-only readers.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use tollgate_core::errors::TollgateResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` for in-memory stores, whose data lives only on the writer.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Writer first, so the file and its WAL exist before readers attach.
    pub fn open(path: &Path, read_pool_size: usize) -> TollgateResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> TollgateResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory()?,
            readers: None,
            db_path: None,
        })
    }

    /// Run a read on a pooled reader, or on the writer when there is no pool.
    pub fn with_reader<F, T>(&self, f: F) -> TollgateResult<T>
    where
        F: FnOnce(&Connection) -> TollgateResult<T>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.writer.with_conn(f),
        }
    }
}
