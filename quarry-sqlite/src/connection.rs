use crate::{Shared, SqliteStatement, SqliteTransaction, lock};
use anyhow::Context;
use quarry_core::{Connection, Error, Executor, Result, Statement};
use rusqlite::OpenFlags;
use std::sync::{Arc, Mutex};

/// A SQLite database handle.
///
/// Opened with a url like `sqlite://:memory:` or `sqlite://path/to/file.db?mode=rwc`, anything
/// after the scheme is handed to SQLite as a `file:` uri.
pub struct SqliteConnection {
    pub(crate) connection: Shared,
}

impl SqliteConnection {
    pub fn from_rusqlite(connection: rusqlite::Connection) -> Self {
        Self {
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    /// Runs one or more statements separated by `;`, without arguments.
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        lock(&self.connection)?
            .execute_batch(sql)
            .with_context(|| format!("While executing:\n{}", quarry_core::truncate_long!(sql)))?;
        Ok(())
    }
}

impl Executor for SqliteConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn Statement + '_>> {
        Ok(Box::new(SqliteStatement::new(lock(&self.connection)?, sql)?))
    }
}

impl Connection for SqliteConnection {
    type Transaction = SqliteTransaction;

    fn connect(url: &str) -> Result<Self> {
        let Some(path) = url.strip_prefix("sqlite://") else {
            return Err(Error::msg(format!(
                "Expected a url starting with `sqlite://`, found `{}`",
                url
            )));
        };
        let connection = if path == ":memory:" {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open_with_flags(
                format!("file:{}", path),
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        }
        .with_context(|| format!("While opening `{}`", url))?;
        log::debug!("Connected to `{}`", url);
        Ok(Self::from_rusqlite(connection))
    }

    fn begin(&mut self) -> Result<Self::Transaction> {
        SqliteTransaction::begin(self.connection.clone())
    }

    fn close(self) -> Result<()> {
        let Ok(mutex) = Arc::try_unwrap(self.connection) else {
            log::warn!("The sqlite connection is still shared, it will close once released");
            return Ok(());
        };
        let connection = mutex
            .into_inner()
            .map_err(|_| Error::msg("The sqlite connection lock is poisoned"))?;
        connection
            .close()
            .map_err(|(_, e)| e)
            .context("While closing the sqlite connection")?;
        Ok(())
    }
}
