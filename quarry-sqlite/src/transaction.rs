use crate::{Shared, SqliteStatement, lock};
use anyhow::Context;
use quarry_core::{Executor, Result, Statement, Transaction};

/// A transaction on a [`SqliteConnection`](crate::SqliteConnection), rolled back when dropped
/// before commit.
pub struct SqliteTransaction {
    connection: Shared,
    done: bool,
}

impl SqliteTransaction {
    pub(crate) fn begin(connection: Shared) -> Result<Self> {
        lock(&connection)?
            .execute_batch("BEGIN;")
            .context("While starting the transaction")?;
        Ok(Self {
            connection,
            done: false,
        })
    }

    fn finish(mut self, sql: &str) -> Result<()> {
        let result = lock(&self.connection)?
            .execute_batch(sql)
            .with_context(|| format!("While running `{}`", sql));
        self.done = result.is_ok();
        result?;
        Ok(())
    }
}

impl Executor for SqliteTransaction {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn Statement + '_>> {
        Ok(Box::new(SqliteStatement::new(lock(&self.connection)?, sql)?))
    }
}

impl Transaction for SqliteTransaction {
    fn commit(self) -> Result<()> {
        self.finish("COMMIT;")
    }

    fn rollback(self) -> Result<()> {
        self.finish("ROLLBACK;")
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        log::debug!("Rolling back an unfinished transaction");
        match lock(&self.connection) {
            Ok(connection) => {
                if let Err(e) = connection.execute_batch("ROLLBACK;") {
                    log::error!("While rolling back the transaction: {}", e);
                }
            }
            Err(e) => log::error!("{}", e),
        }
    }
}
