use crate::extract::{Param, extract_value};
use anyhow::Context;
use quarry_core::{Result, Row, Rows, RowsAffected, Statement, Value, truncate_long};
use rusqlite::{Connection, params_from_iter};
use std::sync::{Arc, MutexGuard};

/// A statement compiled by SQLite, kept in the connection statement cache.
///
/// The connection stays locked for as long as the statement is alive.
pub struct SqliteStatement<'c> {
    connection: MutexGuard<'c, Connection>,
    sql: String,
}

impl<'c> SqliteStatement<'c> {
    pub(crate) fn new(connection: MutexGuard<'c, Connection>, sql: &str) -> Result<Self> {
        connection
            .prepare_cached(sql)
            .with_context(|| format!("While preparing the query:\n{}", truncate_long!(sql)))?;
        Ok(Self {
            connection,
            sql: sql.to_owned(),
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Statement for SqliteStatement<'_> {
    fn query(&mut self, args: &[Value]) -> Result<Rows> {
        let context = || format!("While running the query:\n{}", truncate_long!(self.sql));
        let mut statement = self
            .connection
            .prepare_cached(&self.sql)
            .with_context(context)?;
        let labels: Arc<[String]> = statement
            .column_names()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect();
        let count = labels.len();
        let mut rows = statement
            .query(params_from_iter(args.iter().map(Param)))
            .with_context(context)?;
        let mut result = Vec::new();
        while let Some(row) = rows.next().with_context(context)? {
            let values = (0..count)
                .map(|i| {
                    row.get_ref(i)
                        .with_context(context)
                        .map_err(Into::into)
                        .and_then(extract_value)
                })
                .collect::<Result<Row>>()?;
            result.push(values);
        }
        Ok(Rows::new(labels, result))
    }

    fn execute(&mut self, args: &[Value]) -> Result<RowsAffected> {
        let context = || format!("While executing the query:\n{}", truncate_long!(self.sql));
        let mut statement = self
            .connection
            .prepare_cached(&self.sql)
            .with_context(context)?;
        let rows_affected = statement
            .execute(params_from_iter(args.iter().map(Param)))
            .with_context(context)?;
        drop(statement);
        let last_affected_id = (rows_affected > 0 && inserts_rows(&self.sql))
            .then(|| self.connection.last_insert_rowid());
        Ok(RowsAffected {
            rows_affected: rows_affected as u64,
            last_affected_id,
        })
    }
}

/// Whether `sql` is an `INSERT` or `REPLACE`, the only statements that set the last rowid.
fn inserts_rows(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    keyword.eq_ignore_ascii_case("INSERT") || keyword.eq_ignore_ascii_case("REPLACE")
}
