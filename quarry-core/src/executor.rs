use crate::{Result, Rows, RowsAffected, Value};

/// A statement prepared by a driver, ready to be run with positional arguments.
///
/// Driver resources tied to the statement are released when it is dropped.
pub trait Statement {
    /// Runs the statement and returns the rows it produced.
    fn query(&mut self, args: &[Value]) -> Result<Rows>;
    /// Runs the statement and returns the number of rows it changed.
    fn execute(&mut self, args: &[Value]) -> Result<RowsAffected>;
}

/// Something statements can be sent to: a plain connection or an open transaction.
pub trait Executor {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn Statement + '_>>;

    /// Execute the query and returns the rows.
    fn fetch(&mut self, sql: &str, args: &[Value]) -> Result<Rows> {
        self.prepare(sql)?.query(args)
    }

    /// Execute the query and return the total number of rows affected.
    fn execute(&mut self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.prepare(sql)?.execute(args)
    }
}
