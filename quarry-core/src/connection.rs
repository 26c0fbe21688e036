use crate::{Executor, Result};

/// A database handle owned by one session at a time.
pub trait Connection: Executor + Send + Sized {
    type Transaction: Transaction;

    /// Opens a new handle to the database at `url`.
    fn connect(url: &str) -> Result<Self>;
    /// Starts a transaction, statements must go through the returned value until it ends.
    fn begin(&mut self) -> Result<Self::Transaction>;
    fn close(self) -> Result<()>;
}

/// An open transaction. Dropping it without calling `commit` rolls it back.
pub trait Transaction: Executor + Send {
    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}
