mod connection;
mod dialect;
mod extract;
mod prepared;
mod transaction;

pub use connection::*;
pub use dialect::*;
pub use prepared::*;
pub use transaction::*;

use quarry_core::{Error, Result};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) type Shared = Arc<Mutex<Connection>>;

pub(crate) fn lock(shared: &Shared) -> Result<MutexGuard<'_, Connection>> {
    shared
        .lock()
        .map_err(|_| Error::msg("The sqlite connection lock is poisoned"))
}
