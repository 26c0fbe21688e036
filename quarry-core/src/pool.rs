use crate::{Connection, Dialect, Result, Session};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;

/// Number of idle connections a [`Pool`] keeps by default.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Bounded free list of idle connections.
///
/// Checking out never blocks: an empty pool yields nothing and the caller opens a new
/// connection. Returning a connection to a full pool closes it.
pub struct Pool<C: Connection> {
    sender: Sender<C>,
    receiver: Receiver<C>,
    capacity: usize,
}

impl<C: Connection> Pool<C> {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Takes an idle connection, if any.
    pub fn get_free(&self) -> Option<C> {
        self.receiver.try_recv().ok()
    }

    /// Keeps `connection` for later use, or closes it when the pool is full.
    pub fn put(&self, connection: C) -> Result<()> {
        match self.sender.try_send(connection) {
            Ok(()) => {
                log::debug!("Connection returned to the pool ({}/{})", self.len(), self.capacity);
                Ok(())
            }
            Err(TrySendError::Full(connection)) | Err(TrySendError::Disconnected(connection)) => {
                log::debug!("The pool is full, closing the connection");
                connection.close()
            }
        }
    }

    /// Opens a session on an idle connection, or on a new one connected to `url`. The session
    /// gives its connection back to this pool when closed.
    pub fn session(self: &Arc<Self>, url: &str, dialect: Arc<dyn Dialect>) -> Result<Session<C>> {
        let connection = match self.get_free() {
            Some(connection) => connection,
            None => C::connect(url)?,
        };
        Ok(Session::new(connection, dialect).with_pool(self.clone()))
    }

    /// Idle connections currently held.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Closes every idle connection, returning the first failure.
    pub fn drain(&self) -> Result<()> {
        let mut result = Ok(());
        while let Ok(connection) = self.receiver.try_recv() {
            if let Err(e) = connection.close() {
                log::warn!("While closing a pooled connection: {}", e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

impl<C: Connection> Default for Pool<C> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}
