use std::sync::Arc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure categories surfaced by sessions and backends.
///
/// `Usage` marks a programming mistake (nested transaction, unconstrained
/// update, entity without primary key) and should not be retried or recovered
/// from. `NoRows` is the regular "record absent" outcome of single row lookups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("no rows in result set")]
    NoRows,
    #[error("usage error: {0}")]
    Usage(String),
    #[error("validation failed: {0:#}")]
    Validation(Arc<anyhow::Error>),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("{0:#}")]
    Backend(Arc<anyhow::Error>),
}

impl Error {
    pub fn usage(message: impl Into<String>) -> Self {
        let error = Error::Usage(message.into());
        log::error!("{}", error);
        error
    }
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Backend(Arc::new(anyhow::Error::msg(message.into())))
    }
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Error::NoRows)
    }
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(..))
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Backend(Arc::new(value))
    }
}
