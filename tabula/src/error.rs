//! Error taxonomy of table operations.

use tabula_backend::BackendError;
use thiserror::Error;

/// Error type for [`TableClient`](crate::TableClient) operations.
///
/// Errors are never swallowed or retried by the client (connection
/// establishment aside); each one reaches the caller with its source
/// attached.
#[derive(Debug, Error)]
pub enum Error {
    /// The store could not be reached within the retry budget, or the
    /// connection settings were rejected.
    #[error("failed to connect to store: {0}")]
    Connection(#[source] BackendError),

    /// The store reported a failure while running an operation.
    #[error("store operation on table '{table}' failed: {source}")]
    Store {
        table: String,
        #[source]
        source: BackendError,
    },

    /// A stored value is not valid JSON for the requested type.
    #[error("table '{table}' holds a value that cannot be decoded: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value handed to a write operation cannot be encoded as JSON.
    #[error("value for table '{table}' cannot be encoded: {source}")]
    Encode {
        table: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Category of an [`Error`], for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Store,
    Decode,
    Encode,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::Connection,
            Self::Store { .. } => ErrorKind::Store,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Encode { .. } => ErrorKind::Encode,
        }
    }

    /// Table the failed operation targeted, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Connection(_) => None,
            Self::Store { table, .. } | Self::Decode { table, .. } | Self::Encode { table, .. } => {
                Some(table)
            }
        }
    }

    pub(crate) fn store(table: &str, source: BackendError) -> Self {
        Self::Store {
            table: table.to_owned(),
            source,
        }
    }
}
