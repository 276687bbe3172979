use tabula_backend::BackendError;

/// Error type for the in-process store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The command does not match the kind of value held by the table.
    #[error("WRONGTYPE operation against table '{table}' holding the wrong kind of value")]
    WrongType {
        /// Table the command targeted.
        table: String,
    },

    /// The expiry lies beyond what the clock can represent.
    #[error("invalid expire time for table '{table}'")]
    InvalidExpire {
        /// Table the command targeted.
        table: String,
    },

    /// The connector was created with [`MemoryConnector::unreachable`].
    ///
    /// [`MemoryConnector::unreachable`]: crate::MemoryConnector::unreachable
    #[error("memory store is unreachable")]
    Unreachable,
}

impl From<MemoryError> for BackendError {
    fn from(error: MemoryError) -> Self {
        match error {
            MemoryError::WrongType { .. } | MemoryError::InvalidExpire { .. } => {
                Self::InternalError(Box::new(error))
            }
            MemoryError::Unreachable => Self::ConnectionError(Box::new(error)),
        }
    }
}
