//! Error types for store operations.

use thiserror::Error;

/// Error type for store operations.
///
/// This enum categorizes errors that can occur during store interactions
/// into distinct groups for appropriate handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The store answered, but the command failed.
    ///
    /// Wrong-type access, protocol errors, script errors and anything else
    /// not bound to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring while reaching the store: refused connections,
    /// broken pipes, timeouts, cluster nodes that cannot be discovered.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// The store could not be configured from the supplied settings.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// Returns `true` if the error comes from failing to reach the store.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_errors_are_connection() {
        let error = BackendError::ConnectionError("refused".into());
        assert!(error.is_connection());
        let error = BackendError::InternalError("WRONGTYPE".into());
        assert!(!error.is_connection());
        assert!(!BackendError::InvalidConfig("no nodes".to_owned()).is_connection());
    }
}
