use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_saphyr::Error),

    /// The backend is configured but its crate feature is disabled.
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("invalid backend configuration: {0}")]
    InvalidBackend(String),

    #[error(transparent)]
    Client(#[from] tabula::Error),
}
