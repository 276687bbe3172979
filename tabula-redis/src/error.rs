//! Error types for Redis store operations.
//!
//! All errors can be converted to [`BackendError`] so the helper layer
//! handles every store the same way.
//!
//! [`BackendError`]: tabula_backend::BackendError

use redis::RedisError;
use tabula_backend::BackendError;

/// Error type for Redis store operations.
///
/// # When You'll Encounter This
///
/// - Calling [`RedisStoreBuilder::build`] with an invalid URL, without a
///   connection mode, or with an empty seed node list
/// - Connecting while Redis is unreachable
/// - Running commands the server rejects (for example hash commands on a
///   key holding a list)
///
/// In most cases this error is converted to [`BackendError`] and reaches
/// the caller through `tabula::Error`.
///
/// [`RedisStoreBuilder::build`]: crate::RedisStoreBuilder::build
/// [`BackendError`]: tabula_backend::BackendError
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("Redis store error: {0}")]
    Redis(#[from] RedisError),

    /// Connection mode was not specified when building the store.
    ///
    /// Call [`RedisStoreBuilder::connection`] before [`RedisStoreBuilder::build`].
    ///
    /// [`RedisStoreBuilder::connection`]: crate::RedisStoreBuilder::connection
    /// [`RedisStoreBuilder::build`]: crate::RedisStoreBuilder::build
    #[error("Connection mode not specified. Call .connection() before .build()")]
    MissingConnectionMode,

    /// Cluster mode was selected with no seed nodes.
    #[error("Cluster mode requires at least one seed node")]
    NoSeedNodes,
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        match error {
            Error::Redis(err)
                if err.is_io_error()
                    || err.is_connection_refusal()
                    || err.is_connection_dropped()
                    || err.is_timeout() =>
            {
                Self::ConnectionError(Box::new(err))
            }
            Error::Redis(err) => Self::InternalError(Box::new(err)),
            Error::MissingConnectionMode | Error::NoSeedNodes => {
                Self::InvalidConfig(error.to_string())
            }
        }
    }
}
