use async_trait::async_trait;

use crate::{BackendError, Batch, DeleteStatus, ListEnd};

pub type BackendResult<T> = Result<T, BackendError>;

/// Raw access to a key-value store holding hash and list tables.
///
/// Values cross this trait as the JSON text stored in the table; encoding
/// and decoding is done by the caller. Every method takes `&mut self`
/// because a store owns exactly one connection and callers sharing it must
/// serialize access.
#[async_trait]
pub trait Store: Send {
    /// Returns `(field, value)` pairs of the table's hash map in the order
    /// the store enumerates them (`HGETALL`).
    ///
    /// A missing table reads as an empty map.
    async fn hash_entries(&mut self, table: &str) -> BackendResult<Vec<(String, String)>>;

    /// Returns the table's list from front to back (`LRANGE 0 -1`).
    ///
    /// A missing table reads as an empty list.
    async fn list_values(&mut self, table: &str) -> BackendResult<Vec<String>>;

    /// Sends every command of `batch` in one non-transactional round trip.
    ///
    /// See [`Batch`] for the partial-failure behaviour.
    async fn execute(&mut self, batch: &Batch) -> BackendResult<()>;

    /// Removes and returns one element from the chosen end of the list.
    async fn pop(&mut self, table: &str, end: ListEnd) -> BackendResult<Option<String>>;

    /// Deletes the table with all its content (`DEL`).
    async fn remove(&mut self, table: &str) -> BackendResult<DeleteStatus>;

    /// Returns the label of this store, used in tracing output.
    fn label(&self) -> &str {
        "store"
    }
}

#[async_trait]
impl Store for Box<dyn Store> {
    async fn hash_entries(&mut self, table: &str) -> BackendResult<Vec<(String, String)>> {
        (**self).hash_entries(table).await
    }

    async fn list_values(&mut self, table: &str) -> BackendResult<Vec<String>> {
        (**self).list_values(table).await
    }

    async fn execute(&mut self, batch: &Batch) -> BackendResult<()> {
        (**self).execute(batch).await
    }

    async fn pop(&mut self, table: &str, end: ListEnd) -> BackendResult<Option<String>> {
        (**self).pop(table, end).await
    }

    async fn remove(&mut self, table: &str) -> BackendResult<DeleteStatus> {
        (**self).remove(table).await
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

/// Produces connected [`Store`]s.
///
/// A single call is a single attempt; retrying is left to the caller.
#[async_trait]
pub trait Connect: Send + Sync {
    type Store: Store;

    async fn connect(&self) -> BackendResult<Self::Store>;
}
