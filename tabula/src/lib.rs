//! JSON tables on top of a key-value store.
//!
//! A *table* is a named key holding either a hash map (field → JSON value)
//! or a list of JSON values. [`TableClient`] owns one store connection and
//! exposes typed read, write and delete operations; every multi-item
//! operation is sent as a single non-transactional pipeline.
//!
//! ```
//! use serde_json::json;
//! use tabula::{ListEnd, RetryPolicy, TableClient};
//! use tabula_memory::MemoryConnector;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), tabula::Error> {
//! let connector = MemoryConnector::new();
//! let mut client = TableClient::connect(&connector, &RetryPolicy::default()).await?;
//!
//! client
//!     .write_hash("domains", [("example.com", json!({"ns": ["a", "b"]}))])
//!     .await?;
//! let domains: Vec<serde_json::Value> = client.read_hash("domains").await?;
//! assert_eq!(domains, [json!({"ns": ["a", "b"]})]);
//!
//! client.write_list("tasks", [json!(1), json!(2)]).await?;
//! let newest: Option<i64> = client.pop_list_element("tasks", ListEnd::Front).await?;
//! assert_eq!(newest, Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! Stores live in their own crates: `tabula-redis` for Redis and Redis
//! Cluster, `tabula-memory` for an in-process store.

mod client;
mod error;
mod retry;

pub use client::{DEFAULT_TTL, TableClient};
pub use error::{Error, ErrorKind};
pub use retry::RetryPolicy;

pub use tabula_backend::{
    BackendError, BackendResult, Batch, BatchOp, Connect, DeleteStatus, ListEnd, Store,
};
