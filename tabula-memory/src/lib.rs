//! In-process store for tabula tables.
//!
//! Emulates the parts of Redis the helper relies on: hash and list values,
//! removal of emptied keys, `EXPIRE` and wrong-type errors. Useful for local
//! runs and for tests that should not need a server.
#![warn(missing_docs)]

mod backend;
mod error;

pub use backend::{MemoryConnector, MemoryStore};
pub use error::MemoryError;
