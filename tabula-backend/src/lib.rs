//! Traits and types for tabula store interaction.
//!
//! If you want to put tabula tables on top of another key-value store,
//! implement [`Store`] and [`Connect`] for it.
mod batch;
mod error;
mod store;

pub use batch::{Batch, BatchOp};
pub use error::BackendError;
pub use store::{BackendResult, Connect, Store};

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}

/// End of a list an element is popped from.
///
/// Lists are filled by pushing to the front, so popping from the front
/// returns the most recently written element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListEnd {
    /// Head of the list (`LPOP`).
    #[default]
    Front,
    /// Tail of the list (`RPOP`).
    Back,
}
