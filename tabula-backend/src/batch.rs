//! Best-effort batches of table commands.
//!
//! A [`Batch`] groups the commands of one helper operation so a store can
//! send them in a single round trip. A batch is **not** a transaction:
//! commands are applied one after another, nothing is rolled back, and a
//! failure part way through may leave earlier (and, on a server that keeps
//! going, later) commands applied. Callers that need atomicity must not rely
//! on batches.

use std::time::Duration;

/// A single command inside a [`Batch`].
///
/// JSON encoding happens before the command is queued, so values are the
/// exact text handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Set `field` of the table's hash map (`HSET`).
    HashSet { field: String, value: String },
    /// Remove `field` from the table's hash map (`HDEL`).
    HashDelete { field: String },
    /// Prepend a value to the table's list (`LPUSH`).
    ListPush { value: String },
    /// Set or refresh the table's expiry (`EXPIRE`), whole seconds.
    Expire { ttl: Duration },
}

/// Ordered commands against one table, sent as one non-transactional
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    table: String,
    ops: Vec<BatchOp>,
}

impl Batch {
    /// Creates an empty batch for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ops: Vec::new(),
        }
    }

    /// Queues `HSET table field value`.
    pub fn hash_set(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::HashSet {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Queues `HDEL table field`.
    pub fn hash_delete(&mut self, field: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::HashDelete {
            field: field.into(),
        });
        self
    }

    /// Queues `LPUSH table value`.
    pub fn list_push(&mut self, value: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::ListPush {
            value: value.into(),
        });
        self
    }

    /// Queues `EXPIRE table ttl`.
    ///
    /// Sub-second precision is dropped; a TTL below one second expires the
    /// table immediately.
    pub fn expire(&mut self, ttl: Duration) -> &mut Self {
        self.ops.push(BatchOp::Expire { ttl });
        self
    }

    /// Table every command in this batch targets.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Queued commands, in send order.
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_keep_insertion_order() {
        let mut batch = Batch::new("domains");
        batch
            .hash_set("a.example", "{}")
            .expire(Duration::from_secs(60))
            .hash_delete("b.example");

        assert_eq!(batch.table(), "domains");
        assert_eq!(
            batch.ops(),
            &[
                BatchOp::HashSet {
                    field: "a.example".to_owned(),
                    value: "{}".to_owned(),
                },
                BatchOp::Expire {
                    ttl: Duration::from_secs(60)
                },
                BatchOp::HashDelete {
                    field: "b.example".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_new_batch_is_empty() {
        let batch = Batch::new("tasks");
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
