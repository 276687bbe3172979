use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use indexmap::IndexMap;
use tabula_backend::{BackendResult, Batch, BatchOp, Connect, DeleteStatus, ListEnd, Store};
use tokio::time::Instant;
use tracing::trace;

use crate::MemoryError;

enum Value {
    Hash(IndexMap<String, String>),
    List(VecDeque<String>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }

    fn is_empty(&self) -> bool {
        match &self.value {
            Value::Hash(map) => map.is_empty(),
            Value::List(list) => list.is_empty(),
        }
    }
}

type Keyspace = Arc<DashMap<String, Entry>>;

/// Hands out [`MemoryStore`]s sharing one keyspace.
///
/// Stores created by the same connector (or its clones) see each other's
/// writes, the way clients of one server do.
#[derive(Clone)]
pub struct MemoryConnector {
    keyspace: Keyspace,
    reachable: bool,
    label: String,
}

impl MemoryConnector {
    /// Creates a connector over a new, empty keyspace.
    pub fn new() -> Self {
        Self {
            keyspace: Arc::new(DashMap::new()),
            reachable: true,
            label: "memory".to_owned(),
        }
    }

    /// Creates a connector whose every connection attempt fails with a
    /// connection error.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    /// Set a custom label, reported in tracing output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns `true` if `table` exists and has not expired.
    pub fn contains_table(&self, table: &str) -> bool {
        self.keyspace
            .get(table)
            .is_some_and(|entry| !entry.is_expired(Instant::now()))
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connect for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self) -> BackendResult<MemoryStore> {
        if !self.reachable {
            return Err(MemoryError::Unreachable.into());
        }
        Ok(MemoryStore {
            keyspace: self.keyspace.clone(),
            label: self.label.clone(),
        })
    }
}

/// In-process [`Store`].
///
/// Expiry is checked lazily on access against [`tokio::time::Instant`], so
/// a paused tokio clock controls it in tests.
pub struct MemoryStore {
    keyspace: Keyspace,
    label: String,
}

impl MemoryStore {
    fn purge_expired(&self, table: &str) {
        let now = Instant::now();
        self.keyspace
            .remove_if(table, |_, entry| entry.is_expired(now));
    }

    fn remove_if_empty(&self, table: &str) {
        self.keyspace.remove_if(table, |_, entry| entry.is_empty());
    }

    fn wrong_type(table: &str) -> MemoryError {
        MemoryError::WrongType {
            table: table.to_owned(),
        }
    }

    fn hash_set(&self, table: &str, field: &str, value: &str) -> Result<(), MemoryError> {
        match self.keyspace.entry(table.to_owned()) {
            MapEntry::Occupied(mut occupied) => match &mut occupied.get_mut().value {
                Value::Hash(map) => {
                    map.insert(field.to_owned(), value.to_owned());
                    Ok(())
                }
                Value::List(_) => Err(Self::wrong_type(table)),
            },
            MapEntry::Vacant(vacant) => {
                let map = IndexMap::from([(field.to_owned(), value.to_owned())]);
                vacant.insert(Entry::new(Value::Hash(map)));
                Ok(())
            }
        }
    }

    fn hash_delete(&self, table: &str, field: &str) -> Result<(), MemoryError> {
        if let Some(mut entry) = self.keyspace.get_mut(table) {
            match &mut entry.value {
                Value::Hash(map) => {
                    map.shift_remove(field);
                }
                Value::List(_) => return Err(Self::wrong_type(table)),
            }
        }
        self.remove_if_empty(table);
        Ok(())
    }

    fn list_push(&self, table: &str, value: &str) -> Result<(), MemoryError> {
        match self.keyspace.entry(table.to_owned()) {
            MapEntry::Occupied(mut occupied) => match &mut occupied.get_mut().value {
                Value::List(list) => {
                    list.push_front(value.to_owned());
                    Ok(())
                }
                Value::Hash(_) => Err(Self::wrong_type(table)),
            },
            MapEntry::Vacant(vacant) => {
                let list = VecDeque::from([value.to_owned()]);
                vacant.insert(Entry::new(Value::List(list)));
                Ok(())
            }
        }
    }

    fn expire(&self, table: &str, ttl: Duration) -> Result<(), MemoryError> {
        if ttl.as_secs() == 0 {
            self.keyspace.remove(table);
            return Ok(());
        }
        let deadline = Instant::now()
            .checked_add(Duration::from_secs(ttl.as_secs()))
            .ok_or_else(|| MemoryError::InvalidExpire {
                table: table.to_owned(),
            })?;
        if let Some(mut entry) = self.keyspace.get_mut(table) {
            entry.expires_at = Some(deadline);
        }
        Ok(())
    }

    fn apply(&self, table: &str, op: &BatchOp) -> Result<(), MemoryError> {
        self.purge_expired(table);
        match op {
            BatchOp::HashSet { field, value } => self.hash_set(table, field, value),
            BatchOp::HashDelete { field } => self.hash_delete(table, field),
            BatchOp::ListPush { value } => self.list_push(table, value),
            BatchOp::Expire { ttl } => self.expire(table, *ttl),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn hash_entries(&mut self, table: &str) -> BackendResult<Vec<(String, String)>> {
        trace!(table, "HGETALL");
        self.purge_expired(table);
        let Some(entry) = self.keyspace.get(table) else {
            return Ok(Vec::new());
        };
        match &entry.value {
            Value::Hash(map) => Ok(map
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect()),
            Value::List(_) => Err(Self::wrong_type(table).into()),
        }
    }

    async fn list_values(&mut self, table: &str) -> BackendResult<Vec<String>> {
        trace!(table, "LRANGE");
        self.purge_expired(table);
        let Some(entry) = self.keyspace.get(table) else {
            return Ok(Vec::new());
        };
        match &entry.value {
            Value::List(list) => Ok(list.iter().cloned().collect()),
            Value::Hash(_) => Err(Self::wrong_type(table).into()),
        }
    }

    /// Applies every command in order. A failing command does not stop the
    /// ones after it; the first failure is returned.
    async fn execute(&mut self, batch: &Batch) -> BackendResult<()> {
        trace!(table = batch.table(), ops = batch.len(), "Execute pipeline");
        let mut first_error = None;
        for op in batch.ops() {
            if let Err(error) = self.apply(batch.table(), op) {
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    async fn pop(&mut self, table: &str, end: ListEnd) -> BackendResult<Option<String>> {
        trace!(table, ?end, "POP");
        self.purge_expired(table);
        let popped = match self.keyspace.get_mut(table) {
            Some(mut entry) => match &mut entry.value {
                Value::List(list) => match end {
                    ListEnd::Front => list.pop_front(),
                    ListEnd::Back => list.pop_back(),
                },
                Value::Hash(_) => return Err(Self::wrong_type(table).into()),
            },
            None => None,
        };
        self.remove_if_empty(table);
        Ok(popped)
    }

    async fn remove(&mut self, table: &str) -> BackendResult<DeleteStatus> {
        trace!(table, "DEL");
        self.purge_expired(table);
        match self.keyspace.remove(table) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}
