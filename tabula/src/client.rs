use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tabula_backend::{Batch, Connect, DeleteStatus, ListEnd, Store};
use tracing::trace;

use crate::{Error, RetryPolicy};

/// Expiry applied by the `*_with_ttl` operations when none is given.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Typed access to JSON hash and list tables.
///
/// The client owns one store connection for its whole life. Operations take
/// `&mut self`; share a client between tasks only behind your own lock.
///
/// Multi-item writes and deletes are sent as one best-effort [`Batch`]:
/// a failure part way through may leave some of the batch applied.
pub struct TableClient<S> {
    store: S,
    default_ttl: Duration,
}

impl<S: Store> TableClient<S> {
    /// Connects through `connector`, retrying failed attempts per `policy`.
    ///
    /// The task sleeps between attempts. Once the retry budget is spent the
    /// last connection error is returned as [`Error::Connection`].
    pub async fn connect<C>(connector: &C, policy: &RetryPolicy) -> Result<Self, Error>
    where
        C: Connect<Store = S>,
    {
        let store = policy.connect(connector).await.map_err(Error::Connection)?;
        Ok(Self::from_store(store))
    }

    /// Wraps an already connected store.
    pub fn from_store(store: S) -> Self {
        Self {
            store,
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Set the expiry used when a `*_with_ttl` call passes `None`.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Reads every value of a hash table.
    ///
    /// Values come in the order the store enumerates the fields, which is
    /// not guaranteed to be stable. A missing table reads as empty.
    pub async fn read_hash<T: DeserializeOwned>(&mut self, table: &str) -> Result<Vec<T>, Error> {
        let entries = self.hash_entries(table).await?;
        entries
            .iter()
            .map(|(_, value)| decode(table, value))
            .collect()
    }

    /// Reads every `(field, value)` pair of a hash table.
    pub async fn read_hash_entries<T: DeserializeOwned>(
        &mut self,
        table: &str,
    ) -> Result<Vec<(String, T)>, Error> {
        let entries = self.hash_entries(table).await?;
        entries
            .into_iter()
            .map(|(field, value)| Ok((field, decode(table, &value)?)))
            .collect()
    }

    /// Reads a list table front to back.
    ///
    /// Lists are written by prepending, so the newest value comes first.
    pub async fn read_list<T: DeserializeOwned>(&mut self, table: &str) -> Result<Vec<T>, Error> {
        trace!(table, store = self.store.label(), "Read list");
        let values = self
            .store
            .list_values(table)
            .await
            .map_err(|source| Error::store(table, source))?;
        values.iter().map(|value| decode(table, value)).collect()
    }

    /// Sets each `field → value` pair in the table's hash map.
    ///
    /// Fields with the same name are overwritten; other fields are left as
    /// they are.
    pub async fn write_hash<I, K, V>(&mut self, table: &str, data: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        let batch = hash_batch(table, data, None)?;
        self.execute(batch).await
    }

    /// Like [`write_hash`](Self::write_hash), refreshing the table's expiry
    /// after every field.
    ///
    /// `None` uses the client's default TTL ([`DEFAULT_TTL`] unless changed
    /// with [`with_default_ttl`](Self::with_default_ttl)). The store keeps
    /// expiries in whole seconds, so a fractional TTL is rounded up: 500 ms
    /// keeps the table for one second. A zero TTL deletes the table.
    pub async fn write_hash_with_ttl<I, K, V>(
        &mut self,
        table: &str,
        data: I,
        ttl: Option<Duration>,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        let ttl = whole_seconds(ttl.unwrap_or(self.default_ttl));
        let batch = hash_batch(table, data, Some(ttl))?;
        self.execute(batch).await
    }

    /// Prepends each value to the table's list.
    ///
    /// Every value is pushed to the front in input order, so reading the
    /// list back yields the input reversed.
    pub async fn write_list<I, V>(&mut self, table: &str, values: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = V>,
        V: Serialize,
    {
        let batch = list_batch(table, values, None)?;
        self.execute(batch).await
    }

    /// Like [`write_list`](Self::write_list), refreshing the table's expiry
    /// after every push.
    ///
    /// TTLs are handled as in [`write_hash_with_ttl`](Self::write_hash_with_ttl):
    /// `None` means the default, fractions round up to the next second, and
    /// zero deletes the table.
    pub async fn write_list_with_ttl<I, V>(
        &mut self,
        table: &str,
        values: I,
        ttl: Option<Duration>,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = V>,
        V: Serialize,
    {
        let ttl = whole_seconds(ttl.unwrap_or(self.default_ttl));
        let batch = list_batch(table, values, Some(ttl))?;
        self.execute(batch).await
    }

    /// Removes one field from a hash table.
    ///
    /// Removing the last field makes the store drop the table itself.
    pub async fn delete_hash_field(&mut self, table: &str, field: &str) -> Result<(), Error> {
        let mut batch = Batch::new(table);
        batch.hash_delete(field);
        self.execute(batch).await
    }

    /// Removes several fields from a hash table in one round trip.
    pub async fn delete_hash_fields<I, K>(&mut self, table: &str, fields: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut batch = Batch::new(table);
        for field in fields {
            batch.hash_delete(field);
        }
        self.execute(batch).await
    }

    /// Removes and returns one element of a list table.
    ///
    /// [`ListEnd::Front`] (the default) returns the most recently written
    /// value. `None` means the list is empty or missing.
    pub async fn pop_list_element<T: DeserializeOwned>(
        &mut self,
        table: &str,
        end: ListEnd,
    ) -> Result<Option<T>, Error> {
        trace!(table, ?end, store = self.store.label(), "Pop list element");
        let value = self
            .store
            .pop(table, end)
            .await
            .map_err(|source| Error::store(table, source))?;
        value.map(|value| decode(table, &value)).transpose()
    }

    /// Deletes a table with all its content.
    pub async fn delete_table(&mut self, table: &str) -> Result<DeleteStatus, Error> {
        trace!(table, store = self.store.label(), "Delete table");
        self.store
            .remove(table)
            .await
            .map_err(|source| Error::store(table, source))
    }

    async fn hash_entries(&mut self, table: &str) -> Result<Vec<(String, String)>, Error> {
        trace!(table, store = self.store.label(), "Read hash");
        self.store
            .hash_entries(table)
            .await
            .map_err(|source| Error::store(table, source))
    }

    async fn execute(&mut self, batch: Batch) -> Result<(), Error> {
        if batch.is_empty() {
            return Ok(());
        }
        trace!(
            table = batch.table(),
            ops = batch.len(),
            store = self.store.label(),
            "Execute batch"
        );
        self.store
            .execute(&batch)
            .await
            .map_err(|source| Error::store(batch.table(), source))
    }
}

/// Rounds `ttl` up to the next whole second.
fn whole_seconds(ttl: Duration) -> Duration {
    if ttl.subsec_nanos() == 0 {
        ttl
    } else {
        Duration::from_secs(ttl.as_secs().saturating_add(1))
    }
}

fn encode<V: Serialize>(table: &str, value: &V) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|source| Error::Encode {
        table: table.to_owned(),
        source,
    })
}

fn decode<T: DeserializeOwned>(table: &str, value: &str) -> Result<T, Error> {
    serde_json::from_str(value).map_err(|source| Error::Decode {
        table: table.to_owned(),
        source,
    })
}

fn hash_batch<I, K, V>(table: &str, data: I, ttl: Option<Duration>) -> Result<Batch, Error>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Serialize,
{
    let mut batch = Batch::new(table);
    for (field, value) in data {
        batch.hash_set(field, encode(table, &value)?);
        if let Some(ttl) = ttl {
            batch.expire(ttl);
        }
    }
    Ok(batch)
}

fn list_batch<I, V>(table: &str, values: I, ttl: Option<Duration>) -> Result<Batch, Error>
where
    I: IntoIterator<Item = V>,
    V: Serialize,
{
    let mut batch = Batch::new(table);
    for value in values {
        batch.list_push(encode(table, &value)?);
        if let Some(ttl) = ttl {
            batch.expire(ttl);
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use tabula_backend::BatchOp;

    #[test]
    fn test_hash_batch_expires_after_each_field() {
        let data = BTreeMap::from([("a", 1), ("b", 2)]);
        let batch = hash_batch("counts", data, Some(Duration::from_secs(30))).unwrap();
        let ttl = Duration::from_secs(30);
        assert_eq!(
            batch.ops(),
            &[
                BatchOp::HashSet {
                    field: "a".to_owned(),
                    value: "1".to_owned()
                },
                BatchOp::Expire { ttl },
                BatchOp::HashSet {
                    field: "b".to_owned(),
                    value: "2".to_owned()
                },
                BatchOp::Expire { ttl },
            ]
        );
    }

    #[test]
    fn test_fractional_ttl_rounds_up() {
        assert_eq!(
            whole_seconds(Duration::from_millis(500)),
            Duration::from_secs(1)
        );
        assert_eq!(
            whole_seconds(Duration::from_millis(2001)),
            Duration::from_secs(3)
        );
        assert_eq!(whole_seconds(Duration::from_secs(5)), Duration::from_secs(5));
        assert_eq!(whole_seconds(Duration::ZERO), Duration::ZERO);
        assert_eq!(
            whole_seconds(Duration::new(u64::MAX, 1)),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_list_batch_without_ttl() {
        let batch = list_batch("tasks", ["x", "y"], None).unwrap();
        assert_eq!(
            batch.ops(),
            &[
                BatchOp::ListPush {
                    value: "\"x\"".to_owned()
                },
                BatchOp::ListPush {
                    value: "\"y\"".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_unencodable_value_fails_before_sending() {
        let mut bad_key_map = BTreeMap::new();
        bad_key_map.insert(vec![1u8], "value");
        let error = list_batch("tasks", [bad_key_map], None).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Encode);
        assert_eq!(error.table(), Some("tasks"));
    }
}
