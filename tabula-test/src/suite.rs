//! Behaviour every store must show through [`TableClient`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tabula::{DeleteStatus, ErrorKind, ListEnd, Store, TableClient};

/// Record shape used by the suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    pub ns: Vec<String>,
    pub valid: bool,
}

impl DomainRecord {
    pub fn new(domain: &str, ns: &[&str]) -> Self {
        Self {
            domain: domain.to_owned(),
            ns: ns.iter().map(|ns| (*ns).to_owned()).collect(),
            valid: true,
        }
    }
}

/// Runs the whole suite against `client`.
///
/// Every table name starts with `prefix`, so the suite can share a server
/// with other data. Tables are deleted before use. The TTL check sleeps a
/// little over two seconds; on a paused tokio clock that is instant.
pub async fn run_table_tests<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    test_hash_round_trip(client, prefix).await;
    test_hash_overwrite(client, prefix).await;
    test_hash_typed_records(client, prefix).await;
    test_list_reversed(client, prefix).await;
    test_pop_drains_list(client, prefix).await;
    test_pop_back(client, prefix).await;
    test_delete_last_field(client, prefix).await;
    test_delete_many_fields(client, prefix).await;
    test_delete_table(client, prefix).await;
    test_mixed_kinds(client, prefix).await;
    test_hash_ttl(client, prefix).await;
    test_list_ttl(client, prefix).await;
}

async fn fresh<S: Store>(client: &mut TableClient<S>, prefix: &str, name: &str) -> String {
    let table = format!("{prefix}:{name}");
    client
        .delete_table(&table)
        .await
        .expect("failed to clean table");
    table
}

async fn test_hash_round_trip<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "hash-round-trip").await;
    let value = json!({"ns": ["ns1.example.com", "ns2.example.com"], "ttl": 300});

    client
        .write_hash(&table, [("example.com", &value)])
        .await
        .expect("failed to write");
    let values: Vec<Value> = client.read_hash(&table).await.expect("failed to read");

    assert_eq!(values, [value], "value should be read back exactly once");
}

async fn test_hash_overwrite<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "hash-overwrite").await;

    client
        .write_hash(&table, [("a", 1), ("b", 2)])
        .await
        .expect("failed to write");
    client
        .write_hash(&table, [("b", 20), ("c", 30)])
        .await
        .expect("failed to write");

    let mut entries: Vec<(String, i64)> = client
        .read_hash_entries(&table)
        .await
        .expect("failed to read");
    entries.sort();
    assert_eq!(
        entries,
        [
            ("a".to_owned(), 1),
            ("b".to_owned(), 20),
            ("c".to_owned(), 30)
        ]
    );
}

async fn test_hash_typed_records<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "hash-typed").await;
    let records = [
        DomainRecord::new("a.example", &["ns1.a.example"]),
        DomainRecord::new("b.example", &["ns1.b.example", "ns2.b.example"]),
    ];

    client
        .write_hash(
            &table,
            records.iter().map(|record| (record.domain.clone(), record)),
        )
        .await
        .expect("failed to write");

    let mut read: Vec<DomainRecord> = client.read_hash(&table).await.expect("failed to read");
    read.sort_by(|a, b| a.domain.cmp(&b.domain));
    assert_eq!(read, records);
}

async fn test_list_reversed<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "list-reversed").await;

    client
        .write_list(&table, ["v1", "v2", "v3"])
        .await
        .expect("failed to write");
    let values: Vec<String> = client.read_list(&table).await.expect("failed to read");

    assert_eq!(values, ["v3", "v2", "v1"], "front push reverses input order");
}

async fn test_pop_drains_list<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "list-drain").await;
    client
        .write_list(&table, [1, 2, 3])
        .await
        .expect("failed to write");

    let mut popped = Vec::new();
    while let Some(value) = client
        .pop_list_element::<i64>(&table, ListEnd::Front)
        .await
        .expect("failed to pop")
    {
        popped.push(value);
    }

    assert_eq!(popped, [3, 2, 1]);
    let values: Vec<i64> = client.read_list(&table).await.expect("failed to read");
    assert!(values.is_empty(), "drained list should read as empty");
}

async fn test_pop_back<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "list-pop-back").await;
    client
        .write_list(&table, [1, 2, 3])
        .await
        .expect("failed to write");

    let oldest: Option<i64> = client
        .pop_list_element(&table, ListEnd::Back)
        .await
        .expect("failed to pop");
    assert_eq!(oldest, Some(1));

    let values: Vec<i64> = client.read_list(&table).await.expect("failed to read");
    assert_eq!(values, [3, 2]);
}

async fn test_delete_last_field<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "hash-last-field").await;
    client
        .write_hash(&table, [("only", json!({}))])
        .await
        .expect("failed to write");

    client
        .delete_hash_field(&table, "only")
        .await
        .expect("failed to delete field");

    let values: Vec<Value> = client.read_hash(&table).await.expect("failed to read");
    assert!(values.is_empty());
    assert_eq!(
        client.delete_table(&table).await.expect("failed to delete"),
        DeleteStatus::Missing,
        "removing the last field should remove the table"
    );
}

async fn test_delete_many_fields<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "hash-delete-many").await;
    client
        .write_hash(&table, [("a", 1), ("b", 2), ("c", 3), ("d", 4)])
        .await
        .expect("failed to write");

    client
        .delete_hash_fields(&table, ["a", "c", "missing"])
        .await
        .expect("failed to delete fields");

    let mut entries: Vec<(String, i64)> = client
        .read_hash_entries(&table)
        .await
        .expect("failed to read");
    entries.sort();
    assert_eq!(entries, [("b".to_owned(), 2), ("d".to_owned(), 4)]);
}

async fn test_delete_table<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "delete-table").await;
    client
        .write_list(&table, [json!(null)])
        .await
        .expect("failed to write");

    assert_eq!(
        client.delete_table(&table).await.expect("failed to delete"),
        DeleteStatus::Deleted(1)
    );
    let values: Vec<Value> = client.read_list(&table).await.expect("failed to read");
    assert!(values.is_empty());
}

async fn test_mixed_kinds<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "mixed-kinds").await;
    client
        .write_list(&table, [1])
        .await
        .expect("failed to write");

    let error = client
        .read_hash::<Value>(&table)
        .await
        .expect_err("hash read of a list must fail");
    assert_eq!(error.kind(), ErrorKind::Store);
    assert_eq!(error.table(), Some(table.as_str()));
}

async fn test_hash_ttl<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "hash-ttl").await;
    client
        .write_hash_with_ttl(&table, [("a", 1)], Some(Duration::from_secs(1)))
        .await
        .expect("failed to write");

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let values: Vec<Value> = client.read_hash(&table).await.expect("failed to read");
    assert!(values.is_empty(), "table should be gone after its TTL");
}

async fn test_list_ttl<S: Store>(client: &mut TableClient<S>, prefix: &str) {
    let table = fresh(client, prefix, "list-ttl").await;
    client
        .write_list_with_ttl(&table, [1, 2], Some(Duration::from_secs(1)))
        .await
        .expect("failed to write");
    let values: Vec<i64> = client.read_list(&table).await.expect("failed to read");
    assert_eq!(values, [2, 1]);

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let values: Vec<i64> = client.read_list(&table).await.expect("failed to read");
    assert!(values.is_empty(), "table should be gone after its TTL");
}
