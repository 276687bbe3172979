use tabula::{RetryPolicy, TableClient};
use tabula_memory::MemoryConnector;
use tabula_test::suite::run_table_tests;

#[tokio::test(start_paused = true)]
async fn test_memory_store_suite() {
    let connector = MemoryConnector::new();
    let mut client = TableClient::connect(&connector, &RetryPolicy::no_retry())
        .await
        .expect("memory store connects");

    run_table_tests(&mut client, "tabula-test").await;
}

#[tokio::test(start_paused = true)]
async fn test_clients_share_keyspace() {
    let connector = MemoryConnector::new();
    let mut writer = TableClient::connect(&connector, &RetryPolicy::no_retry())
        .await
        .expect("memory store connects");
    let mut reader = TableClient::connect(&connector, &RetryPolicy::no_retry())
        .await
        .expect("memory store connects");

    writer
        .write_list("shared", ["first", "second"])
        .await
        .expect("failed to write");
    let values: Vec<String> = reader.read_list("shared").await.expect("failed to read");

    assert_eq!(values, ["second", "first"]);
}
