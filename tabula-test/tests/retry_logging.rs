use std::time::Duration;

use pretty_assertions::assert_eq;
use tabula::{ErrorKind, RetryPolicy, TableClient};
use tabula_memory::MemoryConnector;
use tabula_test::tracing::EventCollector;
use tracing::Level;

#[tokio::test(start_paused = true)]
async fn test_each_retry_logs_a_warning() {
    let collector = EventCollector::new();
    let _guard = collector.set_default();

    let result = TableClient::connect(&MemoryConnector::unreachable(), &RetryPolicy::default()).await;
    assert_eq!(result.err().map(|error| error.kind()), Some(ErrorKind::Connection));

    let warnings = collector.at_level(Level::WARN);
    let attempts = warnings
        .iter()
        .map(|event| event.field("attempt").unwrap_or_default().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(attempts, ["1", "2", "3", "4"]);
    assert!(
        warnings
            .iter()
            .all(|event| event.message == "Store connection failed, retrying")
    );
}

#[tokio::test(start_paused = true)]
async fn test_successful_connect_logs_no_warning() {
    let collector = EventCollector::new();
    let _guard = collector.set_default();

    let policy = RetryPolicy::new(
        Duration::from_secs(2),
        Duration::from_secs(5),
        Duration::from_secs(20),
    );
    let client = TableClient::connect(&MemoryConnector::new(), &policy).await;

    assert!(client.is_ok());
    assert!(collector.at_level(Level::WARN).is_empty());
}
