//! Suite against a real Redis.
//!
//! Uses `REDIS_URL` (single server) or `REDIS_CLUSTER_NODES`
//! (`host:port,host:port`) when set; otherwise the single-server test starts
//! a Redis container. Run with `cargo test -- --ignored`.

use std::env;

use tabula::{ErrorKind, RetryPolicy, TableClient};
use tabula_redis::{ConnectionMode, RedisConnector, RedisStore, SeedNode};
use tabula_test::suite::run_table_tests;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::{REDIS_PORT, Redis};

fn connector(mode: ConnectionMode) -> RedisConnector {
    RedisStore::builder()
        .connection(mode)
        .build()
        .expect("valid redis settings")
}

#[tokio::test]
#[ignore = "requires docker or REDIS_URL"]
async fn test_redis_single_suite() {
    let (url, _container) = match env::var("REDIS_URL") {
        Ok(url) => (url, None),
        Err(_) => {
            let container = Redis::default()
                .start()
                .await
                .expect("failed to start redis container");
            let host = container.get_host().await.expect("container host");
            let port = container
                .get_host_port_ipv4(REDIS_PORT)
                .await
                .expect("container port");
            (format!("redis://{host}:{port}/"), Some(container))
        }
    };

    let connector = connector(ConnectionMode::single(url));
    let mut client = TableClient::connect(&connector, &RetryPolicy::default())
        .await
        .expect("redis connects");

    run_table_tests(&mut client, "tabula-test:single").await;
}

#[tokio::test]
#[ignore = "requires REDIS_CLUSTER_NODES"]
async fn test_redis_cluster_suite() {
    let nodes = env::var("REDIS_CLUSTER_NODES").expect("REDIS_CLUSTER_NODES is not set");
    let nodes = nodes
        .split(',')
        .filter_map(|node| {
            let (host, port) = node.trim().rsplit_once(':')?;
            Some(SeedNode::new(host, port.parse().ok()?))
        })
        .collect::<Vec<_>>();

    let connector = connector(ConnectionMode::cluster(nodes));
    let mut client = TableClient::connect(&connector, &RetryPolicy::default())
        .await
        .expect("redis cluster connects");

    run_table_tests(&mut client, "tabula-test:cluster").await;
}

#[tokio::test]
async fn test_closed_port_is_connection_error() {
    let connector = connector(ConnectionMode::single("redis://127.0.0.1:1/"));
    let result = TableClient::connect(&connector, &RetryPolicy::no_retry()).await;

    assert_eq!(
        result.err().map(|error| error.kind()),
        Some(ErrorKind::Connection)
    );
}
