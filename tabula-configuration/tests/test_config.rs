use pretty_assertions::assert_eq;
use serde_json::json;
use tabula::{ErrorKind, Store};
use tabula_configuration::{
    Backend, Config, ConfigError, Memory, Node, Redis, RedisMode, RetryConfig,
};

#[test]
fn test_cluster_config_deserialize() {
    let yaml = r#"
backend:
  type: Redis
  mode: Cluster
  nodes:
    - host: 10.0.0.1
      port: 7000
    - host: 10.0.0.2
      port: 7001
retry:
  baseline_secs: 2
  interval_secs: 5
  budget_secs: 20
default_ttl_secs: 600
"#;

    let config = Config::from_yaml(yaml).expect("failed to deserialize");

    assert_eq!(
        config.backend,
        Backend::Redis(Redis {
            mode: RedisMode::Cluster,
            url: None,
            nodes: vec![
                Node {
                    host: "10.0.0.1".to_string(),
                    port: 7000
                },
                Node {
                    host: "10.0.0.2".to_string(),
                    port: 7001
                },
            ],
            label: None,
        })
    );
    assert_eq!(config.retry, RetryConfig::default());
    assert_eq!(config.default_ttl_secs, 600);
}

#[test]
fn test_defaults_applied() {
    let yaml = r#"
backend:
  type: Redis
  mode: Single
  url: "redis://127.0.0.1:6379/"
"#;

    let config = Config::from_yaml(yaml).expect("failed to deserialize");

    match &config.backend {
        Backend::Redis(redis) => {
            assert_eq!(redis.mode, RedisMode::Single);
            assert_eq!(redis.url.as_deref(), Some("redis://127.0.0.1:6379/"));
        }
        other => panic!("expected Redis backend, got {other:?}"),
    }
    assert_eq!(config.retry, RetryConfig::default());
    assert_eq!(config.default_ttl_secs, 3600);
    assert_eq!(config.retry.to_policy().max_retries(), 4);
}

#[test]
fn test_partial_retry_section() {
    let yaml = r#"
backend:
  type: Memory
retry:
  budget_secs: 7
"#;

    let config = Config::from_yaml(yaml).expect("failed to deserialize");

    assert_eq!(config.backend, Backend::Memory(Memory::default()));
    assert_eq!(
        config.retry,
        RetryConfig {
            baseline_secs: 2,
            interval_secs: 5,
            budget_secs: 7,
        }
    );
    assert_eq!(config.retry.to_policy().max_retries(), 1);
}

#[test]
fn test_unknown_backend_type_fails() {
    let yaml = r#"
backend:
  type: Memcached
"#;

    let result = Config::from_yaml(yaml);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_roundtrip_serialization() {
    let config = Config {
        backend: Backend::Redis(Redis {
            mode: RedisMode::Cluster,
            url: None,
            nodes: vec![Node {
                host: "localhost".to_string(),
                port: 7000,
            }],
            label: Some("sessions".to_string()),
        }),
        retry: RetryConfig::default(),
        default_ttl_secs: 3600,
    };

    let yaml = serde_saphyr::to_string(&config).expect("failed to serialize");
    let deserialized = Config::from_yaml(&yaml).expect("failed to deserialize");

    assert_eq!(config, deserialized);
}

#[test]
fn test_single_mode_without_url_is_invalid() {
    let backend = Backend::Redis(Redis {
        mode: RedisMode::Single,
        url: None,
        nodes: Vec::new(),
        label: None,
    });

    let result = backend.into_connector();
    assert!(matches!(result, Err(ConfigError::InvalidBackend(_))));
}

#[test]
fn test_cluster_mode_without_nodes_is_invalid() {
    let backend = Backend::Redis(Redis {
        mode: RedisMode::Cluster,
        url: None,
        nodes: Vec::new(),
        label: None,
    });

    let result = backend.into_connector();
    assert!(matches!(result, Err(ConfigError::InvalidBackend(_))));
}

#[tokio::test]
async fn test_memory_config_connects() {
    let yaml = r#"
backend:
  type: Memory
  label: local
default_ttl_secs: 60
"#;

    let mut client = Config::from_yaml(yaml)
        .expect("failed to deserialize")
        .connect()
        .await
        .expect("memory store connects");

    assert_eq!(client.store().label(), "local");
    assert_eq!(client.default_ttl().as_secs(), 60);

    client
        .write_hash("domains", [("example.com", json!({"valid": true}))])
        .await
        .expect("write succeeds");
    let values: Vec<serde_json::Value> = client.read_hash("domains").await.expect("read succeeds");
    assert_eq!(values, vec![json!({"valid": true})]);
}

#[tokio::test]
async fn test_unreachable_redis_fails_with_connection_error() {
    let yaml = r#"
backend:
  type: Redis
  mode: Single
  url: "redis://127.0.0.1:1/"
retry:
  baseline_secs: 0
  interval_secs: 1
  budget_secs: 0
"#;

    let result = Config::from_yaml(yaml)
        .expect("failed to deserialize")
        .connect()
        .await;

    match result {
        Err(ConfigError::Client(error)) => assert_eq!(error.kind(), ErrorKind::Connection),
        Err(other) => panic!("expected client error, got {other:?}"),
        Ok(_) => panic!("connection to a closed port must fail"),
    }
}
