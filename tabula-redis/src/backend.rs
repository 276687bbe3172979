//! Redis store implementation.

use std::fmt;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, Cmd, FromRedisValue, Pipeline, RedisResult};
use tabula_backend::{BackendResult, Batch, BatchOp, Connect, DeleteStatus, ListEnd, Store};
use tracing::{debug, trace};

#[cfg(feature = "cluster")]
use redis::cluster::ClusterClient;
#[cfg(feature = "cluster")]
use redis::cluster_async::ClusterConnection;

use crate::error::Error;

/// Host/port pair of a Redis node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedNode {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl SeedNode {
    /// Creates a node address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Connection URL of this node.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

impl fmt::Display for SeedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Connection settings for a single Redis server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleConfig {
    url: String,
}

impl SingleConfig {
    /// Creates settings from a connection URL such as `redis://127.0.0.1/`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Connection settings for a Redis Cluster.
///
/// Seed nodes are only used to discover the cluster topology; routing of
/// each command is handled by the `redis` crate.
#[cfg(feature = "cluster")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    nodes: Vec<SeedNode>,
}

#[cfg(feature = "cluster")]
impl ClusterConfig {
    /// Creates settings from the cluster's seed nodes.
    pub fn new(nodes: impl IntoIterator<Item = SeedNode>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }
}

/// How the store reaches Redis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionMode {
    /// One server.
    Single(SingleConfig),
    /// A cluster discovered through seed nodes.
    #[cfg(feature = "cluster")]
    Cluster(ClusterConfig),
}

impl ConnectionMode {
    /// Single server mode.
    pub fn single(url: impl Into<String>) -> Self {
        Self::Single(SingleConfig::new(url))
    }

    /// Cluster mode.
    #[cfg(feature = "cluster")]
    pub fn cluster(nodes: impl IntoIterator<Item = SeedNode>) -> Self {
        Self::Cluster(ClusterConfig::new(nodes))
    }
}

#[derive(Clone)]
enum RedisClient {
    Single(Client),
    #[cfg(feature = "cluster")]
    Cluster(ClusterClient),
}

enum Connection {
    Single(MultiplexedConnection),
    #[cfg(feature = "cluster")]
    Cluster(ClusterConnection),
}

impl Connection {
    async fn pipeline<T: FromRedisValue>(&mut self, pipe: &Pipeline) -> RedisResult<T> {
        match self {
            Self::Single(con) => pipe.query_async(con).await,
            #[cfg(feature = "cluster")]
            Self::Cluster(con) => pipe.query_async(con).await,
        }
    }

    async fn command<T: FromRedisValue>(&mut self, cmd: &Cmd) -> RedisResult<T> {
        match self {
            Self::Single(con) => cmd.query_async(con).await,
            #[cfg(feature = "cluster")]
            Self::Cluster(con) => cmd.query_async(con).await,
        }
    }
}

/// Redis store based on the redis-rs crate.
///
/// Holds one connection, opened by [`RedisConnector::connect`]. Every
/// multi-command operation is sent as one non-transactional pipeline.
pub struct RedisStore {
    connection: Connection,
    label: String,
}

impl RedisStore {
    /// Creates a new store builder with default settings.
    #[must_use]
    pub fn builder() -> RedisStoreBuilder {
        RedisStoreBuilder::default()
    }
}

/// Part of builder pattern implementation for RedisStore.
pub struct RedisStoreBuilder {
    mode: Option<ConnectionMode>,
    label: String,
}

impl Default for RedisStoreBuilder {
    fn default() -> Self {
        Self {
            mode: None,
            label: "redis".to_owned(),
        }
    }
}

impl RedisStoreBuilder {
    /// Set connection mode (single server or cluster).
    pub fn connection(mut self, mode: ConnectionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set a custom label, reported in tracing output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Validates the settings and creates a connector.
    ///
    /// No network interaction happens here; see [`RedisConnector::connect`].
    pub fn build(self) -> Result<RedisConnector, Error> {
        let client = match self.mode.ok_or(Error::MissingConnectionMode)? {
            ConnectionMode::Single(config) => RedisClient::Single(Client::open(config.url)?),
            #[cfg(feature = "cluster")]
            ConnectionMode::Cluster(config) => {
                if config.nodes.is_empty() {
                    return Err(Error::NoSeedNodes);
                }
                let urls = config.nodes.iter().map(SeedNode::url).collect::<Vec<_>>();
                RedisClient::Cluster(ClusterClient::new(urls)?)
            }
        };
        Ok(RedisConnector {
            client,
            label: self.label,
        })
    }
}

/// Opens connections to the configured server or cluster.
#[derive(Clone)]
pub struct RedisConnector {
    client: RedisClient,
    label: String,
}

#[async_trait]
impl Connect for RedisConnector {
    type Store = RedisStore;

    async fn connect(&self) -> BackendResult<RedisStore> {
        let connection = match &self.client {
            RedisClient::Single(client) => Connection::Single(
                client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(Error::from)?,
            ),
            #[cfg(feature = "cluster")]
            RedisClient::Cluster(client) => {
                Connection::Cluster(client.get_async_connection().await.map_err(Error::from)?)
            }
        };
        debug!(store = %self.label, "Redis connection established");
        Ok(RedisStore {
            connection,
            label: self.label.clone(),
        })
    }
}

fn batch_pipeline(batch: &Batch) -> Pipeline {
    let table = batch.table();
    let mut pipe = redis::pipe();
    for op in batch.ops() {
        match op {
            BatchOp::HashSet { field, value } => {
                pipe.cmd("HSET").arg(table).arg(field).arg(value).ignore();
            }
            BatchOp::HashDelete { field } => {
                pipe.cmd("HDEL").arg(table).arg(field).ignore();
            }
            BatchOp::ListPush { value } => {
                pipe.cmd("LPUSH").arg(table).arg(value).ignore();
            }
            BatchOp::Expire { ttl } => {
                pipe.cmd("EXPIRE").arg(table).arg(ttl.as_secs()).ignore();
            }
        }
    }
    pipe
}

#[async_trait]
impl Store for RedisStore {
    async fn hash_entries(&mut self, table: &str) -> BackendResult<Vec<(String, String)>> {
        trace!(table, "HGETALL");
        let mut pipe = redis::pipe();
        pipe.cmd("HGETALL").arg(table);
        let (entries,): (Vec<(String, String)>,) = self
            .connection
            .pipeline(&pipe)
            .await
            .map_err(Error::from)?;
        Ok(entries)
    }

    async fn list_values(&mut self, table: &str) -> BackendResult<Vec<String>> {
        trace!(table, "LRANGE");
        let mut pipe = redis::pipe();
        pipe.cmd("LRANGE").arg(table).arg(0).arg(-1);
        let (values,): (Vec<String>,) = self
            .connection
            .pipeline(&pipe)
            .await
            .map_err(Error::from)?;
        Ok(values)
    }

    async fn execute(&mut self, batch: &Batch) -> BackendResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        trace!(table = batch.table(), ops = batch.len(), "Execute pipeline");
        self.connection
            .pipeline::<()>(&batch_pipeline(batch))
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn pop(&mut self, table: &str, end: ListEnd) -> BackendResult<Option<String>> {
        let name = match end {
            ListEnd::Front => "LPOP",
            ListEnd::Back => "RPOP",
        };
        trace!(table, ?end, "POP");
        let mut cmd = redis::cmd(name);
        cmd.arg(table);
        let value: Option<String> = self
            .connection
            .command(&cmd)
            .await
            .map_err(Error::from)?;
        Ok(value)
    }

    async fn remove(&mut self, table: &str) -> BackendResult<DeleteStatus> {
        trace!(table, "DEL");
        let mut cmd = redis::cmd("DEL");
        cmd.arg(table);
        let deleted: u32 = self
            .connection
            .command(&cmd)
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            Ok(DeleteStatus::Deleted(deleted))
        } else {
            Ok(DeleteStatus::Missing)
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_backend::BackendError;

    #[test]
    fn test_seed_node_url() {
        let node = SeedNode::new("10.0.0.1", 7000);
        assert_eq!(node.url(), "redis://10.0.0.1:7000/");
        assert_eq!(node.to_string(), "10.0.0.1:7000");
    }

    #[test]
    fn test_build_without_mode_fails() {
        let result = RedisStore::builder().build();
        assert!(matches!(result, Err(Error::MissingConnectionMode)));
    }

    #[test]
    fn test_build_with_invalid_url_fails() {
        let result = RedisStore::builder()
            .connection(ConnectionMode::single("not-a-valid-url"))
            .build();
        assert!(matches!(result, Err(Error::Redis(_))));
    }

    #[test]
    fn test_config_errors_map_to_invalid_config() {
        let error: BackendError = Error::MissingConnectionMode.into();
        assert!(matches!(error, BackendError::InvalidConfig(_)));
    }

    #[cfg(feature = "cluster")]
    #[test]
    fn test_cluster_without_seed_nodes_fails() {
        let result = RedisStore::builder()
            .connection(ConnectionMode::cluster(Vec::new()))
            .build();
        assert!(matches!(result, Err(Error::NoSeedNodes)));
    }

    #[cfg(feature = "cluster")]
    #[test]
    fn test_cluster_build_does_not_connect() {
        let result = RedisStore::builder()
            .connection(ConnectionMode::cluster([
                SeedNode::new("127.0.0.1", 1),
                SeedNode::new("127.0.0.1", 2),
            ]))
            .build();
        assert!(result.is_ok());
    }
}
