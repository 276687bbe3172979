use serde::{Deserialize, Serialize};

use super::Connector;
use crate::error::ConfigError;

/// Host/port of a Redis node.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Node {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum RedisMode {
    /// One server reached through `url`.
    Single,
    /// A cluster discovered through `nodes` (default).
    #[default]
    Cluster,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Redis {
    #[serde(default)]
    pub mode: RedisMode,
    /// Connection URL, single mode only.
    #[serde(default)]
    pub url: Option<String>,
    /// Seed nodes, cluster mode only.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Optional label for this store (used in tracing).
    #[serde(default)]
    pub label: Option<String>,
}

impl Redis {
    #[cfg(feature = "redis")]
    pub fn into_connector(self) -> Result<Connector, ConfigError> {
        use tabula_redis::{ConnectionMode, RedisStore, SeedNode};

        let mode = match self.mode {
            RedisMode::Single => {
                let url = self.url.ok_or_else(|| {
                    ConfigError::InvalidBackend("Redis single mode requires `url`".to_string())
                })?;
                ConnectionMode::single(url)
            }
            RedisMode::Cluster => ConnectionMode::cluster(
                self.nodes
                    .into_iter()
                    .map(|node| SeedNode::new(node.host, node.port)),
            ),
        };

        let mut builder = RedisStore::builder().connection(mode);
        if let Some(label) = self.label {
            builder = builder.label(label);
        }

        let connector = builder
            .build()
            .map_err(|e| ConfigError::InvalidBackend(format!("Redis: {}", e)))?;

        Ok(Connector::new(connector))
    }

    #[cfg(not(feature = "redis"))]
    pub fn into_connector(self) -> Result<Connector, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Redis".to_string()))
    }
}
