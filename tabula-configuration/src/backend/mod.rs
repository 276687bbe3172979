use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabula_backend::{BackendResult, Connect, Store};

use crate::error::ConfigError;

mod memory;
mod redis;

pub use memory::Memory;
pub use redis::{Node, Redis, RedisMode};

/// Store selection, tagged by `type`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Backend {
    Redis(Redis),
    Memory(Memory),
}

impl Backend {
    pub fn into_connector(self) -> Result<Connector, ConfigError> {
        match self {
            Backend::Redis(config) => config.into_connector(),
            Backend::Memory(config) => config.into_connector(),
        }
    }
}

/// Connector for whichever store the configuration selected.
///
/// Stores it produces are boxed so one client type covers every backend.
pub struct Connector(Box<dyn Connect<Store = Box<dyn Store>>>);

impl Connector {
    pub(crate) fn new<C>(connector: C) -> Self
    where
        C: Connect + 'static,
        C::Store: 'static,
    {
        Self(Box::new(Boxed(connector)))
    }
}

#[async_trait]
impl Connect for Connector {
    type Store = Box<dyn Store>;

    async fn connect(&self) -> BackendResult<Box<dyn Store>> {
        self.0.connect().await
    }
}

struct Boxed<C>(C);

#[async_trait]
impl<C> Connect for Boxed<C>
where
    C: Connect,
    C::Store: 'static,
{
    type Store = Box<dyn Store>;

    async fn connect(&self) -> BackendResult<Box<dyn Store>> {
        let store = self.0.connect().await?;
        Ok(Box::new(store))
    }
}
