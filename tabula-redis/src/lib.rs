//! Redis store for tabula tables.
//!
//! Connects either to a single Redis server or, with the `cluster` feature
//! (enabled by default), to a Redis Cluster through a list of seed nodes.
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
pub mod error;

#[doc(inline)]
pub use crate::backend::{
    ConnectionMode, RedisConnector, RedisStore, RedisStoreBuilder, SeedNode, SingleConfig,
};

#[cfg(feature = "cluster")]
#[doc(inline)]
pub use crate::backend::ClusterConfig;

pub use crate::error::Error;
