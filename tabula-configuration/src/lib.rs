//! YAML configuration for tabula clients.
//!
//! ```yaml
//! backend:
//!   type: Redis
//!   mode: Cluster
//!   nodes:
//!     - host: 10.0.0.1
//!       port: 7000
//! retry:
//!   baseline_secs: 2
//!   interval_secs: 5
//!   budget_secs: 20
//! default_ttl_secs: 3600
//! ```
//!
//! Every section except `backend` may be omitted.

pub mod backend;
mod config;
pub mod error;

pub use backend::{Backend, Connector, Memory, Node, Redis, RedisMode};
pub use config::{Config, RetryConfig};
pub use error::ConfigError;
