use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabula::{RetryPolicy, Store, TableClient};

use crate::backend::Backend;
use crate::error::ConfigError;

/// Connection retry settings, in whole seconds.
///
/// See [`RetryPolicy`] for how the three values interact.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub baseline_secs: u64,
    pub interval_secs: u64,
    pub budget_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            baseline_secs: 2,
            interval_secs: 5,
            budget_secs: 20,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_secs(self.baseline_secs),
            Duration::from_secs(self.interval_secs),
            Duration::from_secs(self.budget_secs),
        )
    }
}

fn default_ttl_secs() -> u64 {
    tabula::DEFAULT_TTL.as_secs()
}

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    #[serde(default)]
    pub retry: RetryConfig,
    /// TTL applied by `*_with_ttl` writes that pass `None`.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    /// Builds the configured store and connects a client to it, retrying
    /// per the `retry` section.
    pub async fn connect(self) -> Result<TableClient<Box<dyn Store>>, ConfigError> {
        let policy = self.retry.to_policy();
        let connector = self.backend.into_connector()?;
        let client = TableClient::connect(&connector, &policy).await?;
        Ok(client.with_default_ttl(Duration::from_secs(self.default_ttl_secs)))
    }
}
