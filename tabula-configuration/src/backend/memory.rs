use serde::{Deserialize, Serialize};

use super::Connector;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Memory {
    /// Optional label for this store (used in tracing).
    #[serde(default)]
    pub label: Option<String>,
}

impl Memory {
    #[cfg(feature = "memory")]
    pub fn into_connector(self) -> Result<Connector, ConfigError> {
        use tabula_memory::MemoryConnector;

        let mut connector = MemoryConnector::new();
        if let Some(label) = self.label {
            connector = connector.label(label);
        }
        Ok(Connector::new(connector))
    }

    #[cfg(not(feature = "memory"))]
    pub fn into_connector(self) -> Result<Connector, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Memory".to_string()))
    }
}
