//! Bridge configuration.
//!
//! YAML-backed configuration selecting which engine loads behind the bridge
//! and how outcomes are delivered. Kept deliberately flat: one engine, one
//! output policy.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{EngineFactory, HttpEngineFactory, ProcessEngineFactory};
use crate::errors::BridgeError;

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineConfig {
    /// Local interpreter binary, fed source on stdin.
    Process {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Remote runtime service speaking the JSON run protocol.
    Http { endpoint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputConfig {
    /// Discard outcomes that arrive after a newer submission's outcome.
    #[serde(default)]
    pub sequenced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl BridgeConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, BridgeError> {
        let config: BridgeConfig = serde_yaml::from_str(content)
            .map_err(|e| BridgeError::ConfigError(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        match &self.engine {
            EngineConfig::Process {
                command,
                timeout_secs,
                ..
            } => {
                if command.trim().is_empty() {
                    return Err(BridgeError::ConfigError(
                        "process engine requires a command".to_string(),
                    ));
                }
                if *timeout_secs == 0 {
                    return Err(BridgeError::ConfigError(
                        "process engine timeout must be non-zero".to_string(),
                    ));
                }
            }
            EngineConfig::Http { endpoint } => {
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    return Err(BridgeError::ConfigError(format!(
                        "http engine endpoint must be absolute, got '{}'",
                        endpoint
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds the engine factory this configuration describes.
    pub fn engine_factory(&self) -> Arc<dyn EngineFactory> {
        match &self.engine {
            EngineConfig::Process {
                command,
                args,
                timeout_secs,
            } => Arc::new(ProcessEngineFactory::new(
                command.clone(),
                args.clone(),
                Duration::from_secs(*timeout_secs),
            )),
            EngineConfig::Http { endpoint } => Arc::new(HttpEngineFactory::new(endpoint.clone())),
        }
    }
}

/// Load a bridge configuration from a YAML file
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<BridgeConfig, BridgeError> {
    let path = path.as_ref();
    log::debug!("Loading configuration from {}", path.display());
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        BridgeError::ConfigError(format!("cannot read {}: {}", path.display(), e))
    })?;
    BridgeConfig::from_yaml_str(&content)
}
