//! Configuration System
//!
//! Layered configuration for the Nomad connection, the polling driver, the
//! snapshot codec and logging. Layers, lowest precedence first: built-in
//! defaults, the global config file, workspace config files, `NOMAD_*`
//! environment variables. CLI flags are applied on top by the caller.

use crate::client::HttpNodeClient;
use crate::codec::{CodecRegistry, Encoding};
use crate::dependency::{Consistency, DependencyType, QueryOptions};
use crate::error::{ClientError, ConfigError};
use crate::logging::LoggingConfig;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodewatchConfig {
    #[serde(default)]
    pub nomad: NomadConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection to the Nomad HTTP API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NomadConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub namespace: Option<String>,

    /// ACL token sent as `X-Nomad-Token`
    #[serde(default)]
    pub token: Option<String>,

    /// Allow any server to answer reads
    #[serde(default)]
    pub stale: bool,

    /// Per-request timeout, not counting blocking wait time
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_address() -> String {
    "http://127.0.0.1:4646".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for NomadConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            region: None,
            namespace: None,
            token: None,
            stale: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NomadConfig {
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.address)
            .map_err(|e| format!("Invalid address {:?}: {}", self.address, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "Invalid address {:?}: scheme must be http or https",
                self.address
            ));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base options every fetch starts from.
    pub fn query_options(&self) -> QueryOptions {
        let mut opts = QueryOptions::new();
        opts.region = self.region.clone().filter(|r| !r.is_empty());
        opts.namespace = self.namespace.clone().filter(|n| !n.is_empty());
        if self.stale {
            opts.consistency = Consistency::Stale;
        }
        opts
    }

    pub fn build_client(&self) -> Result<HttpNodeClient, ClientError> {
        HttpNodeClient::new(
            self.address.clone(),
            self.token.clone(),
            self.request_timeout(),
        )
    }
}

/// Polling driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Upper bound on how long the server may hold a blocking query
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,

    #[serde(default = "default_min_backoff_ms")]
    pub min_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_wait_secs() -> u64 {
    300
}

fn default_min_backoff_ms() -> u64 {
    250
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            wait_secs: default_wait_secs(),
            min_backoff_ms: default_min_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.wait_secs == 0 {
            return Err("wait_secs must be greater than zero".to_string());
        }
        if self.min_backoff_ms == 0 {
            return Err("min_backoff_ms must be greater than zero".to_string());
        }
        if self.min_backoff_ms > self.max_backoff_ms {
            return Err(format!(
                "min_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.min_backoff_ms, self.max_backoff_ms
            ));
        }
        Ok(())
    }

    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    pub fn min_backoff(&self) -> Duration {
        Duration::from_millis(self.min_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Snapshot encoding used when saving results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub encoding: Encoding,
}

impl CodecConfig {
    pub fn registry(&self) -> CodecRegistry {
        CodecRegistry::builder()
            .register(DependencyType::Nomad, self.encoding)
            .build()
    }
}

impl NodewatchConfig {
    /// Validate every section, collecting all failures.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors: Vec<String> = [
            self.nomad.validate().map_err(|e| format!("nomad: {}", e)),
            self.poll.validate().map_err(|e| format!("poll: {}", e)),
            self.logging.validate().map_err(|e| format!("logging: {}", e)),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }

    /// Copy with secrets blanked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.nomad.token.is_some() {
            config.nomad.token = Some("<redacted>".to_string());
        }
        config
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
