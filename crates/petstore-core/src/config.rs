// ABOUTME: Configuration loading and validation for the petstore service.
// ABOUTME: Reads a JSON file describing the listener and which storage provider to build.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider name that requires the `sqlite` section to be present.
const SQLITE_PROVIDER: &str = "sqlite";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("{0} is not a valid bind address")]
    InvalidBind(String),
}

/// Top-level configuration: where to listen and which store to use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Upper bound on graceful shutdown. Absent means wait for in-flight
    /// requests indefinitely.
    #[serde(default)]
    pub shutdown_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    pub name: String,
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SqliteConfig {
    /// Database file, or `:memory:` for a private in-memory database.
    pub path: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub log_queries: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            shutdown_timeout_ms: None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("server port must be set".to_string()));
        }
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("server host cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve `host:port` into a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let target = format!("{}:{}", self.host, self.port);
        target
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or(ConfigError::InvalidBind(target))
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_ms.map(Duration::from_millis)
    }
}

impl StoreConfig {
    /// A store section naming a provider that needs no extra settings.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sqlite: None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("store name cannot be empty".to_string()));
        }
        if self.name == SQLITE_PROVIDER {
            match &self.sqlite {
                Some(sqlite) if !sqlite.path.is_empty() => {}
                Some(_) => {
                    return Err(ConfigError::Invalid("sqlite path cannot be empty".to_string()));
                }
                None => {
                    return Err(ConfigError::Invalid(
                        "store \"sqlite\" requires a sqlite section".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl SqliteConfig {
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            busy_timeout_ms: default_busy_timeout_ms(),
            log_queries: false,
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
