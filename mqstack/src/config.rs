//! Configuration management

use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub sweeper: SweeperConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_account_id")]
    pub account_id: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Prefix for queue URLs
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            account_id: default_account_id(),
            region: default_region(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    /// Milliseconds between sweeps; 0 disables the sweeper
    #[serde(default = "default_sweep_interval_ms")]
    pub interval_ms: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_sweep_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_account_id() -> String {
    "000000000000".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_base_url() -> String {
    "http://localhost:4566".to_string()
}

fn default_sweep_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment. Without an explicit
    /// path, `mqstack.toml` in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name("mqstack").required(false),
        };
        config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("MQSTACK").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.broker.account_id, "000000000000");
        assert_eq!(config.broker.region, "us-east-1");
        assert_eq!(config.broker.base_url, "http://localhost:4566");
        assert_eq!(config.sweeper.interval_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [broker]
            region = "eu-west-1"

            [sweeper]
            interval_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.broker.region, "eu-west-1");
        assert_eq!(config.broker.account_id, "000000000000");
        assert_eq!(config.sweeper.interval_ms, 0);
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(Config::load(Some(Path::new("/nonexistent/mqstack.toml"))).is_err());
    }
}
