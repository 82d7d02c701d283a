//! Configuration management module
//!
//! Handles loading configuration from multiple sources with proper precedence:
//! CLI arguments > environment variables > TOML files > defaults

use crate::error::ConfigError;
use crate::netlink::TableScope;
use std::collections::BTreeMap;

pub mod cli;
pub mod env;
pub mod toml;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: String,
    pub table_scope: TableScope,
    /// Per-collector enable overrides
    pub collectors: BTreeMap<String, bool>,
    /// Seconds between cycles; a single cycle runs when unset
    pub interval_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            table_scope: TableScope::default(),
            collectors: BTreeMap::new(),
            interval_secs: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Unknown log level '{}'. Expected one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.interval_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "Collection interval must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load configuration from every source in precedence order
pub fn load_configuration(cli: &cli::CliArgs) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::default();

    if let Some(ref path) = cli.config {
        config = toml::load_toml_config(path)?.apply_to(config);
    }

    config = env::apply_env_config(config)?;
    config = cli.apply_to_config(config);
    config.validate()?;

    Ok(config)
}
