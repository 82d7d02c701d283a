//! TOML configuration file parsing

use crate::config::AppConfig;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// TOML configuration structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub interval_secs: Option<u64>,
    pub logging: Option<LoggingConfig>,
    pub routes: Option<RoutesConfig>,
    pub collectors: Option<BTreeMap<String, bool>>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Route table scope configuration
#[derive(Debug, Deserialize)]
pub struct RoutesConfig {
    pub table: Option<u32>,
    pub filter_by_table: Option<bool>,
}

impl TomlConfig {
    /// Apply file values over `base`
    pub fn apply_to(self, mut base: AppConfig) -> AppConfig {
        if let Some(secs) = self.interval_secs {
            base.interval_secs = Some(secs);
        }

        if let Some(level) = self.logging.and_then(|l| l.level) {
            base.log_level = level;
        }

        if let Some(routes) = self.routes {
            if let Some(table) = routes.table {
                base.table_scope.table = table;
            }
            if let Some(filter) = routes.filter_by_table {
                base.table_scope.filter_by_table = filter;
            }
        }

        if let Some(collectors) = self.collectors {
            base.collectors.extend(collectors);
        }

        base
    }
}

/// Load configuration from TOML file
pub fn load_toml_config(path: &str) -> Result<TomlConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|_| ConfigError::FileNotFound { path: path.to_string() })?;

    toml::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
}
