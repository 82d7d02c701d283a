//! Environment variable configuration handling

use crate::config::AppConfig;
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "NETWORK_ROUTE_COLLECTOR_";

/// Apply environment variable configuration over base configuration
pub fn apply_env_config(base_config: AppConfig) -> Result<AppConfig, ConfigError> {
    apply_env_config_with(base_config, |key| env::var(key).ok())
}

/// Apply configuration using `lookup` to read variables
pub fn apply_env_config_with<F>(
    mut base_config: AppConfig,
    lookup: F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(format!("{}{}", ENV_PREFIX, name).as_str());

    if let Some(level) = var("LOG_LEVEL") {
        base_config.log_level = level;
    }

    if let Some(table) = var("ROUTE_TABLE") {
        base_config.table_scope.table = table.trim().parse::<u32>().map_err(|_| {
            ConfigError::InvalidFormat(format!("Invalid route table id: '{}'", table))
        })?;
    }

    if let Some(filter) = var("FILTER_BY_TABLE") {
        base_config.table_scope.filter_by_table = parse_bool(&filter)?;
    }

    // Format: NETWORK_ROUTE_COLLECTOR_COLLECTORS="network_route=true,arp=false"
    if let Some(collectors) = var("COLLECTORS") {
        base_config.collectors.extend(parse_collectors(&collectors)?);
    }

    if let Some(interval) = var("INTERVAL_SECS") {
        let secs = interval.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidFormat(format!("Invalid interval: '{}'", interval))
        })?;
        base_config.interval_secs = Some(secs);
    }

    Ok(base_config)
}

/// Parse collector toggles from "name=bool,name=bool".
/// A bare name enables that collector.
pub fn parse_collectors(value: &str) -> Result<BTreeMap<String, bool>, ConfigError> {
    let mut collectors = BTreeMap::new();

    for entry in value.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (name, enabled) = match entry.split_once('=') {
            Some((name, flag)) => (name.trim(), parse_bool(flag)?),
            None => (entry, true),
        };

        if name.is_empty() {
            return Err(ConfigError::InvalidFormat(format!(
                "Invalid collector toggle: '{}'. Expected 'name[=true|false]'",
                entry
            )));
        }

        collectors.insert(name.to_string(), enabled);
    }

    Ok(collectors)
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidFormat(format!(
            "Invalid boolean value: '{}'",
            other
        ))),
    }
}
