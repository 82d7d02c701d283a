//! Command-line argument parsing

use crate::config::AppConfig;
use clap::Parser;

/// Command-line arguments structure
#[derive(Parser, Debug)]
#[command(name = "network-route-collector")]
#[command(about = "Kernel routing table metrics collector")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, help = "Set the logging level")]
    pub log_level: Option<String>,

    /// Routing table id to collect, 0 for every table
    #[arg(long, help = "Routing table id to collect (0 collects every table)")]
    pub route_table: Option<u32>,

    /// Disable table filtering, which keeps only the main table
    #[arg(long, help = "Do not filter by table; only main table routes are kept")]
    pub no_table_filter: bool,

    /// Collectors to enable
    #[arg(
        long = "enable-collector",
        value_name = "NAME",
        help = "Enable a collector (repeatable)"
    )]
    pub enable_collectors: Vec<String>,

    /// Collectors to disable
    #[arg(
        long = "disable-collector",
        value_name = "NAME",
        help = "Disable a collector (repeatable)"
    )]
    pub disable_collectors: Vec<String>,

    /// Seconds between collection cycles
    #[arg(short, long, help = "Collect every N seconds instead of once")]
    pub interval: Option<u64>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and exit without collecting")]
    pub validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    pub print_default_config: bool,
}

impl CliArgs {
    /// Apply CLI arguments over base configuration
    pub fn apply_to_config(&self, mut base_config: AppConfig) -> AppConfig {
        if let Some(ref level) = self.log_level {
            base_config.log_level = level.clone();
        }

        if let Some(table) = self.route_table {
            base_config.table_scope.table = table;
        }

        if self.no_table_filter {
            base_config.table_scope.filter_by_table = false;
        }

        for name in &self.enable_collectors {
            base_config.collectors.insert(name.clone(), true);
        }

        for name in &self.disable_collectors {
            base_config.collectors.insert(name.clone(), false);
        }

        if let Some(secs) = self.interval {
            base_config.interval_secs = Some(secs);
        }

        base_config
    }
}

/// Render the default configuration in TOML format
pub fn default_config_toml() -> String {
    let default_config = AppConfig::default();
    let mut out = String::new();

    out.push_str("# Network Route Collector Configuration\n");
    out.push_str("# This is the default configuration with all available options\n\n");
    out.push_str("# Seconds between collection cycles; omit to collect once\n");
    out.push_str("# interval_secs = 15\n\n");
    out.push_str("[logging]\n");
    out.push_str("# Log level: trace, debug, info, warn, error\n");
    out.push_str(&format!("level = \"{}\"\n\n", default_config.log_level));
    out.push_str("[routes]\n");
    out.push_str("# Routing table id, 0 collects every table\n");
    out.push_str(&format!("table = {}\n", default_config.table_scope.table));
    out.push_str("# Without table filtering only the main table is collected\n");
    out.push_str(&format!(
        "filter_by_table = {}\n\n",
        default_config.table_scope.filter_by_table
    ));
    out.push_str("[collectors]\n");
    out.push_str(&format!("{} = false\n", crate::collector::COLLECTOR_NAME));

    out
}

/// Print default configuration in TOML format
pub fn print_default_config() {
    print!("{}", default_config_toml());
}
