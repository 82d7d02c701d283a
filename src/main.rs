use clap::Parser;
use futures_util::future::join_all;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use network_route_collector::collector::registry::CollectorRegistry;
use network_route_collector::collector::{Collection, COLLECTOR_NAME};
use network_route_collector::config::cli::{print_default_config, CliArgs};
use network_route_collector::config::load_configuration;
use network_route_collector::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = CliArgs::parse();

    if cli.print_default_config {
        print_default_config();
        return Ok(());
    }

    let config = load_configuration(&cli)?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .with_writer(std::io::stderr)
        .init();

    if cli.validate_config {
        info!("Configuration is valid");
        return Ok(());
    }

    let registry = CollectorRegistry::with_builtin();
    for name in registry.unknown(&config.collectors) {
        warn!("Ignoring unknown collector: {}", name);
    }

    let collectors = registry.build_enabled(&config)?;
    if collectors.is_empty() {
        info!(
            "Collector {} is disabled, enable it with --enable-collector {}",
            COLLECTOR_NAME, COLLECTOR_NAME
        );
        return Ok(());
    }

    for (name, collector) in &collectors {
        info!("Starting {} collection with {:?}", name, collector.scope());
    }

    let Some(secs) = config.interval_secs else {
        for (name, collector) in &collectors {
            let collection = collector.collect().await?;
            emit(name, &collection)?;
        }
        return Ok(());
    };

    // One signal listener for the whole run, fanned out to every collector
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutting down route collection"),
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
        let _ = shutdown_tx.send(true);
    };

    let period = Duration::from_secs(secs);
    let runs = collectors.iter().map(|(name, collector)| {
        let mut stop = shutdown_rx.clone();
        let shutdown = async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
        };
        collector.run_every(period, shutdown, move |result| match result {
            Ok(collection) => {
                if let Err(e) = emit(name, &collection) {
                    error!("Failed to write {} samples: {}", name, e);
                }
            }
            Err(e) => error!("Collection cycle for {} failed: {}", name, e),
        })
    });

    let (_, cycles) = tokio::join!(signal, join_all(runs));
    info!("Ran {} collection cycles", cycles.iter().sum::<u64>());
    Ok(())
}

/// Write one cycle's samples to stdout
fn emit(name: &str, collection: &Collection) -> std::io::Result<()> {
    info!(
        "{} collected {} route records across {} devices",
        name,
        collection.routes.len(),
        collection.device_counts.len()
    );

    let mut out = std::io::stdout().lock();
    for sample in collection.samples() {
        writeln!(out, "{}", sample)?;
    }
    out.flush()
}
