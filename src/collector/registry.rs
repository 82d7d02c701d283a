//! Collector registration and construction

use crate::collector::{RouteCollector, COLLECTOR_NAME};
use crate::config::AppConfig;
use crate::error::FetchError;
use crate::netlink::RtNetlinkSource;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds a collector from the loaded configuration
pub type CollectorFactory<T> = fn(&AppConfig) -> Result<T, FetchError>;

/// A registered collector: its constructor and whether it runs without
/// explicit enabling
pub struct Registration<T> {
    pub default_enabled: bool,
    factory: CollectorFactory<T>,
}

/// Explicit name to factory map built by the owning process at startup
pub struct CollectorRegistry<T> {
    entries: BTreeMap<&'static str, Registration<T>>,
}

impl<T> Default for CollectorRegistry<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl CollectorRegistry<RouteCollector<RtNetlinkSource>> {
    /// Registry with every collector this crate provides
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(COLLECTOR_NAME, false, build_route_collector);
        registry
    }
}

fn build_route_collector(
    config: &AppConfig,
) -> Result<RouteCollector<RtNetlinkSource>, FetchError> {
    Ok(RouteCollector::new(RtNetlinkSource::new()?, config.table_scope))
}

impl<T> CollectorRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        default_enabled: bool,
        factory: CollectorFactory<T>,
    ) {
        self.entries.insert(
            name,
            Registration {
                default_enabled,
                factory,
            },
        );
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of registered collectors
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Whether `name` should run given per-collector overrides
    pub fn is_enabled(&self, name: &str, overrides: &BTreeMap<String, bool>) -> bool {
        let Some(registration) = self.entries.get(name) else {
            return false;
        };
        let enabled = overrides
            .get(name)
            .copied()
            .unwrap_or(registration.default_enabled);
        debug!("Collector {} enabled: {}", name, enabled);
        enabled
    }

    /// Override keys that name no registered collector
    pub fn unknown<'a>(&self, overrides: &'a BTreeMap<String, bool>) -> Vec<&'a str> {
        overrides
            .keys()
            .filter(|name| !self.is_registered(name))
            .map(String::as_str)
            .collect()
    }

    /// Construct every enabled collector, in name order
    pub fn build_enabled(
        &self,
        config: &AppConfig,
    ) -> Result<Vec<(&'static str, T)>, FetchError> {
        let mut collectors = Vec::new();
        for (name, registration) in &self.entries {
            if self.is_enabled(name, &config.collectors) {
                collectors.push((*name, (registration.factory)(config)?));
            }
        }
        Ok(collectors)
    }
}
