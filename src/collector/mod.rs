//! Route metrics collection
//!
//! One [`RouteCollector::collect`] call is one collection cycle: links are
//! read first (table names depend on them), then IPv4 and IPv6 routes.
//! Any kernel failure aborts the cycle and nothing is produced.

use crate::error::FetchError;
use crate::netlink::{AddressFamily, RawRoute, RoutingSource, TableScope};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub mod aggregate;
pub mod links;
pub mod protocol;
pub mod registry;
pub mod tables;
pub mod translate;

use aggregate::Aggregator;
use links::LinkDirectory;
use tables::RouteTableNameMap;
use translate::RouteTranslator;

pub const ROUTE_INFO_METRIC: &str = "network_route_info";
pub const ROUTES_METRIC: &str = "network_routes";

/// Name under which the route collector registers
pub const COLLECTOR_NAME: &str = "network_route";

/// Raw routes keyed by address family, iterated IPv4 first
pub type RoutesByFamily = BTreeMap<AddressFamily, Vec<RawRoute>>;

/// Labels of one route / next-hop pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub device: String,
    pub src: String,
    pub dest: String,
    pub gw: String,
    pub priority: String,
    pub proto: String,
    pub weight: String,
    pub family: String,
    pub table: String,
}

/// Number of route records emitted for a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRouteCount {
    pub device: String,
    pub count: u64,
}

/// Output of one successful cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub routes: Vec<RouteRecord>,
    pub device_counts: Vec<DeviceRouteCount>,
}

impl Collection {
    /// Route info samples followed by per-device counts
    pub fn samples(&self) -> impl Iterator<Item = Sample<'_>> {
        self.routes
            .iter()
            .map(Sample::RouteInfo)
            .chain(self.device_counts.iter().map(Sample::DeviceRoutes))
    }
}

/// One gauge sample handed to the exposition layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample<'a> {
    RouteInfo(&'a RouteRecord),
    DeviceRoutes(&'a DeviceRouteCount),
}

impl Sample<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Sample::RouteInfo(_) => ROUTE_INFO_METRIC,
            Sample::DeviceRoutes(_) => ROUTES_METRIC,
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            Sample::RouteInfo(_) => "network routing table information",
            Sample::DeviceRoutes(_) => "network routes by interface",
        }
    }

    pub fn labels(&self) -> Vec<(&'static str, &str)> {
        match self {
            Sample::RouteInfo(r) => vec![
                ("device", r.device.as_str()),
                ("src", r.src.as_str()),
                ("dest", r.dest.as_str()),
                ("gw", r.gw.as_str()),
                ("priority", r.priority.as_str()),
                ("proto", r.proto.as_str()),
                ("weight", r.weight.as_str()),
                ("family", r.family.as_str()),
                ("table", r.table.as_str()),
            ],
            Sample::DeviceRoutes(c) => vec![("device", c.device.as_str())],
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Sample::RouteInfo(_) => 1.0,
            Sample::DeviceRoutes(c) => c.count as f64,
        }
    }
}

impl fmt::Display for Sample<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name())?;
        for (i, (key, value)) in self.labels().into_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}=\"{}\"", key, escape_label(value))?;
        }
        write!(f, "}} {}", self.value())
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Kernel routing table collector
pub struct RouteCollector<S> {
    source: S,
    scope: TableScope,
}

impl<S: RoutingSource> RouteCollector<S> {
    pub fn new(source: S, scope: TableScope) -> Self {
        Self { source, scope }
    }

    pub fn scope(&self) -> TableScope {
        self.scope
    }

    /// Run one collection cycle
    pub async fn collect(&self) -> Result<Collection, FetchError> {
        let links = LinkDirectory::fetch(&self.source).await?;
        let tables = RouteTableNameMap::from_links(links.links());
        let routes = self.fetch_routes().await?;

        let mut aggregator = Aggregator::new();
        let records = RouteTranslator::new(&links, &tables).translate(&routes, &mut aggregator);

        Ok(Collection {
            routes: records,
            device_counts: aggregator.flush(),
        })
    }

    /// Routes for both families; fails if either query fails
    pub async fn fetch_routes(&self) -> Result<RoutesByFamily, FetchError> {
        let mut routes = RoutesByFamily::new();
        for family in AddressFamily::ALL {
            routes.insert(family, self.source.list_routes(family, self.scope).await?);
        }
        Ok(routes)
    }

    /// Collect every `period` until `shutdown` resolves, handing each
    /// cycle's outcome to `on_cycle`. Returns the number of cycles run.
    ///
    /// A shutdown that fires while a cycle is in flight is observed once
    /// the cycle finishes.
    pub async fn run_every<F>(
        &self,
        period: Duration,
        shutdown: F,
        mut on_cycle: impl FnMut(Result<Collection, FetchError>),
    ) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(period);
        let mut cycles = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    on_cycle(self.collect().await);
                    cycles += 1;
                }
            }
        }
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::{Link, NextHop};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    /// In-memory routing source; `None` fields fail their query
    #[derive(Default)]
    struct FakeSource {
        links: Option<Vec<Link>>,
        v4: Option<Vec<RawRoute>>,
        v6: Option<Vec<RawRoute>>,
        route_queries: AtomicUsize,
    }

    impl RoutingSource for FakeSource {
        async fn list_links(&self) -> Result<Vec<Link>, FetchError> {
            self.links
                .clone()
                .ok_or_else(|| FetchError::Links("operation not permitted".to_string()))
        }

        async fn list_routes(
            &self,
            family: AddressFamily,
            _scope: TableScope,
        ) -> Result<Vec<RawRoute>, FetchError> {
            self.route_queries.fetch_add(1, Ordering::SeqCst);
            let routes = match family {
                AddressFamily::V4 => &self.v4,
                AddressFamily::V6 => &self.v6,
            };
            routes.clone().ok_or_else(|| FetchError::Routes {
                family,
                reason: "no buffer space available".to_string(),
            })
        }
    }

    fn two_links() -> Vec<Link> {
        vec![Link::standard(1, "eth0"), Link::standard(2, "eth1")]
    }

    #[tokio::test]
    async fn test_collect_single_path_route() {
        let mut route = RawRoute::unicast(AddressFamily::V4, 1);
        route.gateway = Some("1.2.3.4".parse().unwrap());
        route.priority = 100;
        route.protocol = 4;

        let source = FakeSource {
            links: Some(two_links()),
            v4: Some(vec![route]),
            v6: Some(vec![]),
            ..Default::default()
        };
        let collection = RouteCollector::new(source, TableScope::default())
            .collect()
            .await
            .unwrap();

        assert_eq!(collection.routes.len(), 1);
        let record = &collection.routes[0];
        assert_eq!(
            (
                record.device.as_str(),
                record.src.as_str(),
                record.dest.as_str(),
                record.gw.as_str(),
                record.priority.as_str(),
                record.proto.as_str(),
                record.weight.as_str(),
                record.family.as_str(),
                record.table.as_str(),
            ),
            ("eth0", "", "default", "1.2.3.4", "100", "static", "", "IPv4", "main")
        );
        assert_eq!(
            collection.device_counts,
            vec![DeviceRouteCount {
                device: "eth0".to_string(),
                count: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_collect_multipath_route() {
        let mut route = RawRoute::unicast(AddressFamily::V4, 0);
        route.next_hops = vec![
            NextHop {
                link_index: 1,
                gateway: Some("9.9.9.9".parse().unwrap()),
                hops: 0,
            },
            NextHop {
                link_index: 2,
                gateway: Some("8.8.8.8".parse().unwrap()),
                hops: 1,
            },
        ];
        let source = FakeSource {
            links: Some(two_links()),
            v4: Some(vec![route]),
            v6: Some(vec![]),
            ..Default::default()
        };

        let collection = RouteCollector::new(source, TableScope::default())
            .collect()
            .await
            .unwrap();
        let weights: Vec<_> = collection
            .routes
            .iter()
            .map(|r| (r.device.as_str(), r.weight.as_str()))
            .collect();
        assert_eq!(weights, vec![("eth0", "1"), ("eth1", "2")]);
        assert_eq!(collection.device_counts.len(), 2);
        assert!(collection.device_counts.iter().all(|c| c.count == 1));
    }

    #[tokio::test]
    async fn test_link_failure_aborts_before_routes() {
        let source = FakeSource {
            links: None,
            v4: Some(vec![RawRoute::unicast(AddressFamily::V4, 1)]),
            v6: Some(vec![]),
            ..Default::default()
        };
        let collector = RouteCollector::new(source, TableScope::default());

        let err = collector.collect().await.unwrap_err();
        assert!(matches!(err, FetchError::Links(_)));
        assert_eq!(collector.source.route_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ipv6_failure_discards_ipv4_routes() {
        let source = FakeSource {
            links: Some(two_links()),
            v4: Some(vec![RawRoute::unicast(AddressFamily::V4, 1)]),
            v6: None,
            ..Default::default()
        };
        let err = RouteCollector::new(source, TableScope::default())
            .collect()
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Routes {
                family: AddressFamily::V6,
                reason: "no buffer space available".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_vrf_table_names() {
        let mut links = two_links();
        links.push(Link::vrf(3, "vrfA", 10));
        let mut in_vrf = RawRoute::unicast(AddressFamily::V6, 3);
        in_vrf.table = 10;
        let mut orphan = RawRoute::unicast(AddressFamily::V6, 3);
        orphan.table = 11;

        let source = FakeSource {
            links: Some(links),
            v4: Some(vec![]),
            v6: Some(vec![in_vrf, orphan]),
            ..Default::default()
        };
        let collection = RouteCollector::new(source, TableScope::default())
            .collect()
            .await
            .unwrap();
        let tables: Vec<_> = collection.routes.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(tables, vec!["vrfA", ""]);
        assert_eq!(collection.device_counts[0].device, "vrfA");
        assert_eq!(collection.device_counts[0].count, 2);
    }

    #[test]
    fn test_sample_lines() {
        let collection = Collection {
            routes: vec![RouteRecord {
                device: "eth0".to_string(),
                src: String::new(),
                dest: "10.0.0.0/24".to_string(),
                gw: "10.0.0.1".to_string(),
                priority: "0".to_string(),
                proto: "kernel".to_string(),
                weight: String::new(),
                family: "IPv4".to_string(),
                table: "main".to_string(),
            }],
            device_counts: vec![DeviceRouteCount {
                device: "eth0".to_string(),
                count: 3,
            }],
        };

        let lines: Vec<String> = collection.samples().map(|s| s.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                concat!(
                    "network_route_info{device=\"eth0\",src=\"\",dest=\"10.0.0.0/24\",",
                    "gw=\"10.0.0.1\",priority=\"0\",proto=\"kernel\",weight=\"\",",
                    "family=\"IPv4\",table=\"main\"} 1"
                )
                .to_string(),
                "network_routes{device=\"eth0\"} 3".to_string(),
            ]
        );
    }

    #[test]
    fn test_label_escaping() {
        let count = DeviceRouteCount {
            device: "we\"ird\\".to_string(),
            count: 1,
        };
        assert_eq!(
            Sample::DeviceRoutes(&count).to_string(),
            "network_routes{device=\"we\\\"ird\\\\\"} 1"
        );
    }

    #[test]
    fn test_collect_is_blockable() {
        let source = FakeSource {
            links: Some(vec![]),
            v4: Some(vec![]),
            v6: Some(vec![]),
            ..Default::default()
        };
        let collector = RouteCollector::new(source, TableScope::default());
        let collection = tokio_test::block_on(collector.collect()).unwrap();
        assert_eq!(collection, Collection::default());
        assert_eq!(collector.source.route_queries.load(Ordering::SeqCst), 2);
    }

    fn empty_source() -> FakeSource {
        FakeSource {
            links: Some(vec![]),
            v4: Some(vec![]),
            v6: Some(vec![]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_shutdown_during_cycle_stops_loop() {
        let collector = RouteCollector::new(empty_source(), TableScope::default());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let mut stop_tx = Some(stop_tx);
        let mut outcomes = Vec::new();

        let cycles = collector
            .run_every(
                Duration::from_secs(3600),
                async {
                    let _ = stop_rx.await;
                },
                |result| {
                    // Signal arrives while the first cycle is being handled
                    if let Some(tx) = stop_tx.take() {
                        let _ = tx.send(());
                    }
                    outcomes.push(result.is_ok());
                },
            )
            .await;

        assert_eq!(cycles, 1);
        assert_eq!(outcomes, vec![true]);
    }

    #[tokio::test]
    async fn test_shutdown_before_first_tick() {
        let collector = RouteCollector::new(empty_source(), TableScope::default());
        let cycles = collector
            .run_every(Duration::from_secs(3600), async {}, |_| {})
            .await;

        assert_eq!(cycles, 0);
        assert_eq!(collector.source.route_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_loop_running() {
        let source = FakeSource {
            links: None,
            ..Default::default()
        };
        let collector = RouteCollector::new(source, TableScope::default());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let mut stop_tx = Some(stop_tx);
        let mut failures = 0;

        let cycles = collector
            .run_every(
                Duration::from_millis(1),
                async {
                    let _ = stop_rx.await;
                },
                |result| {
                    assert!(matches!(result, Err(FetchError::Links(_))));
                    failures += 1;
                    if failures == 2 {
                        if let Some(tx) = stop_tx.take() {
                            let _ = tx.send(());
                        }
                    }
                },
            )
            .await;

        assert_eq!(cycles, 2);
        assert_eq!(failures, 2);
    }
}
