//! Route to record translation

use crate::collector::aggregate::Aggregator;
use crate::collector::links::LinkDirectory;
use crate::collector::protocol::protocol_name;
use crate::collector::tables::RouteTableNameMap;
use crate::collector::{RouteRecord, RoutesByFamily};
use crate::netlink::{RawRoute, RouteKind};
use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// Turns raw routes into one record per route and next-hop
pub struct RouteTranslator<'a> {
    links: &'a LinkDirectory,
    tables: &'a RouteTableNameMap,
}

impl<'a> RouteTranslator<'a> {
    pub fn new(links: &'a LinkDirectory, tables: &'a RouteTableNameMap) -> Self {
        Self { links, tables }
    }

    /// Translate every family's routes, counting each record in `aggregator`
    pub fn translate(
        &self,
        routes: &RoutesByFamily,
        aggregator: &mut Aggregator,
    ) -> Vec<RouteRecord> {
        let mut records = Vec::new();
        for routes in routes.values() {
            for route in routes {
                self.translate_route(route, aggregator, &mut records);
            }
        }
        records
    }

    fn translate_route(
        &self,
        route: &RawRoute,
        aggregator: &mut Aggregator,
        out: &mut Vec<RouteRecord>,
    ) {
        if route.kind != RouteKind::Unicast {
            return;
        }

        if route.is_multipath() {
            for hop in &route.next_hops {
                let record = self.record(
                    route,
                    hop.link_index,
                    hop.gateway,
                    (u32::from(hop.hops) + 1).to_string(),
                );
                aggregator.increment(&record.device);
                out.push(record);
            }
        } else {
            let record = self.record(route, route.link_index, route.gateway, String::new());
            aggregator.increment(&record.device);
            out.push(record);
        }
    }

    fn record(
        &self,
        route: &RawRoute,
        link_index: u32,
        gateway: Option<IpAddr>,
        weight: String,
    ) -> RouteRecord {
        RouteRecord {
            device: self.links.name_of(link_index).to_string(),
            src: format_address(route.source),
            dest: format_destination(route.destination.as_ref()),
            gw: format_address(gateway),
            priority: route.priority.to_string(),
            proto: protocol_name(route.protocol).to_string(),
            weight,
            family: route.family.label().to_string(),
            table: self.tables.name_of(route.table).to_string(),
        }
    }
}

/// Textual address, empty when unset. IPv4-mapped IPv6 prints as IPv4.
pub fn format_address(addr: Option<IpAddr>) -> String {
    match addr {
        None => String::new(),
        Some(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        Some(ip) => ip.to_string(),
    }
}

/// CIDR form of a destination, `default` when unset
pub fn format_destination(dest: Option<&IpNetwork>) -> String {
    match dest {
        None => "default".to_string(),
        Some(net) => net.to_string(),
    }
}
