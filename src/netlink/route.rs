//! Route message decoding and table scope filtering

use crate::netlink::{AddressFamily, NextHop, RawRoute, RouteKind};
use ipnetwork::IpNetwork;
use rtnetlink::packet_route::route::{
    RouteAddress, RouteAttribute, RouteFlags, RouteMessage, RouteNextHop, RouteProtocol,
    RouteScope, RouteType,
};
use rtnetlink::packet_route::AddressFamily as WireFamily;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::warn;

pub const RT_TABLE_UNSPEC: u32 = 0;
pub const RT_TABLE_DEFAULT: u32 = 253;
pub const RT_TABLE_MAIN: u32 = 254;
pub const RT_TABLE_LOCAL: u32 = 255;

/// Which routing tables a dump keeps.
///
/// With `filter_by_table` set, `table == 0` keeps every table and any other
/// value keeps only that table. Without it, only the main table survives.
/// Cloned (cache) routes are never kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableScope {
    pub table: u32,
    pub filter_by_table: bool,
}

impl Default for TableScope {
    fn default() -> Self {
        Self {
            table: RT_TABLE_UNSPEC,
            filter_by_table: true,
        }
    }
}

impl TableScope {
    pub fn admits(&self, msg: &RouteMessage) -> bool {
        if msg.header.flags.contains(RouteFlags::Cloned) {
            return false;
        }

        if u32::from(msg.header.table) != RT_TABLE_MAIN && !self.filter_by_table {
            return false;
        }

        !(self.filter_by_table && self.table != RT_TABLE_UNSPEC && route_table(msg) != self.table)
    }
}

/// Dump request for one family.
///
/// Only the family and table are set. Protocol, scope and type stay zero so
/// a strict-checking kernel does not narrow the dump by them.
pub fn dump_request(family: AddressFamily, scope: TableScope) -> RouteMessage {
    let mut msg = RouteMessage::default();
    msg.header.address_family = match family {
        AddressFamily::V4 => WireFamily::Inet,
        AddressFamily::V6 => WireFamily::Inet6,
    };
    msg.header.protocol = RouteProtocol::Unspec;
    msg.header.scope = RouteScope::Universe;
    msg.header.kind = RouteType::Unspec;

    match u8::try_from(scope.table) {
        Ok(table) => msg.header.table = table,
        Err(_) => {
            msg.header.table = RT_TABLE_UNSPEC as u8;
            msg.attributes.push(RouteAttribute::Table(scope.table));
        }
    }

    msg
}

/// Routes of `family` from a dump that fall within `scope`
pub fn routes_in_scope(
    messages: &[RouteMessage],
    family: AddressFamily,
    scope: TableScope,
) -> Vec<RawRoute> {
    messages
        .iter()
        .filter(|msg| scope.admits(msg))
        .filter_map(route_from_message)
        .filter(|route| route.family == family)
        .collect()
}

/// Table id of a route: `RTA_TABLE` when present, header table otherwise
pub fn route_table(msg: &RouteMessage) -> u32 {
    msg.attributes
        .iter()
        .find_map(|a| match a {
            RouteAttribute::Table(id) => Some(*id),
            _ => None,
        })
        .unwrap_or_else(|| u32::from(msg.header.table))
}

/// Convert a kernel route message into a [`RawRoute`].
///
/// Returns `None` for families other than IPv4/IPv6 and for destinations
/// whose prefix length does not fit the address.
pub fn route_from_message(msg: &RouteMessage) -> Option<RawRoute> {
    let family = match msg.header.address_family {
        WireFamily::Inet => AddressFamily::V4,
        WireFamily::Inet6 => AddressFamily::V6,
        _ => return None,
    };

    let mut prefsrc = None;
    let mut source = None;
    let mut destination = None;
    let mut gateway = None;
    let mut link_index = 0;
    let mut next_hops = Vec::new();
    let mut priority = 0;

    for attr in &msg.attributes {
        match attr {
            RouteAttribute::PrefSource(addr) => prefsrc = route_address(addr),
            RouteAttribute::Source(addr) => source = route_address(addr),
            RouteAttribute::Destination(addr) => destination = route_address(addr),
            RouteAttribute::Gateway(addr) => gateway = route_address(addr),
            RouteAttribute::Oif(index) => link_index = *index,
            RouteAttribute::Priority(p) => priority = *p,
            RouteAttribute::MultiPath(hops) => {
                next_hops = hops.iter().map(next_hop).collect();
            }
            _ => {}
        }
    }

    let destination = match destination {
        Some(addr) => {
            let prefix_len = msg.header.destination_prefix_length;
            match IpNetwork::new(addr, prefix_len) {
                Ok(net) => Some(net),
                Err(e) => {
                    warn!("Skipping route to {}/{}: {}", addr, prefix_len, e);
                    return None;
                }
            }
        }
        None => None,
    };

    Some(RawRoute {
        family,
        kind: RouteKind::from(u8::from(msg.header.kind)),
        source: prefsrc.or(source),
        destination,
        gateway,
        link_index,
        next_hops,
        priority,
        protocol: u8::from(msg.header.protocol),
        table: route_table(msg),
    })
}

fn next_hop(hop: &RouteNextHop) -> NextHop {
    let gateway = hop.attributes.iter().find_map(|a| match a {
        RouteAttribute::Gateway(addr) => route_address(addr),
        _ => None,
    });

    NextHop {
        link_index: hop.interface_index,
        gateway,
        hops: hop.hops,
    }
}

fn route_address(addr: &RouteAddress) -> Option<IpAddr> {
    match addr {
        RouteAddress::Inet(ip) => Some(IpAddr::V4(*ip)),
        RouteAddress::Inet6(ip) => Some(IpAddr::V6(*ip)),
        RouteAddress::Other(bytes) => match bytes.len() {
            4 => {
                let octets: [u8; 4] = bytes.as_slice().try_into().ok()?;
                Some(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            16 => {
                let octets: [u8; 16] = bytes.as_slice().try_into().ok()?;
                Some(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            _ => None,
        },
        _ => None,
    }
}
