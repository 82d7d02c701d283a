//! Kernel routing data access
//!
//! Domain types for links and routes decoupled from the rtnetlink wire
//! format, plus the [`RoutingSource`] seam the collector reads through.

use crate::error::FetchError;
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;

pub mod link;
pub mod route;
pub mod source;

pub use route::TableScope;
pub use source::RtNetlinkSource;

/// Address family of a route table dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub const ALL: [AddressFamily; 2] = [AddressFamily::V4, AddressFamily::V6];

    /// Label value used on emitted samples
    pub fn label(self) -> &'static str {
        match self {
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Network interface as seen by the kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub index: u32,
    pub name: String,
    pub kind: LinkKind,
}

/// Link classification relevant to routing table naming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Standard,
    /// VRF master device. `table_id` is `None` when the kernel did not
    /// report one.
    Vrf { table_id: Option<u32> },
}

impl Link {
    pub fn standard(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            kind: LinkKind::Standard,
        }
    }

    pub fn vrf(index: u32, name: impl Into<String>, table_id: u32) -> Self {
        Self {
            index,
            name: name.into(),
            kind: LinkKind::Vrf {
                table_id: Some(table_id),
            },
        }
    }
}

/// Route entry kind (`rtm_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Plain destination route (`RTN_UNICAST`)
    Unicast,
    Local,
    Broadcast,
    Anycast,
    Multicast,
    Blackhole,
    Unreachable,
    Prohibit,
    Throw,
    Other(u8),
}

impl From<u8> for RouteKind {
    fn from(value: u8) -> Self {
        match value {
            1 => RouteKind::Unicast,
            2 => RouteKind::Local,
            3 => RouteKind::Broadcast,
            4 => RouteKind::Anycast,
            5 => RouteKind::Multicast,
            6 => RouteKind::Blackhole,
            7 => RouteKind::Unreachable,
            8 => RouteKind::Prohibit,
            9 => RouteKind::Throw,
            other => RouteKind::Other(other),
        }
    }
}

/// One candidate path of a multipath route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextHop {
    pub link_index: u32,
    pub gateway: Option<IpAddr>,
    /// Zero-based hop preference (`rtnh_hops`)
    pub hops: u8,
}

/// One row of a kernel routing table dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRoute {
    pub family: AddressFamily,
    pub kind: RouteKind,
    pub source: Option<IpAddr>,
    /// `None` is the default route
    pub destination: Option<IpNetwork>,
    pub gateway: Option<IpAddr>,
    pub link_index: u32,
    /// Non-empty only for multipath routes
    pub next_hops: Vec<NextHop>,
    pub priority: u32,
    pub protocol: u8,
    pub table: u32,
}

impl RawRoute {
    /// Single-path unicast route in the main table, for building fixtures
    pub fn unicast(family: AddressFamily, link_index: u32) -> Self {
        Self {
            family,
            kind: RouteKind::Unicast,
            source: None,
            destination: None,
            gateway: None,
            link_index,
            next_hops: Vec::new(),
            priority: 0,
            protocol: 0,
            table: route::RT_TABLE_MAIN,
        }
    }

    pub fn is_multipath(&self) -> bool {
        !self.next_hops.is_empty()
    }
}

/// Source of link and route snapshots
pub trait RoutingSource {
    fn list_links(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Link>, FetchError>> + Send;
    fn list_routes(
        &self,
        family: AddressFamily,
        scope: TableScope,
    ) -> impl std::future::Future<Output = Result<Vec<RawRoute>, FetchError>> + Send;
}
