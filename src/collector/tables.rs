//! Routing table id to name resolution

use crate::netlink::route::{RT_TABLE_DEFAULT, RT_TABLE_LOCAL, RT_TABLE_MAIN};
use crate::netlink::{Link, LinkKind};
use std::collections::HashMap;

/// Display names for routing table ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTableNameMap {
    names: HashMap<u32, String>,
}

impl Default for RouteTableNameMap {
    fn default() -> Self {
        let names = [
            (RT_TABLE_DEFAULT, "default"),
            (RT_TABLE_MAIN, "main"),
            (RT_TABLE_LOCAL, "local"),
        ]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();
        Self { names }
    }
}

impl RouteTableNameMap {
    /// Reserved table names plus one entry per VRF device.
    ///
    /// VRFs sharing a table id overwrite each other in link order. VRFs
    /// without a known table id are skipped.
    pub fn from_links(links: &[Link]) -> Self {
        let mut map = Self::default();
        for link in links {
            if let LinkKind::Vrf {
                table_id: Some(table_id),
            } = link.kind
            {
                map.names.insert(table_id, link.name.clone());
            }
        }
        map
    }

    /// Table name, empty for ids with no known name
    pub fn name_of(&self, table: u32) -> &str {
        self.names.get(&table).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
