//! Link index to device name lookup

use crate::error::FetchError;
use crate::netlink::{Link, RoutingSource};
use std::collections::HashMap;

/// Per-cycle snapshot of the kernel's links with an index lookup
#[derive(Debug, Clone, Default)]
pub struct LinkDirectory {
    links: Vec<Link>,
    names: HashMap<u32, String>,
}

impl LinkDirectory {
    pub fn new(links: Vec<Link>) -> Self {
        let mut names = HashMap::with_capacity(links.len());
        for link in &links {
            // First link with a given index wins
            names.entry(link.index).or_insert_with(|| link.name.clone());
        }
        Self { links, names }
    }

    /// Query the current links from `source`
    pub async fn fetch<S: RoutingSource>(source: &S) -> Result<Self, FetchError> {
        Ok(Self::new(source.list_links().await?))
    }

    /// Device name for a link index, empty when no link matches
    pub fn name_of(&self, index: u32) -> &str {
        self.names.get(&index).map(String::as_str).unwrap_or("")
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }
}
