//! Kernel routing source using rtnetlink

use crate::error::FetchError;
use crate::netlink::link::link_from_message;
use crate::netlink::route::{dump_request, routes_in_scope};
use crate::netlink::{AddressFamily, Link, RawRoute, RoutingSource, TableScope};
use futures_util::stream::TryStreamExt;
use rtnetlink::packet_route::route::RouteMessage;
use rtnetlink::{new_connection, Handle};
use tracing::debug;

/// Routing source backed by an rtnetlink connection
#[derive(Clone)]
pub struct RtNetlinkSource {
    handle: Handle,
}

impl RtNetlinkSource {
    /// Open a netlink connection. Must be called within a tokio runtime.
    pub fn new() -> Result<Self, FetchError> {
        let (connection, handle, _) =
            new_connection().map_err(|e| FetchError::Connection(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(connection);

        Ok(Self { handle })
    }
}

impl RoutingSource for RtNetlinkSource {
    async fn list_links(&self) -> Result<Vec<Link>, FetchError> {
        let messages: Vec<_> = self
            .handle
            .link()
            .get()
            .execute()
            .try_collect()
            .await
            .map_err(|e| FetchError::Links(e.to_string()))?;

        debug!("Fetched {} links", messages.len());
        Ok(messages.iter().map(link_from_message).collect())
    }

    async fn list_routes(
        &self,
        family: AddressFamily,
        scope: TableScope,
    ) -> Result<Vec<RawRoute>, FetchError> {
        let messages: Vec<RouteMessage> = self
            .handle
            .route()
            .get(dump_request(family, scope))
            .execute()
            .try_collect()
            .await
            .map_err(|e| FetchError::Routes {
                family,
                reason: e.to_string(),
            })?;

        let routes = routes_in_scope(&messages, family, scope);

        debug!(
            "Fetched {} {} routes, kept {} in scope",
            messages.len(),
            family,
            routes.len()
        );
        Ok(routes)
    }
}
