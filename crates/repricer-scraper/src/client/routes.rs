//! Outbound proxy pools.

use std::collections::HashMap;

use reqwest::{Client, Proxy};
use repricer_core::{ProxyEndpoint, ProxyRoute};

use crate::error::ScraperError;

use super::{build_http_client, CatalogClientSettings};

/// One pre-built HTTP client per proxy endpoint, keyed by route name.
#[derive(Default)]
pub(super) struct RoutePool {
    routes: HashMap<String, Vec<Client>>,
}

impl RoutePool {
    pub(super) fn build(
        settings: &CatalogClientSettings,
        routes: &[ProxyRoute],
    ) -> Result<Self, ScraperError> {
        let mut pool = HashMap::with_capacity(routes.len());
        for route in routes {
            let clients = route
                .endpoints
                .iter()
                .map(|endpoint| build_http_client(settings, Some(proxy_for(endpoint)?)))
                .collect::<Result<Vec<_>, _>>()?;
            pool.insert(route.name.clone(), clients);
        }
        Ok(Self { routes: pool })
    }

    /// Client for request number `sequence` on `route`, rotating round-robin.
    pub(super) fn select(&self, route: &str, sequence: usize) -> Result<&Client, ScraperError> {
        let clients = self
            .routes
            .get(route)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ScraperError::UnknownProxyRoute(route.to_string()))?;
        Ok(&clients[sequence % clients.len()])
    }

    pub(super) fn endpoint_count(&self, route: &str) -> usize {
        self.routes.get(route).map_or(0, Vec::len)
    }
}

fn proxy_for(endpoint: &ProxyEndpoint) -> Result<Proxy, ScraperError> {
    let proxy = Proxy::all(&endpoint.url).map_err(|e| ScraperError::InvalidUrl {
        url: endpoint.url.clone(),
        reason: format!("not a usable proxy URL: {e}"),
    })?;
    Ok(match &endpoint.username {
        Some(username) => proxy.basic_auth(username, endpoint.password.as_deref().unwrap_or("")),
        None => proxy,
    })
}
