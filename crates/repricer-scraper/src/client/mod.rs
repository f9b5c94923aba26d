//! HTTP client for the competitor catalog's vendor-options endpoint.

mod routes;

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use repricer_core::{AppConfig, ProxyRoute};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::CatalogResponse;

use routes::RoutePool;

/// Placeholder substituted with the product id in the URL template.
pub const MP_ID_PLACEHOLDER: &str = "{mp_id}";

/// Escapes everything outside the unreserved set so the id stays one path
/// segment.
const MP_ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct CatalogClientSettings {
    /// Endpoint URL containing [`MP_ID_PLACEHOLDER`].
    pub url_template: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl CatalogClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            url_template: config.catalog_url_template.clone(),
            timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            max_retries: config.scraper_max_retries,
            backoff_base_ms: config.scraper_retry_backoff_base_ms,
        }
    }
}

/// Fetches vendor listings for one product at a time.
///
/// Requests go out directly unless a proxy route is named, in which case
/// they rotate across that route's endpoints by request sequence number.
/// A 404 means the catalog has no listing and yields `Ok(None)`.
pub struct CatalogClient {
    direct: Client,
    routes: RoutePool,
    url_template: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl CatalogClient {
    /// Builds the direct client plus one client per configured proxy endpoint.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if the template lacks the placeholder
    ///   or a proxy URL cannot be parsed.
    /// - [`ScraperError::Http`] if a `reqwest::Client` cannot be constructed.
    pub fn new(
        settings: &CatalogClientSettings,
        proxies: &[ProxyRoute],
    ) -> Result<Self, ScraperError> {
        if !settings.url_template.contains(MP_ID_PLACEHOLDER) {
            return Err(ScraperError::InvalidUrl {
                url: settings.url_template.clone(),
                reason: format!("template must contain {MP_ID_PLACEHOLDER}"),
            });
        }
        Ok(Self {
            direct: build_http_client(settings, None)?,
            routes: RoutePool::build(settings, proxies)?,
            url_template: settings.url_template.clone(),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Number of endpoints behind `route`; `0` when the route is unknown.
    #[must_use]
    pub fn endpoint_count(&self, route: &str) -> usize {
        self.routes.endpoint_count(route)
    }

    /// Fetches the vendor listing for `mp_id`, retrying transient errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnknownProxyRoute`] if `proxy_route` is not configured.
    /// - [`ScraperError::RateLimited`] on HTTP 429 after retries are exhausted.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx, non-404 status.
    /// - [`ScraperError::Http`] on network or TLS failure.
    /// - [`ScraperError::Deserialize`] if the body is not a listing.
    pub async fn fetch_listing(
        &self,
        mp_id: &str,
        proxy_route: Option<&str>,
        sequence: usize,
    ) -> Result<Option<CatalogResponse>, ScraperError> {
        let url = self.listing_url(mp_id)?;
        let client = self.select_client(proxy_route, sequence)?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        mp_id: mp_id.to_string(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    tracing::debug!(mp_id, "catalog has no listing");
                    return Ok(None);
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                CatalogResponse::from_body(&body)
                    .map(Some)
                    .map_err(|e| ScraperError::Deserialize {
                        context: format!("vendor listing for {mp_id}"),
                        source: e,
                    })
            }
        })
        .await
    }

    /// Substitutes the percent-encoded `mp_id` into the URL template.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `mp_id` is empty or all dots
    /// (a dot segment would climb the path) or the result does not parse.
    fn listing_url(&self, mp_id: &str) -> Result<String, ScraperError> {
        let mp_id = mp_id.trim();
        if mp_id.chars().all(|c| c == '.') {
            return Err(ScraperError::InvalidUrl {
                url: self.url_template.clone(),
                reason: format!("product id {mp_id:?} is not a usable path segment"),
            });
        }
        let encoded = utf8_percent_encode(mp_id, MP_ID_ENCODE_SET).to_string();
        let raw = self.url_template.replace(MP_ID_PLACEHOLDER, &encoded);
        reqwest::Url::parse(&raw)
            .map(String::from)
            .map_err(|e| ScraperError::InvalidUrl {
                url: raw,
                reason: e.to_string(),
            })
    }

    fn select_client(
        &self,
        proxy_route: Option<&str>,
        sequence: usize,
    ) -> Result<&Client, ScraperError> {
        match proxy_route {
            None => Ok(&self.direct),
            Some(route) => self.routes.select(route, sequence),
        }
    }
}

fn build_http_client(
    settings: &CatalogClientSettings,
    proxy: Option<reqwest::Proxy>,
) -> Result<Client, ScraperError> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&settings.user_agent);
    if let Some(proxy) = proxy {
        builder = builder.proxy(proxy);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
