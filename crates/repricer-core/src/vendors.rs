use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One of the operator's own sales channels on the competitor catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, e.g. `"TRADENT"`. Used as the market-state key.
    pub name: String,
    /// Vendor id the catalog reports for this channel's listings.
    pub vendor_id: String,
    /// Vendor display name as it appears in catalog payloads.
    pub vendor_name: String,
    /// Rank on landed price (unit + shipping) rather than unit price.
    #[serde(default)]
    pub include_shipping: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ProxyEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyEndpoint")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// A named pool of outbound proxies. Requests rotate across `endpoints`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRoute {
    pub name: String,
    pub endpoints: Vec<ProxyEndpoint>,
}

/// A scheduled scrape. `proxy` names a [`ProxyRoute`]; `None` fetches directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronConfig {
    pub id: String,
    pub name: String,
    /// Six-field cron expression (seconds first).
    pub schedule: String,
    pub proxy: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorsFile {
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub proxies: Vec<ProxyRoute>,
    #[serde(default)]
    pub crons: Vec<CronConfig>,
}

impl VendorsFile {
    #[must_use]
    pub fn proxy(&self, name: &str) -> Option<&ProxyRoute> {
        self.proxies.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn cron(&self, id_or_name: &str) -> Option<&CronConfig> {
        self.crons
            .iter()
            .find(|c| c.id == id_or_name || c.name == id_or_name)
    }

    #[must_use]
    pub fn own_vendors(&self) -> OwnVendors {
        OwnVendors::from_channels(&self.channels)
    }
}

/// Lookup from catalog vendor id to the operator's channel name.
///
/// Read-only for the lifetime of a run.
#[derive(Debug, Clone, Default)]
pub struct OwnVendors {
    by_vendor_id: HashMap<String, String>,
}

impl OwnVendors {
    #[must_use]
    pub fn from_channels(channels: &[ChannelConfig]) -> Self {
        let by_vendor_id = channels
            .iter()
            .map(|c| (c.vendor_id.clone(), c.name.clone()))
            .collect();
        Self { by_vendor_id }
    }

    #[must_use]
    pub fn channel_for(&self, vendor_id: &str) -> Option<&str> {
        self.by_vendor_id.get(vendor_id).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, vendor_id: &str) -> bool {
        self.by_vendor_id.contains_key(vendor_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_vendor_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_vendor_id.is_empty()
    }
}

/// Load and validate the vendor channel configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vendors(path: &Path) -> Result<VendorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VendorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_vendors(&content)
}

pub(crate) fn parse_vendors(content: &str) -> Result<VendorsFile, ConfigError> {
    let vendors_file: VendorsFile =
        serde_yaml::from_str(content).map_err(ConfigError::VendorsFileParse)?;

    validate_vendors(&vendors_file)?;

    Ok(vendors_file)
}

fn validate_vendors(vendors_file: &VendorsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_ids = HashSet::new();

    for channel in &vendors_file.channels {
        if channel.name.trim().is_empty() || channel.vendor_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "channel name and vendor_id must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(channel.name.to_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate channel name: '{}'",
                channel.name
            )));
        }

        if !seen_ids.insert(channel.vendor_id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate vendor_id '{}' (channel '{}')",
                channel.vendor_id, channel.name
            )));
        }
    }

    let mut seen_proxies = HashSet::new();
    for proxy in &vendors_file.proxies {
        if !seen_proxies.insert(proxy.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate proxy route: '{}'",
                proxy.name
            )));
        }
        if proxy.endpoints.is_empty() {
            return Err(ConfigError::Validation(format!(
                "proxy route '{}' has no endpoints",
                proxy.name
            )));
        }
    }

    let mut seen_crons = HashSet::new();
    for cron in &vendors_file.crons {
        if !seen_crons.insert(cron.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate cron id: '{}'",
                cron.id
            )));
        }
        if let Some(proxy) = &cron.proxy {
            if !seen_proxies.contains(proxy.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "cron '{}' references unknown proxy route '{proxy}'",
                    cron.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "vendors_test.rs"]
mod tests;
