use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Products per `run_info` chunk unless `REPRICER_SCRAPE_CHUNK_SIZE` says
/// otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Batch-shape and telemetry switches for a scrape run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSettings {
    /// Products per `run_info` chunk. Batches larger than this are split.
    ///
    /// Production runs keep [`DEFAULT_CHUNK_SIZE`]. Overriding it changes how
    /// many `run_info` rows a run produces; smaller values suit local runs.
    pub chunk_size: usize,
    /// Maximum catalog fetches in flight within one chunk.
    pub concurrency: usize,
    /// Write one historical price record per linked channel and tier.
    pub history_logging: bool,
    /// Write product-info and price-break audit rows per competitor entry and
    /// push the operator's own market state.
    pub run_info_logging: bool,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: 1,
            history_logging: true,
            run_info_logging: true,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub vendors_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Catalog endpoint with a `{mp_id}` placeholder.
    pub catalog_url_template: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_ms: u64,
    pub scrape: ScrapeSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("vendors_path", &self.vendors_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("catalog_url_template", &self.catalog_url_template)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_ms",
                &self.scraper_retry_backoff_base_ms,
            )
            .field("scrape", &self.scrape)
            .finish()
    }
}
