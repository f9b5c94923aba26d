pub mod app_config;
pub mod audit;
pub mod classify;
pub mod config;
pub mod offers;
pub mod ranking;
pub mod runs;
pub mod snapshot;
pub mod vendors;

pub use app_config::{AppConfig, Environment, ScrapeSettings, DEFAULT_CHUNK_SIZE};
pub use audit::{MarketStateUpdate, PriceBreakInfo, ProductInfo};
pub use classify::{classify, ClassificationError, RepriceDetail, RepriceOutcome, ResultCode};
pub use config::{load_app_config, load_app_config_from_env};
pub use offers::{PriceBreak, VendorOffer};
pub use ranking::{rank_offers, RankedOffer, Ranking, DEFAULT_FREE_SHIPPING_THRESHOLD};
pub use runs::{ChannelLink, RunContext, RunInfo, RunInfoUpdate, ScrapeProduct, SCRAPE_ONLY_RUN};
pub use snapshot::{build_snapshot, DecisionOutcome, HistoricalPriceRecord, SnapshotContext};
pub use vendors::{
    load_vendors, ChannelConfig, CronConfig, OwnVendors, ProxyEndpoint, ProxyRoute, VendorsFile,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vendors file {path}: {source}")]
    VendorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vendors file: {0}")]
    VendorsFileParse(#[source] serde_yaml::Error),

    #[error("vendors config validation failed: {0}")]
    Validation(String),
}
