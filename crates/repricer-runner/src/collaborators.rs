//! Seams between the orchestrator and the outside world.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use repricer_core::{
    HistoricalPriceRecord, MarketStateUpdate, PriceBreakInfo, ProductInfo, RunContext, RunInfo,
    RunInfoUpdate,
};
use repricer_db::DbError;
use repricer_scraper::{CatalogResponse, ScraperError};
use uuid::Uuid;

/// Source of competitor listings.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the listing for `mp_id`. `Ok(None)` means the catalog has no
    /// data for the product. `sequence` is the product's position in the
    /// run and drives proxy rotation.
    async fn fetch(
        &self,
        mp_id: &str,
        context: &RunContext,
        sequence: usize,
    ) -> Result<Option<CatalogResponse>, ScraperError>;
}

/// Every write the orchestrator performs.
#[async_trait]
pub trait ScrapeStore: Send + Sync {
    async fn insert_run_completion(&self, run_key: Uuid, run_type: &str) -> Result<(), DbError>;

    async fn mark_run_completed(&self, run_key: Uuid, run_type: &str) -> Result<(), DbError>;

    async fn insert_run_info(&self, info: &RunInfo) -> Result<i64, DbError>;

    async fn update_run_info(&self, id: i64, update: &RunInfoUpdate) -> Result<(), DbError>;

    async fn update_last_scrape(&self, mp_id: &str, at: DateTime<Utc>) -> Result<(), DbError>;

    async fn insert_api_response(
        &self,
        payload: &serde_json::Value,
        at: DateTime<Utc>,
    ) -> Result<i64, DbError>;

    async fn insert_history(
        &self,
        record: &HistoricalPriceRecord,
        at: DateTime<Utc>,
    ) -> Result<i64, DbError>;

    async fn insert_product_info(&self, info: &ProductInfo) -> Result<i64, DbError>;

    async fn insert_price_break(&self, price_break: &PriceBreakInfo) -> Result<(), DbError>;

    /// `Ok(None)` when the product is not linked to `channel`.
    async fn update_market_state(
        &self,
        mp_id: &str,
        channel: &str,
        update: &MarketStateUpdate,
    ) -> Result<Option<u64>, DbError>;
}
