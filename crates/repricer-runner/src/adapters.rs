//! Production bindings of the collaborator traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use repricer_core::{
    ChannelConfig, ChannelLink, HistoricalPriceRecord, MarketStateUpdate, PriceBreakInfo,
    ProductInfo, RunContext, RunInfo, RunInfoUpdate, ScrapeProduct,
};
use repricer_db::{DbError, ScrapeTargetRow};
use repricer_scraper::{CatalogClient, CatalogResponse, ScraperError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::collaborators::{CatalogSource, ScrapeStore};

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch(
        &self,
        mp_id: &str,
        context: &RunContext,
        sequence: usize,
    ) -> Result<Option<CatalogResponse>, ScraperError> {
        self.fetch_listing(mp_id, context.proxy_route.as_deref(), sequence)
            .await
    }
}

/// Postgres-backed [`ScrapeStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the products assigned to `cron_id` with their channel links
    /// resolved against the configured channels.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn load_products(
        &self,
        cron_id: &str,
        channels: &[ChannelConfig],
    ) -> Result<Vec<ScrapeProduct>, DbError> {
        let rows = repricer_db::list_scrape_targets(&self.pool, cron_id).await?;
        Ok(assemble_products(&rows, channels))
    }
}

/// Folds consecutive `(mp_id, channel)` rows into products. Channels missing
/// from the configuration are dropped with a warning; a product whose every
/// channel is unknown is still scraped, just without history records.
#[must_use]
pub fn assemble_products(rows: &[ScrapeTargetRow], channels: &[ChannelConfig]) -> Vec<ScrapeProduct> {
    let mut products: Vec<ScrapeProduct> = Vec::new();
    for row in rows {
        if products.last().is_none_or(|p| p.mp_id != row.mp_id) {
            products.push(ScrapeProduct {
                mp_id: row.mp_id.clone(),
                channels: Vec::new(),
            });
        }
        let Some(config) = channels
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(&row.channel))
        else {
            tracing::warn!(mp_id = %row.mp_id, channel = %row.channel, "channel not configured — skipping link");
            continue;
        };
        if let Some(product) = products.last_mut() {
            product.channels.push(ChannelLink {
                channel: config.name.clone(),
                vendor_id: config.vendor_id.clone(),
                include_shipping: config.include_shipping,
            });
        }
    }
    products
}

#[async_trait]
impl ScrapeStore for PgStore {
    async fn insert_run_completion(&self, run_key: Uuid, run_type: &str) -> Result<(), DbError> {
        repricer_db::insert_run_completion_status(&self.pool, run_key, run_type).await?;
        Ok(())
    }

    async fn mark_run_completed(&self, run_key: Uuid, run_type: &str) -> Result<(), DbError> {
        repricer_db::mark_run_completed(&self.pool, run_key, run_type).await
    }

    async fn insert_run_info(&self, info: &RunInfo) -> Result<i64, DbError> {
        repricer_db::insert_run_info(&self.pool, info).await
    }

    async fn update_run_info(&self, id: i64, update: &RunInfoUpdate) -> Result<(), DbError> {
        repricer_db::update_run_info(&self.pool, id, update).await
    }

    async fn update_last_scrape(&self, mp_id: &str, at: DateTime<Utc>) -> Result<(), DbError> {
        repricer_db::update_last_scrape_info(&self.pool, mp_id, at).await
    }

    async fn insert_api_response(
        &self,
        payload: &serde_json::Value,
        at: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        repricer_db::insert_historical_api_response(&self.pool, payload, at).await
    }

    async fn insert_history(
        &self,
        record: &HistoricalPriceRecord,
        at: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        repricer_db::insert_price_history(&self.pool, record, at).await
    }

    async fn insert_product_info(&self, info: &ProductInfo) -> Result<i64, DbError> {
        repricer_db::insert_product_info(&self.pool, info).await
    }

    async fn insert_price_break(&self, price_break: &PriceBreakInfo) -> Result<(), DbError> {
        repricer_db::insert_price_break_info(&self.pool, price_break).await
    }

    async fn update_market_state(
        &self,
        mp_id: &str,
        channel: &str,
        update: &MarketStateUpdate,
    ) -> Result<Option<u64>, DbError> {
        repricer_db::update_market_state(&self.pool, mp_id, channel, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, vendor_id: &str, include_shipping: bool) -> ChannelConfig {
        ChannelConfig {
            name: name.to_string(),
            vendor_id: vendor_id.to_string(),
            vendor_name: format!("{name} Supply"),
            include_shipping,
        }
    }

    fn row(mp_id: &str, channel: &str) -> ScrapeTargetRow {
        ScrapeTargetRow {
            mp_id: mp_id.to_string(),
            channel: channel.to_string(),
        }
    }

    #[test]
    fn assemble_groups_consecutive_rows_by_product() {
        let channels = [channel("TRADENT", "17357", false), channel("FRONTIER", "20722", true)];
        let rows = [
            row("100", "FRONTIER"),
            row("100", "TRADENT"),
            row("200", "tradent"),
        ];
        let products = assemble_products(&rows, &channels);

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].mp_id, "100");
        assert_eq!(products[0].channels.len(), 2);
        assert_eq!(products[0].channels[0].vendor_id, "20722");
        assert!(products[0].channels[0].include_shipping);
        assert_eq!(products[1].channels[0].channel, "TRADENT");
    }

    #[test]
    fn assemble_keeps_product_when_channel_unknown() {
        let channels = [channel("TRADENT", "17357", false)];
        let products = assemble_products(&[row("300", "UNKNOWN")], &channels);
        assert_eq!(products.len(), 1);
        assert!(products[0].channels.is_empty());
    }

    #[test]
    fn assemble_empty_rows_yields_no_products() {
        assert!(assemble_products(&[], &[]).is_empty());
    }
}
