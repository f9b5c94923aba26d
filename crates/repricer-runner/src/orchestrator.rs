//! Batch driver for scrape runs.
//!
//! A run splits its products into fixed-size chunks processed one after
//! another. Within a chunk up to `concurrency` catalog fetches are in flight,
//! but results are consumed strictly in submission order by this task alone,
//! so the `run_info` counters always describe a prefix of the chunk.


use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use repricer_core::{
    build_snapshot, rank_offers, DecisionOutcome, MarketStateUpdate, OwnVendors,
    RunContext, RunInfo, RunInfoUpdate, ScrapeProduct, ScrapeSettings, SnapshotContext,
    VendorOffer, SCRAPE_ONLY_RUN,
};
use repricer_scraper::{normalize_offer, price_break_infos, product_info, CatalogResponse};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::collaborators::{CatalogSource, ScrapeStore};
use crate::error::RunError;

/// Totals for one [`ScrapeOrchestrator::execute`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_key: Uuid,
    pub chunks: usize,
    /// Products whose fetch completed.
    pub attempted: usize,
    /// Products whose fetch returned data.
    pub succeeded: usize,
    pub failed: usize,
    /// The run stopped early; its completion row was left incomplete.
    pub cancelled: bool,
}

struct ChunkOutcome {
    completed: i32,
    succeeded: i32,
    failed: i32,
    cancelled: bool,
}

pub struct ScrapeOrchestrator<C, S> {
    catalog: C,
    store: S,
    own_vendors: OwnVendors,
    settings: ScrapeSettings,
}

impl<C, S> ScrapeOrchestrator<C, S>
where
    C: CatalogSource,
    S: ScrapeStore,
{
    #[must_use]
    pub fn new(catalog: C, store: S, own_vendors: OwnVendors, settings: ScrapeSettings) -> Self {
        Self {
            catalog,
            store,
            own_vendors,
            settings,
        }
    }

    /// Scrape `products` under `context`.
    ///
    /// Returns `Ok(None)` without touching the store when `products` is empty.
    ///
    /// # Errors
    ///
    /// - [`RunError::Fetch`] when a catalog fetch fails. The remaining
    ///   products are skipped and neither the chunk nor the run is finalized.
    /// - [`RunError::Store`] when the run-completion row cannot be written.
    pub async fn execute(
        &self,
        products: &[ScrapeProduct],
        context: &RunContext,
        cancel: &CancellationToken,
    ) -> Result<Option<RunSummary>, RunError> {
        if products.is_empty() {
            return Ok(None);
        }

        let run_key = Uuid::new_v4();
        self.store
            .insert_run_completion(run_key, SCRAPE_ONLY_RUN)
            .await?;

        let chunk_size = self.settings.chunk_size.max(1);
        tracing::info!(
            %run_key,
            cron = %context.cron_name,
            products = products.len(),
            chunks = products.len().div_ceil(chunk_size),
            "scrape run started"
        );

        let mut summary = RunSummary {
            run_key,
            chunks: 0,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            cancelled: false,
        };

        for (index, chunk) in products.chunks(chunk_size).enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let outcome = self
                .run_chunk(run_key, index * chunk_size, chunk, context, cancel)
                .await?;
            summary.chunks += 1;
            summary.attempted += count(outcome.completed);
            summary.succeeded += count(outcome.succeeded);
            summary.failed += count(outcome.failed);
            if outcome.cancelled {
                summary.cancelled = true;
                break;
            }
        }

        if summary.cancelled {
            tracing::warn!(
                %run_key,
                attempted = summary.attempted,
                "scrape run cancelled — completion status left open"
            );
            return Ok(Some(summary));
        }

        self.store
            .mark_run_completed(run_key, SCRAPE_ONLY_RUN)
            .await?;
        tracing::info!(
            %run_key,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "scrape run completed"
        );
        Ok(Some(summary))
    }

    async fn run_chunk(
        &self,
        run_key: Uuid,
        offset: usize,
        chunk: &[ScrapeProduct],
        context: &RunContext,
        cancel: &CancellationToken,
    ) -> Result<ChunkOutcome, RunError> {
        let info = RunInfo::start(run_key, context, chunk.len(), Utc::now());
        let eligible = info.eligible_count;
        let run_info_id = match self.store.insert_run_info(&info).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(%run_key, offset, error = %e, "failed to insert run_info");
                None
            }
        };

        let concurrency = self.settings.concurrency.max(1);
        let mut fetches = stream::iter(chunk.iter().enumerate())
            .map(move |(i, product)| async move {
                let result = self
                    .catalog
                    .fetch(&product.mp_id, context, offset + i)
                    .await;
                (product, result)
            })
            .buffered(concurrency)
            .boxed();

        let mut completed: i32 = 0;
        let mut succeeded: i32 = 0;
        let mut cancelled = false;

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                next = fetches.next() => Some(next),
            };
            let Some(next) = next else {
                cancelled = true;
                break;
            };
            let Some((product, result)) = next else {
                break;
            };

            let response = result.map_err(|source| RunError::Fetch {
                mp_id: product.mp_id.clone(),
                source,
            })?;

            if self.record_product(product, response, run_info_id).await {
                succeeded += 1;
            }
            completed += 1;

            if let Some(id) = run_info_id {
                if let Err(e) = self
                    .store
                    .update_run_info(id, &RunInfoUpdate::progress(completed))
                    .await
                {
                    tracing::error!(run_info_id = id, completed, error = %e, "failed to record progress");
                }
            }
        }

        let failed = if cancelled {
            completed - succeeded
        } else {
            eligible - succeeded
        };
        if let Some(id) = run_info_id {
            let update = RunInfoUpdate::finish(succeeded, failed, Utc::now());
            if let Err(e) = self.store.update_run_info(id, &update).await {
                tracing::error!(run_info_id = id, error = %e, "failed to finalize run_info");
            }
        }

        tracing::info!(
            %run_key,
            offset,
            products = chunk.len(),
            completed,
            succeeded,
            failed,
            "chunk finished"
        );

        Ok(ChunkOutcome {
            completed,
            succeeded,
            failed,
            cancelled,
        })
    }

    /// Persist everything derived from one fetched listing. Returns `true`
    /// when the catalog had data for the product.
    async fn record_product(
        &self,
        product: &ScrapeProduct,
        response: Option<CatalogResponse>,
        run_info_id: Option<i64>,
    ) -> bool {
        let Some(response) = response.filter(|r| !r.is_empty()) else {
            tracing::debug!(mp_id = %product.mp_id, "no catalog data");
            return false;
        };

        let now = Utc::now();
        if let Err(e) = self.store.update_last_scrape(&product.mp_id, now).await {
            tracing::error!(mp_id = %product.mp_id, error = %e, "failed to update last scrape time");
        }

        let offers: Vec<VendorOffer> = response.offers.iter().map(normalize_offer).collect();

        if self.settings.history_logging && !product.channels.is_empty() {
            self.record_history(product, &response, &offers, now).await;
        }
        if self.settings.run_info_logging {
            if let Some(id) = run_info_id {
                self.record_audit(product, &response, id).await;
            }
            self.push_market_state(product, &offers).await;
        }

        true
    }

    async fn record_history(
        &self,
        product: &ScrapeProduct,
        response: &CatalogResponse,
        offers: &[VendorOffer],
        now: DateTime<Utc>,
    ) {
        let api_response_id = match self.store.insert_api_response(&response.payload, now).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(mp_id = %product.mp_id, error = %e, "failed to store catalog payload");
                None
            }
        };

        for link in &product.channels {
            let own = offers.iter().find(|o| o.vendor_id == link.vendor_id);
            for tier in scrape_tiers(own) {
                let ranking = rank_offers(offers, tier, link.include_shipping, &link.vendor_id);
                let decision = own
                    .and_then(|o| o.unit_price_at(tier))
                    .map(DecisionOutcome::observed);
                let context = SnapshotContext {
                    mp_id: &product.mp_id,
                    channel: &link.channel,
                    vendor_id: &link.vendor_id,
                    api_response_id,
                };
                let record = match build_snapshot(decision.as_ref(), &ranking, offers, context) {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::error!(mp_id = %product.mp_id, channel = %link.channel, tier, error = %e, "failed to build snapshot");
                        continue;
                    }
                };
                if let Err(e) = self.store.insert_history(&record, now).await {
                    tracing::error!(
                        mp_id = %product.mp_id,
                        channel = %link.channel,
                        tier,
                        rank = ?record.rank,
                        error = %e,
                        "failed to insert price history"
                    );
                }
            }
        }
    }

    async fn record_audit(&self, product: &ScrapeProduct, response: &CatalogResponse, run_info_id: i64) {
        for raw in &response.offers {
            let info = product_info(raw, run_info_id, &product.mp_id);
            let product_info_id = match self.store.insert_product_info(&info).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(
                        mp_id = %product.mp_id,
                        vendor_id = %raw.vendor_id,
                        error = %e,
                        "failed to insert product_info"
                    );
                    continue;
                }
            };
            for price_break in price_break_infos(raw, product_info_id) {
                if let Err(e) = self.store.insert_price_break(&price_break).await {
                    tracing::error!(
                        product_info_id,
                        min_qty = price_break.min_qty,
                        error = %e,
                        "failed to insert price_break_info"
                    );
                }
            }
        }
    }

    /// Refresh stock, inventory and tier-1 price for every entry that is one
    /// of the operator's own. Failures never leave this function.
    async fn push_market_state(&self, product: &ScrapeProduct, offers: &[VendorOffer]) {
        for offer in offers {
            let Some(channel) = self.own_vendors.channel_for(&offer.vendor_id) else {
                continue;
            };
            let update = MarketStateUpdate {
                in_stock: Some(offer.in_stock),
                inventory: offer.inventory,
                our_price: offer.unit_price_at(1),
            };
            match self
                .store
                .update_market_state(&product.mp_id, channel, &update)
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::debug!(mp_id = %product.mp_id, channel, "product not linked to channel");
                }
                Err(e) => {
                    tracing::warn!(mp_id = %product.mp_id, channel, error = %e, "market state update failed");
                }
            }
        }
    }
}

/// Tiers to snapshot for a channel: every tier in the operator's own active
/// breaks, or tier 1 when the operator has no listing.
fn scrape_tiers(own: Option<&VendorOffer>) -> Vec<u32> {
    let tiers = own.map(VendorOffer::active_tiers).unwrap_or_default();
    if tiers.is_empty() {
        vec![1]
    } else {
        tiers
    }
}

fn count(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
