//! One-shot scrape for a single cron.

use anyhow::Context;
use repricer_core::{AppConfig, CronConfig, RunContext, VendorsFile};
use repricer_runner::{PgStore, RunSummary, ScrapeOrchestrator};
use repricer_scraper::{CatalogClient, CatalogClientSettings};
use tokio_util::sync::CancellationToken;

pub(crate) type PgOrchestrator = ScrapeOrchestrator<CatalogClient, PgStore>;

pub(crate) fn build_orchestrator(
    pool: sqlx::PgPool,
    config: &AppConfig,
    vendors: &VendorsFile,
) -> anyhow::Result<PgOrchestrator> {
    let client = CatalogClient::new(
        &CatalogClientSettings::from_app_config(config),
        &vendors.proxies,
    )
    .context("failed to build catalog client")?;
    Ok(ScrapeOrchestrator::new(
        client,
        PgStore::new(pool),
        vendors.own_vendors(),
        config.scrape.clone(),
    ))
}

pub(crate) fn run_context(cron: &CronConfig) -> RunContext {
    RunContext {
        cron_id: cron.id.clone(),
        cron_name: cron.name.clone(),
        proxy_route: cron.proxy.clone(),
    }
}

/// Load the cron's products and scrape them once.
///
/// Returns `Ok(None)` when no products are assigned to the cron.
pub(crate) async fn scrape_cron(
    orchestrator: &PgOrchestrator,
    store: &PgStore,
    vendors: &VendorsFile,
    cron: &CronConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<RunSummary>> {
    let products = store
        .load_products(&cron.id, &vendors.channels)
        .await
        .with_context(|| format!("failed to load products for cron '{}'", cron.id))?;
    if products.is_empty() {
        tracing::info!(cron = %cron.name, "no products assigned; nothing to scrape");
    }
    let summary = orchestrator
        .execute(&products, &run_context(cron), cancel)
        .await?;
    Ok(summary)
}

pub(crate) async fn run_scrape(
    pool: sqlx::PgPool,
    config: &AppConfig,
    cron_key: &str,
) -> anyhow::Result<()> {
    let vendors = repricer_core::load_vendors(&config.vendors_path)?;
    let cron = vendors
        .cron(cron_key)
        .ok_or_else(|| anyhow::anyhow!("cron '{cron_key}' not found in vendors file"))?
        .clone();

    let store = PgStore::new(pool.clone());
    let orchestrator = build_orchestrator(pool, config, &vendors)?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received — stopping after in-flight products");
            signal_token.cancel();
        }
    });

    match scrape_cron(&orchestrator, &store, &vendors, &cron, &cancel).await? {
        Some(summary) => println!(
            "run {}: {} chunk(s), {} attempted, {} succeeded, {} failed{}",
            summary.run_key,
            summary.chunks,
            summary.attempted,
            summary.succeeded,
            summary.failed,
            if summary.cancelled { " (cancelled)" } else { "" }
        ),
        None => println!("cron '{}' has no products", cron.name),
    }
    Ok(())
}
