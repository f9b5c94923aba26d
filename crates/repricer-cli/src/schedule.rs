//! Cron-driven scrape runs.
//!
//! One job per enabled cron in the vendors file. A cron whose previous run
//! is still in flight skips the tick rather than starting a second run.

use std::sync::Arc;

use repricer_core::{AppConfig, CronConfig, VendorsFile};
use repricer_runner::PgStore;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::scrape::{build_orchestrator, scrape_cron, PgOrchestrator};

struct CronRunner {
    orchestrator: PgOrchestrator,
    store: PgStore,
    vendors: VendorsFile,
    cancel: CancellationToken,
}

pub(crate) async fn run_schedule(pool: sqlx::PgPool, config: AppConfig) -> anyhow::Result<()> {
    let vendors = repricer_core::load_vendors(&config.vendors_path)?;
    let crons: Vec<CronConfig> = enabled_crons(&vendors);
    if crons.is_empty() {
        anyhow::bail!("no enabled crons in {}", config.vendors_path.display());
    }

    let cancel = CancellationToken::new();
    let runner = Arc::new(CronRunner {
        orchestrator: build_orchestrator(pool.clone(), &config, &vendors)?,
        store: PgStore::new(pool),
        vendors,
        cancel: cancel.clone(),
    });

    let scheduler = JobScheduler::new().await?;
    for cron in crons {
        register_cron_job(&scheduler, Arc::clone(&runner), cron).await?;
    }
    scheduler.start().await?;
    tracing::info!("scheduler started; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::warn!("interrupt received — cancelling in-flight runs");
    cancel.cancel();
    let mut scheduler = scheduler;
    scheduler.shutdown().await?;
    Ok(())
}

pub(crate) fn enabled_crons(vendors: &VendorsFile) -> Vec<CronConfig> {
    vendors.crons.iter().filter(|c| c.enabled).cloned().collect()
}

async fn register_cron_job(
    scheduler: &JobScheduler,
    runner: Arc<CronRunner>,
    cron: CronConfig,
) -> anyhow::Result<()> {
    let schedule = cron.schedule.clone();
    let cron = Arc::new(cron);
    let in_flight = Arc::new(Mutex::new(()));

    let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let runner = Arc::clone(&runner);
        let cron = Arc::clone(&cron);
        let in_flight = Arc::clone(&in_flight);

        Box::pin(async move {
            let Ok(_guard) = in_flight.try_lock() else {
                tracing::warn!(cron = %cron.name, "previous run still in flight; skipping tick");
                return;
            };
            tracing::info!(cron = %cron.name, "scheduler: starting scrape run");
            match scrape_cron(
                &runner.orchestrator,
                &runner.store,
                &runner.vendors,
                &cron,
                &runner.cancel,
            )
            .await
            {
                Ok(Some(summary)) => tracing::info!(
                    cron = %cron.name,
                    run_key = %summary.run_key,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    cancelled = summary.cancelled,
                    "scheduler: scrape run finished"
                ),
                Ok(None) => {}
                Err(e) => tracing::error!(cron = %cron.name, error = %e, "scheduler: scrape run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule = %schedule, "registered scrape job");
    Ok(())
}
