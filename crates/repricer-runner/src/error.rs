use repricer_db::DbError;
use repricer_scraper::ScraperError;
use thiserror::Error;

/// Errors that abort a scrape run.
///
/// Telemetry writes never surface here; they are logged and the run
/// continues. Only a catalog fetch failure or a failed write on the
/// run-completion path stops the batch.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("catalog fetch failed for {mp_id}: {source}")]
    Fetch {
        mp_id: String,
        #[source]
        source: ScraperError,
    },

    #[error("run bookkeeping failed: {0}")]
    Store(#[from] DbError),
}
