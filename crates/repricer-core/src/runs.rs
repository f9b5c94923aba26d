use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Run type recorded on completion-status rows for scrape batches.
pub const SCRAPE_ONLY_RUN: &str = "SCRAPE_ONLY";

/// Identifies what triggered a run and how the catalog should be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub cron_id: String,
    pub cron_name: String,
    /// Proxy route name from the vendors config; `None` fetches directly.
    pub proxy_route: Option<String>,
}

/// A channel the product is listed on under one of the operator's vendor ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLink {
    pub channel: String,
    pub vendor_id: String,
    pub include_shipping: bool,
}

/// One product in a scrape batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeProduct {
    /// Catalog product id.
    pub mp_id: String,
    pub channels: Vec<ChannelLink>,
}

/// Progress row for one chunk of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Groups every chunk of one logical invocation.
    pub run_key: Uuid,
    pub cron_id: String,
    pub cron_name: String,
    pub run_start: DateTime<Utc>,
    pub run_end: Option<DateTime<Utc>>,
    pub product_count: i32,
    pub eligible_count: i32,
    pub completed_count: i32,
    pub scraped_success_count: i32,
    pub scraped_failure_count: i32,
}

impl RunInfo {
    /// A fresh chunk row with every counter at zero.
    #[must_use]
    pub fn start(run_key: Uuid, context: &RunContext, chunk_len: usize, now: DateTime<Utc>) -> Self {
        let count = i32::try_from(chunk_len).unwrap_or(i32::MAX);
        Self {
            run_key,
            cron_id: context.cron_id.clone(),
            cron_name: context.cron_name.clone(),
            run_start: now,
            run_end: None,
            product_count: count,
            eligible_count: count,
            completed_count: 0,
            scraped_success_count: 0,
            scraped_failure_count: 0,
        }
    }
}

/// Partial update of a `run_info` row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInfoUpdate {
    pub completed_count: Option<i32>,
    pub scraped_success_count: Option<i32>,
    pub scraped_failure_count: Option<i32>,
    pub run_end: Option<DateTime<Utc>>,
}

impl RunInfoUpdate {
    #[must_use]
    pub fn progress(completed_count: i32) -> Self {
        Self {
            completed_count: Some(completed_count),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn finish(success: i32, failure: i32, run_end: DateTime<Utc>) -> Self {
        Self {
            completed_count: None,
            scraped_success_count: Some(success),
            scraped_failure_count: Some(failure),
            run_end: Some(run_end),
        }
    }
}
