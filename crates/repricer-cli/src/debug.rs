//! Offline debugging surfaces over the ranking and classification engines.

use std::path::Path;

use anyhow::Context;
use repricer_core::{classify, rank_offers, Ranking, RepriceOutcome, ResultCode, VendorOffer};
use repricer_scraper::{normalize_offer, CatalogResponse};

pub(crate) fn run_rank(
    payload: &Path,
    vendor_id: &str,
    tier: u32,
    include_shipping: bool,
) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(payload)
        .with_context(|| format!("failed to read {}", payload.display()))?;
    let ranking = rank_payload(&body, vendor_id, tier, include_shipping)?;
    println!("{}", serde_json::to_string_pretty(&ranking)?);
    Ok(())
}

pub(crate) fn run_classify(outcome: &Path) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(outcome)
        .with_context(|| format!("failed to read {}", outcome.display()))?;
    let code = classify_json(&body)?;
    println!("{}", serde_json::json!({ "result": code }));
    Ok(())
}

pub(crate) fn rank_payload(
    body: &str,
    vendor_id: &str,
    tier: u32,
    include_shipping: bool,
) -> anyhow::Result<Ranking> {
    let response = CatalogResponse::from_body(body).context("payload is not a vendor listing")?;
    let offers: Vec<VendorOffer> = response.offers.iter().map(normalize_offer).collect();
    Ok(rank_offers(&offers, tier, include_shipping, vendor_id))
}

/// `null` is accepted and reported as a missing outcome.
pub(crate) fn classify_json(body: &str) -> anyhow::Result<ResultCode> {
    let outcome: Option<RepriceOutcome> =
        serde_json::from_str(body).context("outcome is not valid JSON")?;
    Ok(classify(outcome.as_ref())?)
}
