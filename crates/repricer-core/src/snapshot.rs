//! Historical price records.
//!
//! A [`HistoricalPriceRecord`] freezes what the competitive set looked like
//! for one product, channel, and quantity tier at the moment of a scrape or
//! reprice, together with what the decision engine made of it.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify::{classify, ClassificationError, RepriceOutcome, ResultCode};
use crate::offers::VendorOffer;
use crate::ranking::Ranking;

/// What the decision engine decided for one price point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    /// Price in effect before the decision.
    pub old_price: Decimal,
    pub new_price: Option<Decimal>,
    /// Target the engine wanted to reach; preferred over `new_price`.
    pub go_to_price: Option<Decimal>,
    pub lowest_vendor: Option<String>,
    pub lowest_price: Option<Decimal>,
    pub comment: Option<String>,
    pub triggered_by_vendor: Option<String>,
    /// Present when the engine attempted a reprice; drives the result code.
    pub reprice: Option<RepriceOutcome>,
}

impl DecisionOutcome {
    /// An outcome that only records the price observed on the catalog.
    #[must_use]
    pub fn observed(current_price: Decimal) -> Self {
        Self {
            old_price: current_price,
            ..Self::default()
        }
    }
}

/// Identifies where a record belongs.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotContext<'a> {
    pub mp_id: &'a str,
    pub channel: &'a str,
    pub vendor_id: &'a str,
    /// Raw catalog payload row shared by every record of the same tick.
    pub api_response_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPriceRecord {
    pub mp_id: String,
    pub channel: String,
    pub vendor_id: String,
    pub min_qty: u32,
    pub existing_price: Decimal,
    /// 1-based rank of the own vendor, `Some(0)` when unranked, `None` when
    /// no decision accompanied the snapshot.
    pub rank: Option<u32>,
    pub lowest_vendor: Option<String>,
    pub lowest_price: Option<Decimal>,
    pub suggested_price: Option<Decimal>,
    pub comment: Option<String>,
    pub max_vendor: Option<String>,
    pub max_vendor_price: Option<Decimal>,
    /// `"{vendor} @ {price} | "` for every vendor strictly between the
    /// lowest and the highest, in ascending order.
    pub other_vendor_list: String,
    /// Distinct vendors present in the raw catalog payload.
    pub vendor_count: u32,
    pub api_response_id: Option<i64>,
    pub triggered_by_vendor: Option<String>,
    pub result: Option<ResultCode>,
}

/// Build the historical record for one ranked tier.
///
/// Without a decision the record is zero-state: existing price `0` and no
/// rank, lowest, suggested price, or comment. The highest and middle vendors
/// are always taken from the ranking.
///
/// # Errors
///
/// Propagates [`ClassificationError`] when the decision carries a reprice
/// outcome that cannot be classified.
pub fn build_snapshot(
    decision: Option<&DecisionOutcome>,
    ranking: &Ranking,
    raw_offers: &[VendorOffer],
    context: SnapshotContext<'_>,
) -> Result<HistoricalPriceRecord, ClassificationError> {
    let highest = ranking.highest();
    let mut record = HistoricalPriceRecord {
        mp_id: context.mp_id.to_string(),
        channel: context.channel.to_string(),
        vendor_id: context.vendor_id.to_string(),
        min_qty: ranking.quantity_tier,
        existing_price: Decimal::ZERO,
        rank: None,
        lowest_vendor: None,
        lowest_price: None,
        suggested_price: None,
        comment: None,
        max_vendor: highest.map(|r| r.offer.vendor_name.clone()),
        max_vendor_price: highest.map(|r| r.unit_price),
        other_vendor_list: format_middle(ranking),
        vendor_count: distinct_vendors(raw_offers),
        api_response_id: context.api_response_id,
        triggered_by_vendor: None,
        result: None,
    };

    let Some(decision) = decision else {
        return Ok(record);
    };

    let lowest = ranking.lowest();
    record.existing_price = decision.old_price;
    record.rank = Some(ranking.rank);
    record.lowest_vendor = decision
        .lowest_vendor
        .clone()
        .or_else(|| lowest.map(|r| r.offer.vendor_name.clone()));
    record.lowest_price = decision.lowest_price.or_else(|| lowest.map(|r| r.unit_price));
    record.suggested_price = decision.go_to_price.or(decision.new_price);
    record.comment.clone_from(&decision.comment);
    record.triggered_by_vendor.clone_from(&decision.triggered_by_vendor);
    record.result = decision
        .reprice
        .as_ref()
        .map(|outcome| classify(Some(outcome)))
        .transpose()?;

    Ok(record)
}

fn format_middle(ranking: &Ranking) -> String {
    ranking
        .middle()
        .iter()
        .fold(String::new(), |mut out, r| {
            let _ = write!(out, "{} @ {} | ", r.offer.vendor_name, r.unit_price);
            out
        })
}

fn distinct_vendors(raw_offers: &[VendorOffer]) -> u32 {
    let mut ids: Vec<&str> = raw_offers.iter().map(|o| o.vendor_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    u32::try_from(ids.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
