//! Competitive-set construction and own-vendor ranking.
//!
//! [`rank_offers`] turns the raw offers for one product into the ordered set
//! of vendors that actually compete at a quantity tier, then locates the
//! operator's own listing inside it.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::offers::{PriceBreak, VendorOffer};

/// Threshold assumed when a vendor publishes none, so shipping always applies.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(999_999, 0, 0, false, 0);

/// An eligible offer with its tier price resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedOffer {
    /// The vendor's offer with duplicate breaks at the tier collapsed to one.
    pub offer: VendorOffer,
    pub unit_price: Decimal,
    /// Price used for ordering: unit price, plus shipping when requested.
    pub landed_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub quantity_tier: u32,
    /// Unique per vendor, ascending by landed price.
    pub eligible: Vec<RankedOffer>,
    /// 1-based position of the own vendor in `eligible`; `0` when absent.
    pub rank: u32,
}

impl Ranking {
    #[must_use]
    pub fn lowest(&self) -> Option<&RankedOffer> {
        self.eligible.first()
    }

    #[must_use]
    pub fn highest(&self) -> Option<&RankedOffer> {
        self.eligible.last()
    }

    /// Offers strictly between the lowest and the highest.
    #[must_use]
    pub fn middle(&self) -> &[RankedOffer] {
        if self.eligible.len() > 2 {
            &self.eligible[1..self.eligible.len() - 1]
        } else {
            &[]
        }
    }
}

/// Build the competitive set for `quantity_tier` and rank `own_vendor_id`
/// within it.
///
/// A vendor competes when it has an active break at exactly the tier and
/// none of its active breaks at that tier is short-dated. Only the first
/// eligible offer per vendor id is kept. Sorting is stable, so equal landed
/// prices keep their listing order.
#[must_use]
pub fn rank_offers(
    offers: &[VendorOffer],
    quantity_tier: u32,
    include_shipping: bool,
    own_vendor_id: &str,
) -> Ranking {
    let mut seen_vendors: HashSet<&str> = HashSet::new();

    let mut eligible: Vec<RankedOffer> = offers
        .iter()
        .filter(|offer| is_eligible(offer, quantity_tier))
        .filter(|offer| seen_vendors.insert(offer.vendor_id.as_str()))
        .filter_map(|offer| resolve_tier(offer, quantity_tier, include_shipping))
        .collect();

    eligible.sort_by(|a, b| a.landed_price.cmp(&b.landed_price));

    let rank = eligible
        .iter()
        .position(|r| r.offer.vendor_id == own_vendor_id)
        .map_or(0, |idx| u32::try_from(idx + 1).unwrap_or(u32::MAX));

    Ranking {
        quantity_tier,
        eligible,
        rank,
    }
}

fn is_eligible(offer: &VendorOffer, quantity_tier: u32) -> bool {
    let mut tier_breaks = offer.active_breaks_at(quantity_tier).peekable();
    if tier_breaks.peek().is_none() {
        return false;
    }
    !tier_breaks.any(PriceBreak::is_short_expiry)
}

/// Collapse duplicate active breaks at the tier to the last one listed and
/// compute the landed price.
fn resolve_tier(
    offer: &VendorOffer,
    quantity_tier: u32,
    include_shipping: bool,
) -> Option<RankedOffer> {
    let at_tier = |pb: &PriceBreak| pb.active && pb.min_qty == quantity_tier;
    let keep_idx = offer.price_breaks.iter().rposition(|pb| at_tier(pb))?;
    let unit_price = offer.price_breaks[keep_idx].unit_price;

    let mut collapsed = offer.clone();
    collapsed.price_breaks = offer
        .price_breaks
        .iter()
        .enumerate()
        .filter(|(idx, pb)| !at_tier(*pb) || *idx == keep_idx)
        .map(|(_, pb)| pb.clone())
        .collect();

    let landed_price = if include_shipping {
        let threshold = offer
            .free_shipping_threshold
            .unwrap_or(DEFAULT_FREE_SHIPPING_THRESHOLD);
        if unit_price < threshold {
            unit_price + offer.shipping_cost
        } else {
            unit_price
        }
    } else {
        unit_price
    };

    Some(RankedOffer {
        offer: collapsed,
        unit_price,
        landed_price,
    })
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
