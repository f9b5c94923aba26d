use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price offered at a given minimum order quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreak {
    pub min_qty: u32,
    pub unit_price: Decimal,
    pub active: bool,
    /// Free-text promotion note, e.g. `"SHORT EXPIRY"`.
    pub promo_descriptor: Option<String>,
}

impl PriceBreak {
    /// `true` when the promo note marks short-dated stock (`EXP` / `SHORT`,
    /// case-insensitive).
    #[must_use]
    pub fn is_short_expiry(&self) -> bool {
        self.promo_descriptor.as_deref().is_some_and(|promo| {
            let upper = promo.to_uppercase();
            upper.contains("EXP") || upper.contains("SHORT")
        })
    }
}

/// One competitor's listing for a product, as of a single scrape tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorOffer {
    pub vendor_id: String,
    pub vendor_name: String,
    pub price_breaks: Vec<PriceBreak>,
    pub shipping_cost: Decimal,
    /// Order value at which shipping becomes free. `None` when the vendor
    /// does not publish one.
    pub free_shipping_threshold: Option<Decimal>,
    pub in_stock: bool,
    pub inventory: Option<i64>,
}

impl VendorOffer {
    /// Active price breaks at exactly `min_qty`, in listing order.
    pub fn active_breaks_at(&self, min_qty: u32) -> impl Iterator<Item = &PriceBreak> {
        self.price_breaks
            .iter()
            .filter(move |pb| pb.active && pb.min_qty == min_qty)
    }

    /// Unit price at `min_qty`. When the vendor lists the tier more than
    /// once the last listed break wins.
    #[must_use]
    pub fn unit_price_at(&self, min_qty: u32) -> Option<Decimal> {
        self.active_breaks_at(min_qty).last().map(|pb| pb.unit_price)
    }

    /// Distinct quantity tiers across the vendor's active breaks, ascending.
    #[must_use]
    pub fn active_tiers(&self) -> Vec<u32> {
        let mut tiers: Vec<u32> = self
            .price_breaks
            .iter()
            .filter(|pb| pb.active)
            .map(|pb| pb.min_qty)
            .collect();
        tiers.sort_unstable();
        tiers.dedup();
        tiers
    }
}
