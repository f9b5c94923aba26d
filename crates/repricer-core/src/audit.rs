use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One competitor entry observed during a run, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub run_info_id: i64,
    pub mp_id: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_product_id: Option<String>,
    pub vendor_product_code: Option<String>,
    pub in_stock: bool,
    pub inventory: Option<i64>,
    pub standard_shipping: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
    pub shipping_time: Option<i32>,
    pub is_backordered: bool,
    pub badge_name: Option<String>,
}

/// One price break of an audited competitor entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakInfo {
    pub product_info_id: i64,
    pub min_qty: i32,
    pub unit_price: Decimal,
    pub promo_descriptor: Option<String>,
    pub active: bool,
}

/// Fresh market state for one of the operator's channels. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStateUpdate {
    pub in_stock: Option<bool>,
    pub inventory: Option<i64>,
    pub our_price: Option<Decimal>,
}
