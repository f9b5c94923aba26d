//! Competitor catalog response types.
//!
//! The vendor-options endpoint returns a JSON array with one entry per vendor
//! listing the product. Observed quirks:
//!
//! - `vendorId` and `vendorProductId` arrive as numbers on most products and
//!   as strings on a few; both are accepted and kept as strings.
//! - `freeShippingThreshold` is omitted for vendors without one.
//! - `priceBreaks[].active` is omitted on older listings and means active.
//! - Some gateway deployments wrap the array as `{"data": [...]}`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// One vendor's listing as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVendorOffer {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub vendor_product_id: Option<String>,
    #[serde(default)]
    pub vendor_product_code: Option<String>,
    #[serde(deserialize_with = "deserialize_id")]
    pub vendor_id: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_region: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub standard_shipping: Option<Decimal>,
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(default)]
    pub free_shipping_gap: Option<Decimal>,
    #[serde(default)]
    pub inventory: Option<i64>,
    #[serde(default)]
    pub shipping_time: Option<i32>,
    #[serde(default)]
    pub is_backordered: bool,
    #[serde(default)]
    pub badge_id: Option<i64>,
    #[serde(default)]
    pub badge_name: Option<String>,
    #[serde(default)]
    pub arrival_date: Option<String>,
    #[serde(default)]
    pub arrival_business_days: Option<i32>,
    #[serde(default)]
    pub price_breaks: Vec<RawPriceBreak>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPriceBreak {
    pub min_qty: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub promo_addl_descr: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A fetched listing: the payload exactly as received plus its parsed entries.
#[derive(Debug, Clone)]
pub struct CatalogResponse {
    pub payload: serde_json::Value,
    pub offers: Vec<RawVendorOffer>,
}

impl CatalogResponse {
    /// Parse a response body, accepting a bare array or a `{"data": [...]}`
    /// envelope.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the body is not JSON or the entries
    /// do not match [`RawVendorOffer`].
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let payload: serde_json::Value = serde_json::from_str(body)?;
        let entries = match &payload {
            serde_json::Value::Object(map) => map
                .get("data")
                .cloned()
                .unwrap_or(serde_json::Value::Array(Vec::new())),
            other => other.clone(),
        };
        let offers: Vec<RawVendorOffer> = serde_json::from_value(entries)?;
        Ok(Self { payload, offers })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Id {
    Text(String),
    Number(i64),
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        match id {
            Id::Text(s) => s,
            Id::Number(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Id::deserialize(deserializer).map(String::from)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Id>::deserialize(deserializer).map(|id| id.map(String::from))
}
