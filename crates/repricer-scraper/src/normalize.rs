//! Conversion from raw catalog entries into domain and audit types.

use repricer_core::{PriceBreak, PriceBreakInfo, ProductInfo, VendorOffer};
use rust_decimal::Decimal;

use crate::types::RawVendorOffer;

/// Map a raw catalog entry onto the [`VendorOffer`] the ranking works with.
///
/// Missing standard shipping is treated as free shipping.
#[must_use]
pub fn normalize_offer(raw: &RawVendorOffer) -> VendorOffer {
    VendorOffer {
        vendor_id: raw.vendor_id.clone(),
        vendor_name: raw.vendor_name.clone(),
        price_breaks: raw
            .price_breaks
            .iter()
            .map(|pb| PriceBreak {
                min_qty: pb.min_qty,
                unit_price: pb.unit_price,
                active: pb.active,
                promo_descriptor: pb.promo_addl_descr.clone(),
            })
            .collect(),
        shipping_cost: raw.standard_shipping.unwrap_or(Decimal::ZERO),
        free_shipping_threshold: raw.free_shipping_threshold,
        in_stock: raw.in_stock,
        inventory: raw.inventory,
    }
}

/// Audit row for one competitor entry of a run chunk.
#[must_use]
pub fn product_info(raw: &RawVendorOffer, run_info_id: i64, mp_id: &str) -> ProductInfo {
    ProductInfo {
        run_info_id,
        mp_id: mp_id.to_string(),
        vendor_id: raw.vendor_id.clone(),
        vendor_name: raw.vendor_name.clone(),
        vendor_product_id: raw.vendor_product_id.clone(),
        vendor_product_code: raw.vendor_product_code.clone(),
        in_stock: raw.in_stock,
        inventory: raw.inventory,
        standard_shipping: raw.standard_shipping.unwrap_or(Decimal::ZERO),
        free_shipping_threshold: raw.free_shipping_threshold,
        shipping_time: raw.shipping_time,
        is_backordered: raw.is_backordered,
        badge_name: raw.badge_name.clone(),
    }
}

/// Audit rows for every price break of `raw`, active or not, in listing order.
#[must_use]
pub fn price_break_infos(raw: &RawVendorOffer, product_info_id: i64) -> Vec<PriceBreakInfo> {
    raw.price_breaks
        .iter()
        .map(|pb| PriceBreakInfo {
            product_info_id,
            min_qty: i32::try_from(pb.min_qty).unwrap_or(i32::MAX),
            unit_price: pb.unit_price,
            promo_descriptor: pb.promo_addl_descr.clone(),
            active: pb.active,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawPriceBreak;

    fn raw() -> RawVendorOffer {
        RawVendorOffer {
            vendor_product_id: Some("884411".to_string()),
            vendor_product_code: Some("FRN-22".to_string()),
            vendor_id: "20722".to_string(),
            vendor_name: "Frontier Dental".to_string(),
            vendor_region: None,
            in_stock: true,
            standard_shipping: None,
            free_shipping_threshold: Some(Decimal::new(99, 0)),
            free_shipping_gap: None,
            inventory: Some(12),
            shipping_time: Some(3),
            is_backordered: false,
            badge_id: None,
            badge_name: Some("Top Seller".to_string()),
            arrival_date: None,
            arrival_business_days: None,
            price_breaks: vec![
                RawPriceBreak {
                    min_qty: 1,
                    unit_price: Decimal::new(1099, 2),
                    promo_addl_descr: None,
                    active: true,
                },
                RawPriceBreak {
                    min_qty: 6,
                    unit_price: Decimal::new(1029, 2),
                    promo_addl_descr: Some("Short exp 03/27".to_string()),
                    active: false,
                },
            ],
        }
    }

    #[test]
    fn normalize_offer_defaults_missing_shipping_to_zero() {
        let offer = normalize_offer(&raw());
        assert_eq!(offer.shipping_cost, Decimal::ZERO);
        assert_eq!(offer.free_shipping_threshold, Some(Decimal::new(99, 0)));
        assert_eq!(offer.price_breaks.len(), 2);
        assert!(offer.price_breaks[1].is_short_expiry());
        assert_eq!(offer.unit_price_at(1), Some(Decimal::new(1099, 2)));
        assert_eq!(offer.unit_price_at(6), None);
    }

    #[test]
    fn product_info_carries_run_and_listing_fields() {
        let info = product_info(&raw(), 7, "MP-100");
        assert_eq!(info.run_info_id, 7);
        assert_eq!(info.mp_id, "MP-100");
        assert_eq!(info.vendor_product_code.as_deref(), Some("FRN-22"));
        assert_eq!(info.badge_name.as_deref(), Some("Top Seller"));
        assert_eq!(info.inventory, Some(12));
    }

    #[test]
    fn price_break_infos_keep_inactive_breaks() {
        let rows = price_break_infos(&raw(), 99);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.product_info_id == 99));
        assert!(!rows[1].active);
        assert_eq!(rows[1].min_qty, 6);
    }
}
