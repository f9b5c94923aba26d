//! Database operations for the per-run competitor audit tables
//! `product_info` and `price_break_info`.

use repricer_core::{PriceBreakInfo, ProductInfo};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `product_info` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductInfoRow {
    pub id: i64,
    pub run_info_id: i64,
    pub mp_id: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub in_stock: bool,
    pub inventory: Option<i64>,
    pub standard_shipping: Decimal,
}

/// Inserts one competitor entry and returns its `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_product_info(pool: &PgPool, info: &ProductInfo) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO product_info \
             (run_info_id, mp_id, vendor_id, vendor_name, vendor_product_id, \
              vendor_product_code, in_stock, inventory, standard_shipping, \
              free_shipping_threshold, shipping_time, is_backordered, badge_name) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING id",
    )
    .bind(info.run_info_id)
    .bind(&info.mp_id)
    .bind(&info.vendor_id)
    .bind(&info.vendor_name)
    .bind(&info.vendor_product_id)
    .bind(&info.vendor_product_code)
    .bind(info.in_stock)
    .bind(info.inventory)
    .bind(info.standard_shipping)
    .bind(info.free_shipping_threshold)
    .bind(info.shipping_time)
    .bind(info.is_backordered)
    .bind(&info.badge_name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Inserts one price break of an audited competitor entry.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_price_break_info(
    pool: &PgPool,
    price_break: &PriceBreakInfo,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO price_break_info \
             (product_info_id, min_qty, unit_price, promo_descriptor, active) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(price_break.product_info_id)
    .bind(price_break.min_qty)
    .bind(price_break.unit_price)
    .bind(&price_break.promo_descriptor)
    .bind(price_break.active)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns every competitor entry audited under one `run_info` row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_info_for_run(
    pool: &PgPool,
    run_info_id: i64,
) -> Result<Vec<ProductInfoRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductInfoRow>(
        "SELECT id, run_info_id, mp_id, vendor_id, vendor_name, in_stock, inventory, \
                standard_shipping \
         FROM product_info \
         WHERE run_info_id = $1 \
         ORDER BY id",
    )
    .bind(run_info_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
