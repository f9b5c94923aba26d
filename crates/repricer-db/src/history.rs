//! Database operations for `historical_api_responses` and `price_history`.

use chrono::{DateTime, Utc};
use repricer_core::{HistoricalPriceRecord, ResultCode};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::{to_i32, DbError};

/// A row from the `price_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub id: i64,
    pub mp_id: String,
    pub channel: String,
    pub vendor_id: String,
    pub min_qty: i32,
    pub existing_price: Decimal,
    pub rank: Option<i32>,
    pub lowest_vendor: Option<String>,
    pub lowest_price: Option<Decimal>,
    pub suggested_price: Option<Decimal>,
    pub comment: Option<String>,
    pub max_vendor: Option<String>,
    pub max_vendor_price: Option<Decimal>,
    pub other_vendor_list: String,
    pub vendor_count: i32,
    pub api_response_id: Option<i64>,
    pub triggered_by_vendor: Option<String>,
    /// Stored as the wire name of [`ResultCode`], e.g. `"CHANGE_DOWN"`.
    pub result: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Stores a raw catalog payload and returns its `id` for history rows to
/// reference.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_historical_api_response(
    pool: &PgPool,
    payload: &serde_json::Value,
    captured_at: DateTime<Utc>,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO historical_api_responses (payload, captured_at) \
         VALUES ($1, $2) \
         RETURNING id",
    )
    .bind(Json(payload))
    .bind(captured_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Appends one historical price record. Rows are never updated afterwards.
///
/// # Errors
///
/// Returns [`DbError::OutOfRange`] if a count does not fit the column, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_price_history(
    pool: &PgPool,
    record: &HistoricalPriceRecord,
    recorded_at: DateTime<Utc>,
) -> Result<i64, DbError> {
    let min_qty = to_i32("min_qty", record.min_qty)?;
    let rank = record.rank.map(|r| to_i32("rank", r)).transpose()?;
    let vendor_count = to_i32("vendor_count", record.vendor_count)?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO price_history \
             (mp_id, channel, vendor_id, min_qty, existing_price, rank, lowest_vendor, \
              lowest_price, suggested_price, comment, max_vendor, max_vendor_price, \
              other_vendor_list, vendor_count, api_response_id, triggered_by_vendor, \
              result, recorded_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18) \
         RETURNING id",
    )
    .bind(&record.mp_id)
    .bind(&record.channel)
    .bind(&record.vendor_id)
    .bind(min_qty)
    .bind(record.existing_price)
    .bind(rank)
    .bind(&record.lowest_vendor)
    .bind(record.lowest_price)
    .bind(record.suggested_price)
    .bind(&record.comment)
    .bind(&record.max_vendor)
    .bind(record.max_vendor_price)
    .bind(&record.other_vendor_list)
    .bind(vendor_count)
    .bind(record.api_response_id)
    .bind(&record.triggered_by_vendor)
    .bind(record.result.map(ResultCode::as_str))
    .bind(recorded_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the most recent `limit` history rows for a product, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_history(
    pool: &PgPool,
    mp_id: &str,
    limit: i64,
) -> Result<Vec<PriceHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, PriceHistoryRow>(
        "SELECT id, mp_id, channel, vendor_id, min_qty, existing_price, rank, lowest_vendor, \
                lowest_price, suggested_price, comment, max_vendor, max_vendor_price, \
                other_vendor_list, vendor_count, api_response_id, triggered_by_vendor, \
                result, recorded_at \
         FROM price_history \
         WHERE mp_id = $1 \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(mp_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
