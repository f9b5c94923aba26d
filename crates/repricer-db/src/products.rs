//! Database operations for `products` and `product_channels`.

use chrono::{DateTime, Utc};
use repricer_core::MarketStateUpdate;
use sqlx::PgPool;

use crate::DbError;

/// One (product, channel) pair assigned to a cron.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ScrapeTargetRow {
    pub mp_id: String,
    pub channel: String,
}

/// Returns every active channel link assigned to `cron_id`, grouped by
/// product in insertion order so callers can fold consecutive rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrape_targets(
    pool: &PgPool,
    cron_id: &str,
) -> Result<Vec<ScrapeTargetRow>, DbError> {
    let rows = sqlx::query_as::<_, ScrapeTargetRow>(
        "SELECT p.mp_id, pc.channel \
         FROM product_channels pc \
         JOIN products p ON p.id = pc.product_id \
         WHERE pc.cron_id = $1 AND pc.is_active \
         ORDER BY p.id, pc.channel",
    )
    .bind(cron_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Links `mp_id` to `channel` under `cron_id`, creating the product if
/// needed. Re-linking an existing pair moves it to the new cron and
/// reactivates it. Returns the `product_channels.id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either upsert fails.
pub async fn upsert_product_channel(
    pool: &PgPool,
    mp_id: &str,
    channel: &str,
    cron_id: &str,
) -> Result<i64, DbError> {
    let product_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (mp_id) VALUES ($1) \
         ON CONFLICT (mp_id) DO UPDATE SET updated_at = NOW() \
         RETURNING id",
    )
    .bind(mp_id)
    .fetch_one(pool)
    .await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO product_channels (product_id, channel, cron_id) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (product_id, channel) DO UPDATE \
             SET cron_id = EXCLUDED.cron_id, is_active = TRUE \
         RETURNING id",
    )
    .bind(product_id)
    .bind(channel)
    .bind(cron_id)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Stamps the product's `last_scraped_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_last_scrape_info(
    pool: &PgPool,
    mp_id: &str,
    scraped_at: DateTime<Utc>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE products SET last_scraped_at = $2, updated_at = NOW() WHERE mp_id = $1",
    )
    .bind(mp_id)
    .bind(scraped_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Writes fresh market state onto one of the operator's channels. `None`
/// fields keep their stored value.
///
/// Returns `Ok(None)` when the product is not linked to `channel`, otherwise
/// the number of rows updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_market_state(
    pool: &PgPool,
    mp_id: &str,
    channel: &str,
    update: &MarketStateUpdate,
) -> Result<Option<u64>, DbError> {
    let result = sqlx::query(
        "UPDATE product_channels pc SET \
             in_stock = COALESCE($3, pc.in_stock), \
             inventory = COALESCE($4, pc.inventory), \
             our_price = COALESCE($5, pc.our_price), \
             market_state_updated_at = NOW() \
         FROM products p \
         WHERE p.id = pc.product_id AND p.mp_id = $1 AND pc.channel = $2",
    )
    .bind(mp_id)
    .bind(channel)
    .bind(update.in_stock)
    .bind(update.inventory)
    .bind(update.our_price)
    .execute(pool)
    .await?;

    Ok(match result.rows_affected() {
        0 => None,
        n => Some(n),
    })
}
