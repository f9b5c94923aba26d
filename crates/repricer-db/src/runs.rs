//! Database operations for `run_info` and `run_completion_status`.

use chrono::{DateTime, Utc};
use repricer_core::{RunInfo, RunInfoUpdate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `run_info` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunInfoRow {
    pub id: i64,
    pub run_key: Uuid,
    pub cron_id: String,
    pub cron_name: String,
    pub run_start: DateTime<Utc>,
    pub run_end: Option<DateTime<Utc>>,
    pub product_count: i32,
    pub eligible_count: i32,
    pub completed_count: i32,
    pub scraped_success_count: i32,
    pub scraped_failure_count: i32,
}

/// A row from the `run_completion_status` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunCompletionRow {
    pub id: i64,
    pub run_key: Uuid,
    pub run_type: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// run_info operations
// ---------------------------------------------------------------------------

/// Inserts a chunk's progress row and returns its `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_run_info(pool: &PgPool, info: &RunInfo) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO run_info \
             (run_key, cron_id, cron_name, run_start, run_end, product_count, eligible_count, \
              completed_count, scraped_success_count, scraped_failure_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING id",
    )
    .bind(info.run_key)
    .bind(&info.cron_id)
    .bind(&info.cron_name)
    .bind(info.run_start)
    .bind(info.run_end)
    .bind(info.product_count)
    .bind(info.eligible_count)
    .bind(info.completed_count)
    .bind(info.scraped_success_count)
    .bind(info.scraped_failure_count)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Applies a partial update to a `run_info` row. Fields left `None` keep
/// their stored value, so each counter can be written independently.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has the given `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_run_info(
    pool: &PgPool,
    id: i64,
    update: &RunInfoUpdate,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE run_info SET \
             completed_count = COALESCE($2, completed_count), \
             scraped_success_count = COALESCE($3, scraped_success_count), \
             scraped_failure_count = COALESCE($4, scraped_failure_count), \
             run_end = COALESCE($5, run_end) \
         WHERE id = $1",
    )
    .bind(id)
    .bind(update.completed_count)
    .bind(update.scraped_success_count)
    .bind(update.scraped_failure_count)
    .bind(update.run_end)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Returns every chunk row of one logical run, oldest first. Used for
/// progress polling while the run is in flight.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_run_info_for_key(
    pool: &PgPool,
    run_key: Uuid,
) -> Result<Vec<RunInfoRow>, DbError> {
    let rows = sqlx::query_as::<_, RunInfoRow>(
        "SELECT id, run_key, cron_id, cron_name, run_start, run_end, product_count, \
                eligible_count, completed_count, scraped_success_count, scraped_failure_count \
         FROM run_info \
         WHERE run_key = $1 \
         ORDER BY id",
    )
    .bind(run_key)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// run_completion_status operations
// ---------------------------------------------------------------------------

/// Records a run as started but not yet complete.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when the
/// `(run_key, run_type)` pair already exists.
pub async fn insert_run_completion_status(
    pool: &PgPool,
    run_key: Uuid,
    run_type: &str,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO run_completion_status (run_key, run_type, is_completed) \
         VALUES ($1, $2, FALSE) \
         RETURNING id",
    )
    .bind(run_key)
    .bind(run_type)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Flags the run as complete and stamps `completed_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no status row exists for the key and
/// type, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_run_completed(pool: &PgPool, run_key: Uuid, run_type: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE run_completion_status \
         SET is_completed = TRUE, completed_at = NOW() \
         WHERE run_key = $1 AND run_type = $2",
    )
    .bind(run_key)
    .bind(run_type)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Fetches the completion row for one run.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_run_completion_status(
    pool: &PgPool,
    run_key: Uuid,
    run_type: &str,
) -> Result<RunCompletionRow, DbError> {
    sqlx::query_as::<_, RunCompletionRow>(
        "SELECT id, run_key, run_type, is_completed, created_at, completed_at \
         FROM run_completion_status \
         WHERE run_key = $1 AND run_type = $2",
    )
    .bind(run_key)
    .bind(run_type)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
