//! Repository for the `log_entries` table.

use std::collections::BTreeSet;

use nutrilog_core::aggregation::{
    local_date, rescale_serving, scale_per_100g, validate_serving, LogEntry,
};
use nutrilog_core::types::{DbId, LocalDate};
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::log_entry::{CreateLogEntry, LogEntryRow};
use crate::repositories::{FoodRepo, UserRepo};

/// Entry columns joined with the food name. Expects the entry aliased `e`
/// and the food aliased `f`.
const COLUMNS: &str = "e.id, e.user_id, e.food_id, f.name AS food_name, e.serving_g, \
                       e.consumed_at, e.local_date, e.energy_kcal, e.protein_g, \
                       e.carbohydrate_g, e.fat_g";

/// Provides access to logged food entries.
pub struct LogEntryRepo;

impl LogEntryRepo {
    /// Log a food for a user.
    ///
    /// The local date is resolved from the user's current UTC offset and the
    /// contribution is scaled from the food's per-100g profile. Returns `None`
    /// if the user or the food does not exist.
    pub async fn create(pool: &PgPool, input: &CreateLogEntry) -> Result<Option<LogEntry>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(user) = UserRepo::find_by_id(&mut tx, input.user_id).await? else {
            return Ok(None);
        };
        let Some(food) = FoodRepo::find_by_id(&mut tx, input.food_id).await? else {
            return Ok(None);
        };

        let contribution = scale_per_100g(&food.per_100g(), input.serving_g);
        let day = local_date(input.consumed_at, user.utc_offset_minutes);

        let query = format!(
            "WITH e AS (
                INSERT INTO log_entries
                    (user_id, food_id, serving_g, consumed_at, local_date,
                     energy_kcal, protein_g, carbohydrate_g, fat_g)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
             )
             SELECT {COLUMNS} FROM e JOIN foods f ON f.id = e.food_id"
        );
        let row = sqlx::query_as::<_, LogEntryRow>(&query)
            .bind(input.user_id)
            .bind(input.food_id)
            .bind(input.serving_g)
            .bind(input.consumed_at)
            .bind(day)
            .bind(contribution.energy_kcal)
            .bind(contribution.protein_g)
            .bind(contribution.carbohydrate_g)
            .bind(contribution.fat_g)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(entry_id = row.id, user_id = input.user_id, local_date = %day, "Log entry created");
        Ok(Some(row.into()))
    }

    /// Change an entry's serving size and re-derive its contribution.
    ///
    /// Returns `None` if the entry does not exist. A size that is not a
    /// positive number of grams fails with [`RepoError::Validation`] and
    /// leaves the entry untouched.
    pub async fn update_serving(
        pool: &PgPool,
        id: DbId,
        serving_g: f64,
    ) -> Result<Option<LogEntry>, RepoError> {
        validate_serving(serving_g)?;

        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM log_entries e JOIN foods f ON f.id = e.food_id
             WHERE e.id = $1
             FOR UPDATE OF e"
        );
        let current = sqlx::query_as::<_, LogEntryRow>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let updated = rescale_serving(&LogEntry::from(current), serving_g)?;

        sqlx::query(
            "UPDATE log_entries SET
                serving_g = $2, energy_kcal = $3, protein_g = $4,
                carbohydrate_g = $5, fat_g = $6
             WHERE id = $1",
        )
        .bind(id)
        .bind(updated.serving_g)
        .bind(updated.contribution.energy_kcal)
        .bind(updated.contribution.protein_g)
        .bind(updated.contribution.carbohydrate_g)
        .bind(updated.contribution.fat_g)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(entry_id = id, serving_g, "Serving size updated");
        Ok(Some(updated))
    }

    /// Delete an entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM log_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Entries for `user_id` whose local date lies in `[from, to]`, oldest first.
    pub async fn list_for_range(
        conn: &mut PgConnection,
        user_id: DbId,
        from: LocalDate,
        to: LocalDate,
    ) -> Result<Vec<LogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM log_entries e JOIN foods f ON f.id = e.food_id
             WHERE e.user_id = $1 AND e.local_date BETWEEN $2 AND $3
             ORDER BY e.local_date, e.consumed_at, e.id"
        );
        let rows = sqlx::query_as::<_, LogEntryRow>(&query)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(conn)
            .await?;
        Ok(rows.into_iter().map(LogEntry::from).collect())
    }

    /// Every local date on which `user_id` logged at least one entry.
    pub async fn distinct_dates(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<BTreeSet<LocalDate>, sqlx::Error> {
        let rows: Vec<(LocalDate,)> =
            sqlx::query_as("SELECT DISTINCT local_date FROM log_entries WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(conn)
                .await?;
        Ok(rows.into_iter().map(|(d,)| d).collect())
    }
}
