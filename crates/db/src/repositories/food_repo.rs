//! Repository for the `foods` table.

use nutrilog_core::recommendation::CandidateFilter;
use nutrilog_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::food::{CreateFood, Food};

const COLUMNS: &str = "id, name, category, energy_kcal, protein_g, carbohydrate_g, fat_g, created_at";

/// Provides access to the food catalog.
pub struct FoodRepo;

impl FoodRepo {
    /// Insert a new food, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFood) -> Result<Food, sqlx::Error> {
        let query = format!(
            "INSERT INTO foods (name, category, energy_kcal, protein_g, carbohydrate_g, fat_g)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Food>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.energy_kcal)
            .bind(input.protein_g)
            .bind(input.carbohydrate_g)
            .bind(input.fat_g)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Food>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM foods WHERE id = $1");
        sqlx::query_as::<_, Food>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Foods that pass `filter`, ordered by ID and capped at `limit` rows.
    ///
    /// Every predicate of the filter runs in the query, before the limit, so
    /// rejected foods never take a slot from acceptable ones.
    pub async fn list_candidates(
        conn: &mut PgConnection,
        filter: &CandidateFilter,
        limit: i64,
    ) -> Result<Vec<Food>, sqlx::Error> {
        let blacklist: Vec<String> = filter
            .blacklist
            .iter()
            .map(|k| format!("%{}%", escape_like(&k.to_lowercase())))
            .collect();
        let allowed: Option<Vec<String>> = filter
            .allowed_categories
            .as_ref()
            .map(|cats| cats.iter().map(|c| c.to_lowercase()).collect());
        let max_name_len = i32::try_from(filter.max_name_len).unwrap_or(i32::MAX);

        let query = format!(
            "SELECT {COLUMNS} FROM foods
             WHERE energy_kcal BETWEEN $1 AND $2
               AND char_length(name) <= $3
               AND NOT (lower(name) LIKE ANY($4))
               AND ($5::text[] IS NULL OR category IS NULL OR lower(category) = ANY($5))
             ORDER BY id
             LIMIT $6"
        );
        sqlx::query_as::<_, Food>(&query)
            .bind(filter.min_energy_kcal)
            .bind(filter.max_energy_kcal)
            .bind(max_name_len)
            .bind(blacklist)
            .bind(allowed)
            .bind(limit)
            .fetch_all(conn)
            .await
    }
}

/// Escape `LIKE` wildcards so keywords match literally.
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
