//! Repository for `nutrient_targets` and `nutrient_target_extras`.

use nutrilog_core::nutrients::NutrientTarget;
use nutrilog_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::nutrient_target::{
    extras_map, NutrientTargetExtra, NutrientTargetRow, UpsertNutrientTarget,
};

const COLUMNS: &str = "user_id, energy_kcal, protein_g, carbohydrate_g, fat_g, calculated_at, updated_at";

/// Read and write per-user daily targets.
pub struct NutrientTargetRepo;

impl NutrientTargetRepo {
    /// Targets for `user_id`, or `None` when the user has none configured.
    pub async fn find_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Option<NutrientTarget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM nutrient_targets WHERE user_id = $1");
        let row = sqlx::query_as::<_, NutrientTargetRow>(&query)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

        let extras = sqlx::query_as::<_, NutrientTargetExtra>(
            "SELECT nutrient_id, amount FROM nutrient_target_extras
             WHERE user_id = $1 ORDER BY nutrient_id",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(match row {
            Some(row) => Some(row.into_target(extras)),
            None if extras.is_empty() => None,
            None => Some(NutrientTarget {
                other: extras_map(extras),
                ..Default::default()
            }),
        })
    }

    /// Replace the user's targets, including every extra nutrient.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertNutrientTarget,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO nutrient_targets
                (user_id, energy_kcal, protein_g, carbohydrate_g, fat_g, calculated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id) DO UPDATE SET
                energy_kcal = EXCLUDED.energy_kcal,
                protein_g = EXCLUDED.protein_g,
                carbohydrate_g = EXCLUDED.carbohydrate_g,
                fat_g = EXCLUDED.fat_g,
                calculated_at = EXCLUDED.calculated_at,
                updated_at = now()",
        )
        .bind(user_id)
        .bind(input.energy_kcal)
        .bind(input.protein_g)
        .bind(input.carbohydrate_g)
        .bind(input.fat_g)
        .bind(input.calculated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM nutrient_target_extras WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (nutrient_id, amount) in &input.other {
            sqlx::query(
                "INSERT INTO nutrient_target_extras (user_id, nutrient_id, amount) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(nutrient_id.0 as i32)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(user_id, extras = input.other.len(), "Nutrient targets replaced");
        Ok(())
    }
}
