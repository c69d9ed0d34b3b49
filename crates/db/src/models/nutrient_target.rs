//! Daily nutrient target model and DTOs.

use std::collections::BTreeMap;

use nutrilog_core::nutrients::{NutrientId, NutrientTarget};
use nutrilog_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// Row from the `nutrient_targets` table. `NULL` columns are unset targets.
#[derive(Debug, Clone, FromRow)]
pub struct NutrientTargetRow {
    pub user_id: DbId,
    pub energy_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub calculated_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Row from the `nutrient_target_extras` table.
#[derive(Debug, Clone, FromRow)]
pub struct NutrientTargetExtra {
    pub nutrient_id: i32,
    pub amount: f64,
}

impl NutrientTargetRow {
    pub fn into_target(self, extras: Vec<NutrientTargetExtra>) -> NutrientTarget {
        NutrientTarget {
            energy_kcal: self.energy_kcal,
            protein_g: self.protein_g,
            carbohydrate_g: self.carbohydrate_g,
            fat_g: self.fat_g,
            other: extras_map(extras),
            calculated_at: self.calculated_at,
        }
    }
}

/// Extra-nutrient rows keyed by nutrient id. Rows with an invalid id are
/// skipped.
pub fn extras_map(extras: Vec<NutrientTargetExtra>) -> BTreeMap<NutrientId, f64> {
    extras
        .into_iter()
        .filter_map(|e| u32::try_from(e.nutrient_id).ok().map(|id| (NutrientId(id), e.amount)))
        .collect()
}

/// DTO written by the target formula service.
#[derive(Debug, Default, Deserialize)]
pub struct UpsertNutrientTarget {
    pub energy_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub other: BTreeMap<NutrientId, f64>,
    pub calculated_at: Option<Timestamp>,
}
