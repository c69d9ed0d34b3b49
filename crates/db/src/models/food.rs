//! Food catalog model and DTOs.

use nutrilog_core::nutrients::NutrientValues;
use nutrilog_core::recommendation::CandidateFood;
use nutrilog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row from the `foods` table. Amounts are per 100 g.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Food {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub carbohydrate_g: f64,
    pub fat_g: f64,
    pub created_at: Timestamp,
}

impl Food {
    pub fn per_100g(&self) -> NutrientValues {
        NutrientValues::new(self.energy_kcal, self.protein_g, self.carbohydrate_g, self.fat_g)
    }
}

impl From<Food> for CandidateFood {
    fn from(food: Food) -> Self {
        let per_100g = food.per_100g();
        CandidateFood {
            food_id: food.id,
            name: food.name,
            category: food.category,
            per_100g,
        }
    }
}

/// DTO for adding a food to the catalog.
#[derive(Debug, Deserialize)]
pub struct CreateFood {
    pub name: String,
    pub category: Option<String>,
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub carbohydrate_g: f64,
    pub fat_g: f64,
}
