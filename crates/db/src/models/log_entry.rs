//! Log entry model and DTOs.

use nutrilog_core::aggregation::LogEntry;
use nutrilog_core::nutrients::NutrientValues;
use nutrilog_core::types::{DbId, LocalDate, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// Row from `log_entries` joined with the food name.
#[derive(Debug, Clone, FromRow)]
pub struct LogEntryRow {
    pub id: DbId,
    pub user_id: DbId,
    pub food_id: DbId,
    pub food_name: String,
    pub serving_g: f64,
    pub consumed_at: Timestamp,
    pub local_date: LocalDate,
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub carbohydrate_g: f64,
    pub fat_g: f64,
}

impl From<LogEntryRow> for LogEntry {
    fn from(row: LogEntryRow) -> Self {
        LogEntry {
            id: row.id,
            food_id: row.food_id,
            food_name: row.food_name,
            serving_g: row.serving_g,
            consumed_at: row.consumed_at,
            local_date: row.local_date,
            contribution: NutrientValues::new(
                row.energy_kcal,
                row.protein_g,
                row.carbohydrate_g,
                row.fat_g,
            ),
        }
    }
}

/// DTO for logging a food. The local date and contribution are derived on
/// insert.
#[derive(Debug, Deserialize)]
pub struct CreateLogEntry {
    pub user_id: DbId,
    pub food_id: DbId,
    pub serving_g: f64,
    pub consumed_at: Timestamp,
}
