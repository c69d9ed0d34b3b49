//! Foods that contributed most of one nutrient over a look-back window.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregation::{capped_contribution, LogEntry};
use crate::error::CoreError;
use crate::nutrients::NutrientId;
use crate::types::DbId;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
pub const MAX_LOOKBACK_DAYS: u32 = 366;
pub const DEFAULT_CONTRIBUTOR_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodContribution {
    pub food_id: DbId,
    pub food_name: String,
    pub total: f64,
    pub entry_count: u32,
    /// Share of the nutrient's total across all foods in the window.
    pub share_percent: f64,
}

/// Only the tracked macros can be ranked by contribution.
pub fn validate_contributor_nutrient(id: NutrientId) -> Result<NutrientId, CoreError> {
    if !id.is_macro() {
        return Err(CoreError::Validation(format!(
            "nutrient {id} is not supported, expected one of 1003, 1004, 1005, 1008"
        )));
    }
    Ok(id)
}

pub fn validate_lookback_days(days: u32) -> Result<u32, CoreError> {
    if days == 0 || days > MAX_LOOKBACK_DAYS {
        return Err(CoreError::Validation(format!(
            "days must be between 1 and {MAX_LOOKBACK_DAYS}, got {days}"
        )));
    }
    Ok(days)
}

/// Group `entries` by food and rank by total `nutrient`, highest first.
///
/// Foods that contributed nothing are omitted. Ties are broken by ascending
/// food id.
pub fn top_contributors<'a, I>(entries: I, nutrient: NutrientId, limit: usize) -> Vec<FoodContribution>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut by_food: BTreeMap<DbId, FoodContribution> = BTreeMap::new();
    for entry in entries {
        let amount = capped_contribution(&entry.contribution).get(nutrient);
        let row = by_food.entry(entry.food_id).or_insert_with(|| FoodContribution {
            food_id: entry.food_id,
            food_name: entry.food_name.clone(),
            total: 0.0,
            entry_count: 0,
            share_percent: 0.0,
        });
        row.total += amount;
        row.entry_count += 1;
    }

    let grand_total: f64 = by_food.values().map(|r| r.total).sum();
    let mut ranked: Vec<FoodContribution> = by_food.into_values().filter(|r| r.total > 0.0).collect();
    for row in &mut ranked {
        row.share_percent = row.total / grand_total * 100.0;
    }

    ranked.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.food_id.cmp(&b.food_id))
    });
    ranked.truncate(limit);
    ranked
}
