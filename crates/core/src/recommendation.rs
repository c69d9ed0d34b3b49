//! Ranking candidate foods by how efficiently they close the day's gaps.
//!
//! A food's score is the sum, over nutrients with a positive gap, of the
//! fraction of that gap one 100 g serving would fill (capped at 1), minus a
//! penalty for pushing already-met nutrients further over target.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::gap::Gaps;
use crate::nutrients::{sanitize_amount, NutrientId, NutrientValues};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_RESULTS: usize = 6;

/// Weight applied to `amount / target` for nutrients already at target.
pub const OVERSHOOT_PENALTY_WEIGHT: f64 = 0.5;

/// A food whose 100 g energy exceeds this fraction of the energy gap is
/// excluded outright.
pub const DEFAULT_CALORIE_OVERSHOOT_FRACTION: f64 = 1.0;

/// Open gaps a food must address. When fewer gaps are open, every open one
/// must be addressed instead.
pub const DEFAULT_MIN_NUTRIENTS_ADDRESSED: usize = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A food eligible for recommendation, with its per-100g profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFood {
    pub food_id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub per_100g: NutrientValues,
}

/// Tunables for [`recommend_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationConfig {
    pub max_results: usize,
    pub calorie_overshoot_fraction: f64,
    pub overshoot_penalty_weight: f64,
    pub min_nutrients_addressed: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            calorie_overshoot_fraction: DEFAULT_CALORIE_OVERSHOOT_FRACTION,
            overshoot_penalty_weight: OVERSHOOT_PENALTY_WEIGHT,
            min_nutrients_addressed: DEFAULT_MIN_NUTRIENTS_ADDRESSED,
        }
    }
}

/// How much of one nutrient's gap a 100 g serving fills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientFill {
    pub nutrient_id: NutrientId,
    pub amount_per_100g: f64,
    pub gap: f64,
    /// `min(1, amount / gap)`.
    pub fill: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub food_id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub score: f64,
    pub fills: Vec<NutrientFill>,
    pub per_100g: NutrientValues,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Rank `candidates` against `gaps` with default tuning.
pub fn recommend(gaps: &Gaps, candidates: &[CandidateFood], max_results: usize) -> Vec<Recommendation> {
    let config = RecommendationConfig {
        max_results,
        ..RecommendationConfig::default()
    };
    recommend_with(gaps, candidates, &config)
}

/// Rank `candidates` against `gaps`.
///
/// Returns an empty list when every gap is zero or no candidate qualifies.
/// Ties on score are broken by ascending `food_id`.
pub fn recommend_with(
    gaps: &Gaps,
    candidates: &[CandidateFood],
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    if gaps.all_met() || config.max_results == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Recommendation> = candidates
        .iter()
        .filter_map(|food| score_candidate(gaps, food, config))
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.food_id.cmp(&b.food_id))
    });
    ranked.truncate(config.max_results);
    ranked
}

/// Score a single food, or `None` when it is excluded.
pub fn score_candidate(gaps: &Gaps, food: &CandidateFood, config: &RecommendationConfig) -> Option<Recommendation> {
    let profile = food.per_100g.sanitized();

    let energy_gap = gaps.gap(NutrientId::ENERGY);
    if energy_gap > 0.0 && profile.energy_kcal > config.calorie_overshoot_fraction * energy_gap {
        return None;
    }

    let fills: Vec<NutrientFill> = gaps
        .positive()
        .map(|(id, gap)| {
            let amount = profile.get(id);
            NutrientFill {
                nutrient_id: id,
                amount_per_100g: amount,
                gap,
                fill: (amount / gap).min(1.0),
            }
        })
        .collect();

    let addressed = fills.iter().filter(|f| f.fill > 0.0).count();
    let required = config.min_nutrients_addressed.min(fills.len());
    if addressed == 0 || addressed < required {
        return None;
    }

    let coverage: f64 = fills.iter().map(|f| f.fill).sum();
    let penalty: f64 = gaps
        .met()
        .map(|(id, target)| config.overshoot_penalty_weight * profile.get(id) / target)
        .sum();

    let score = coverage - penalty;
    if !score.is_finite() || score <= 0.0 {
        return None;
    }

    Some(Recommendation {
        food_id: food.food_id,
        name: food.name.clone(),
        category: food.category.clone(),
        score,
        fills,
        per_100g: profile,
    })
}

// ---------------------------------------------------------------------------
// Candidate filter
// ---------------------------------------------------------------------------

/// Name keywords that mark a food as a poor whole-food suggestion.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "candy", "soda", "chips", "fried", "syrup", "frosting", "topping", "sauce", "gravy", "spread",
    "dressing", "dip", "marinade", "powder", "concentrate", "dried", "dehydrated", "butter", "lard",
    "shortening", "margarine", "drink", "beverage", "baby food", "infant", "formula", "imitation",
    "artificial", "supplement",
];

pub const DEFAULT_ALLOWED_CATEGORIES: &[&str] = &[
    "Poultry Products",
    "Beef Products",
    "Pork Products",
    "Lamb, Veal, and Game Products",
    "Finfish and Shellfish Products",
    "Vegetables and Vegetable Products",
    "Fruits and Fruit Juices",
    "Cereal Grains and Pasta",
    "Dairy and Egg Products",
    "Legumes and Legume Products",
    "Nut and Seed Products",
    "Meals, Entrees, and Side Dishes",
];

/// Pre-ranking quality filter over the food catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFilter {
    pub min_energy_kcal: f64,
    pub max_energy_kcal: f64,
    pub max_name_len: usize,
    /// Lowercase keywords; a name containing any of them is rejected.
    pub blacklist: Vec<String>,
    /// When set, foods with a known category outside this list are rejected.
    pub allowed_categories: Option<Vec<String>>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            min_energy_kcal: 80.0,
            max_energy_kcal: 330.0,
            max_name_len: 80,
            blacklist: DEFAULT_BLACKLIST.iter().map(|k| k.to_string()).collect(),
            allowed_categories: Some(DEFAULT_ALLOWED_CATEGORIES.iter().map(|c| c.to_string()).collect()),
        }
    }
}

impl CandidateFilter {
    pub fn accepts(&self, food: &CandidateFood) -> bool {
        let energy = sanitize_amount(food.per_100g.energy_kcal);
        if energy < self.min_energy_kcal || energy > self.max_energy_kcal {
            return false;
        }
        if food.name.chars().count() > self.max_name_len {
            return false;
        }

        let name = food.name.to_lowercase();
        if self.blacklist.iter().any(|k| name.contains(k.as_str())) {
            return false;
        }

        match (&self.allowed_categories, &food.category) {
            (Some(allowed), Some(category)) => allowed.iter().any(|c| c.eq_ignore_ascii_case(category)),
            _ => true,
        }
    }

    /// Keep only the candidates this filter accepts, preserving order.
    pub fn apply(&self, candidates: Vec<CandidateFood>) -> Vec<CandidateFood> {
        candidates.into_iter().filter(|f| self.accepts(f)).collect()
    }
}
