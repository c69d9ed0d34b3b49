//! Nutrient identifiers and per-nutrient value containers.
//!
//! The four tracked macro-nutrients have named fields; any other nutrient
//! lives in the `other` map keyed by its numeric id, so the key space stays
//! open without changing the shape of the common case.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Nutrient identifiers
// ---------------------------------------------------------------------------

/// Numeric nutrient identifier, using the USDA FoodData Central numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientId(pub u32);

impl NutrientId {
    pub const PROTEIN: Self = Self(1003);
    pub const FAT: Self = Self(1004);
    pub const CARBOHYDRATE: Self = Self(1005);
    pub const ENERGY: Self = Self(1008);

    /// The four tracked macro-nutrients, in display order.
    pub const MACROS: [Self; 4] = [Self::ENERGY, Self::PROTEIN, Self::CARBOHYDRATE, Self::FAT];

    pub fn is_macro(self) -> bool {
        Self::MACROS.contains(&self)
    }

    /// Human-readable name for display in the UI.
    pub fn name(self) -> &'static str {
        match self {
            Self::ENERGY => "Energy",
            Self::PROTEIN => "Protein",
            Self::CARBOHYDRATE => "Carbohydrate",
            Self::FAT => "Fat",
            _ => "Other",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::ENERGY => "kcal",
            Self::PROTEIN | Self::CARBOHYDRATE | Self::FAT => "g",
            _ => "",
        }
    }
}

impl fmt::Display for NutrientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clamp an amount coming from upstream storage to a usable value.
///
/// Negative and non-finite amounts become `0.0`.
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Amounts per nutrient: consumed totals, a single entry's contribution, or a
/// food's per-100g profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientValues {
    #[serde(default)]
    pub energy_kcal: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbohydrate_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<NutrientId, f64>,
}

impl NutrientValues {
    pub fn new(energy_kcal: f64, protein_g: f64, carbohydrate_g: f64, fat_g: f64) -> Self {
        Self {
            energy_kcal,
            protein_g,
            carbohydrate_g,
            fat_g,
            other: BTreeMap::new(),
        }
    }

    /// Amount for `id`, or `0.0` when the nutrient is not present.
    pub fn get(&self, id: NutrientId) -> f64 {
        match id {
            NutrientId::ENERGY => self.energy_kcal,
            NutrientId::PROTEIN => self.protein_g,
            NutrientId::CARBOHYDRATE => self.carbohydrate_g,
            NutrientId::FAT => self.fat_g,
            other => self.other.get(&other).copied().unwrap_or(0.0),
        }
    }

    pub fn set(&mut self, id: NutrientId, value: f64) {
        match id {
            NutrientId::ENERGY => self.energy_kcal = value,
            NutrientId::PROTEIN => self.protein_g = value,
            NutrientId::CARBOHYDRATE => self.carbohydrate_g = value,
            NutrientId::FAT => self.fat_g = value,
            other => {
                self.other.insert(other, value);
            }
        }
    }

    /// The macros first, then every extra nutrient in id order.
    ///
    /// A macro id stored in `other` is shadowed by its named field and not
    /// listed twice.
    pub fn nutrient_ids(&self) -> Vec<NutrientId> {
        NutrientId::MACROS
            .iter()
            .copied()
            .chain(self.other.keys().copied().filter(|id| !id.is_macro()))
            .collect()
    }

    /// Add every amount in `rhs` to `self`.
    pub fn add(&mut self, rhs: &NutrientValues) {
        for id in rhs.nutrient_ids() {
            let sum = self.get(id) + rhs.get(id);
            self.set(id, sum);
        }
    }

    /// Multiply every amount by `factor`.
    pub fn scaled(&self, factor: f64) -> NutrientValues {
        let mut out = self.clone();
        for id in self.nutrient_ids() {
            out.set(id, self.get(id) * factor);
        }
        out
    }

    /// Copy with negative and non-finite amounts replaced by `0.0`.
    pub fn sanitized(&self) -> NutrientValues {
        let mut out = self.clone();
        for id in self.nutrient_ids() {
            out.set(id, sanitize_amount(self.get(id)));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Per-user daily targets. `None` means the target was never configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTarget {
    #[serde(default)]
    pub energy_kcal: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub carbohydrate_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: BTreeMap<NutrientId, f64>,
    /// When the external formula service last computed these values.
    #[serde(default)]
    pub calculated_at: Option<Timestamp>,
}

impl NutrientTarget {
    /// Configured target for `id`, clamped to be non-negative.
    pub fn get(&self, id: NutrientId) -> Option<f64> {
        let raw = match id {
            NutrientId::ENERGY => self.energy_kcal,
            NutrientId::PROTEIN => self.protein_g,
            NutrientId::CARBOHYDRATE => self.carbohydrate_g,
            NutrientId::FAT => self.fat_g,
            other => self.other.get(&other).copied(),
        };
        raw.map(sanitize_amount)
    }

    /// Target for `id` only when it is set and strictly positive.
    pub fn effective(&self, id: NutrientId) -> Option<f64> {
        self.get(id).filter(|t| *t > 0.0)
    }

    /// The macros first, then every extra nutrient in id order.
    ///
    /// A macro id stored in `other` is shadowed by its named field and not
    /// listed twice.
    pub fn nutrient_ids(&self) -> Vec<NutrientId> {
        NutrientId::MACROS
            .iter()
            .copied()
            .chain(self.other.keys().copied().filter(|id| !id.is_macro()))
            .collect()
    }

    /// Whether at least one nutrient has a positive target.
    pub fn is_configured(&self) -> bool {
        self.nutrient_ids()
            .into_iter()
            .any(|id| self.effective(id).is_some())
    }
}
