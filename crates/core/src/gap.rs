//! Per-nutrient gaps between consumption and target.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::nutrients::{sanitize_amount, NutrientId, NutrientTarget, NutrientValues};
use crate::types::LocalDate;

/// Unmet portion of each tracked nutrient's daily target.
///
/// Every tracked nutrient has a gap entry (zero when met or unset). Only
/// nutrients with a positive target appear in `targets`. `order` keeps the
/// display order: macros first, energy leading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Gaps {
    order: Vec<NutrientId>,
    gaps: BTreeMap<NutrientId, f64>,
    targets: BTreeMap<NutrientId, f64>,
}

impl Gaps {
    /// Gap for `id`; `0.0` for nutrients that are not tracked.
    pub fn gap(&self, id: NutrientId) -> f64 {
        self.gaps.get(&id).copied().unwrap_or(0.0)
    }

    /// The positive target for `id`, if one is set.
    pub fn target(&self, id: NutrientId) -> Option<f64> {
        self.targets.get(&id).copied()
    }

    /// Nutrients with a strictly positive gap, in display order.
    pub fn positive(&self) -> impl Iterator<Item = (NutrientId, f64)> + '_ {
        self.order
            .iter()
            .map(|id| (*id, self.gap(*id)))
            .filter(|(_, gap)| *gap > 0.0)
    }

    /// Nutrients whose target is set and already reached.
    pub fn met(&self) -> impl Iterator<Item = (NutrientId, f64)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.target(*id).map(|target| (*id, target)))
            .filter(|(id, _)| self.gap(*id) <= 0.0)
    }

    /// `true` when every gap is zero.
    pub fn all_met(&self) -> bool {
        self.positive().next().is_none()
    }

    /// Every tracked nutrient, in display order.
    pub fn tracked(&self) -> impl Iterator<Item = NutrientId> + '_ {
        self.order.iter().copied()
    }
}

/// Compute `max(0, target - consumed)` for every tracked nutrient.
///
/// Tracked nutrients are the four macros plus any extra nutrient present in
/// `targets.other`. Unset or zero targets yield a gap of zero.
pub fn compute_gaps(consumed: &NutrientValues, targets: &NutrientTarget) -> Gaps {
    let mut out = Gaps::default();
    for id in targets.nutrient_ids() {
        let eaten = sanitize_amount(consumed.get(id));
        let gap = match targets.effective(id) {
            Some(target) => {
                out.targets.insert(id, target);
                (target - eaten).max(0.0)
            }
            None => 0.0,
        };
        out.gaps.insert(id, gap);
        out.order.push(id);
    }
    out
}

// ---------------------------------------------------------------------------
// Day report
// ---------------------------------------------------------------------------

/// One nutrient's line on the daily dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapRow {
    pub nutrient_id: NutrientId,
    pub name: &'static str,
    pub unit: &'static str,
    pub target: Option<f64>,
    pub consumed: f64,
    pub gap: f64,
    /// Amount consumed beyond the target; zero when under or unset.
    pub surplus: f64,
    pub percent_of_target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub date: LocalDate,
    /// `false` when the user has not configured any target yet.
    pub targets_set: bool,
    pub nutrients: Vec<GapRow>,
}

/// Build the dashboard rows for one day's totals.
pub fn analyze_day(date: LocalDate, consumed: &NutrientValues, targets: &NutrientTarget) -> GapReport {
    let gaps = compute_gaps(consumed, targets);

    let nutrients = gaps
        .tracked()
        .map(|id| {
            let eaten = sanitize_amount(consumed.get(id));
            let target = gaps.target(id);
            GapRow {
                nutrient_id: id,
                name: id.name(),
                unit: id.unit(),
                target,
                consumed: eaten,
                gap: gaps.gap(id),
                surplus: target.map(|t| (eaten - t).max(0.0)).unwrap_or(0.0),
                percent_of_target: target.map(|t| eaten / t * 100.0),
            }
        })
        .collect();

    GapReport {
        date,
        targets_set: targets.is_configured(),
        nutrients,
    }
}
