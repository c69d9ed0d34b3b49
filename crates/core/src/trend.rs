//! Rolling trend window with deviation buckets, and week-over-week change.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::nutrients::{sanitize_amount, NutrientId, NutrientTarget, NutrientValues};
use crate::types::LocalDate;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Tolerance for bucket boundary comparisons.
const BOUNDARY_EPSILON: f64 = 1e-9;

const ON_TRACK_MAX: f64 = 0.10;
const CLOSE_MAX: f64 = 0.25;
const OFF_MAX: f64 = 0.40;

// ---------------------------------------------------------------------------
// Deviation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviationBucket {
    OnTrack,
    Close,
    Off,
    FarOff,
}

/// `|value - target| / target`, or `0.0` when the target is unset or zero.
pub fn deviation(value: f64, target: Option<f64>) -> f64 {
    match target.map(sanitize_amount) {
        Some(t) if t > 0.0 => (sanitize_amount(value) - t).abs() / t,
        _ => 0.0,
    }
}

pub fn classify_deviation(deviation: f64) -> DeviationBucket {
    if deviation <= ON_TRACK_MAX + BOUNDARY_EPSILON {
        DeviationBucket::OnTrack
    } else if deviation <= CLOSE_MAX + BOUNDARY_EPSILON {
        DeviationBucket::Close
    } else if deviation <= OFF_MAX + BOUNDARY_EPSILON {
        DeviationBucket::Off
    } else {
        DeviationBucket::FarOff
    }
}

// ---------------------------------------------------------------------------
// Trend window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientTrend {
    pub nutrient_id: NutrientId,
    pub value: f64,
    pub target: Option<f64>,
    pub deviation: f64,
    pub bucket: DeviationBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDay {
    pub date: LocalDate,
    /// Whether anything was logged on this date.
    pub logged: bool,
    pub nutrients: Vec<NutrientTrend>,
}

pub fn validate_window_days(days: u32) -> Result<u32, CoreError> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(CoreError::Validation(format!(
            "window must be between 1 and {MAX_WINDOW_DAYS} days, got {days}"
        )));
    }
    Ok(days)
}

/// Build exactly `window_days` trend entries ending at `today`, oldest first.
///
/// Days missing from `daily` are reported with zero values. When
/// `fresh_today` is given it replaces whatever `daily` holds for `today`.
/// Windows longer than [`MAX_WINDOW_DAYS`] are clamped to it.
pub fn build_trend(
    daily: &BTreeMap<LocalDate, NutrientValues>,
    targets: &NutrientTarget,
    today: LocalDate,
    window_days: u32,
    fresh_today: Option<&NutrientValues>,
) -> Vec<TrendDay> {
    let empty = NutrientValues::default();
    let window_days = window_days.min(MAX_WINDOW_DAYS);

    (0..window_days)
        .rev()
        .filter_map(|back| today.checked_sub_signed(Duration::days(i64::from(back))))
        .map(|date| {
            let values = match (date == today, fresh_today) {
                (true, Some(fresh)) => Some(fresh),
                _ => daily.get(&date),
            };
            let logged = values.is_some();
            let values = values.unwrap_or(&empty);

            let nutrients = targets
                .nutrient_ids()
                .into_iter()
                .map(|id| {
                    let value = sanitize_amount(values.get(id));
                    let target = targets.get(id);
                    let dev = deviation(value, target);
                    NutrientTrend {
                        nutrient_id: id,
                        value,
                        target,
                        deviation: dev,
                        bucket: classify_deviation(dev),
                    }
                })
                .collect();

            TrendDay {
                date,
                logged,
                nutrients,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Week over week
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyChange {
    pub nutrient_id: NutrientId,
    pub this_week_avg: f64,
    pub last_week_avg: f64,
    pub change: f64,
    /// `None` when last week's average is zero.
    pub change_percent: Option<f64>,
}

fn window_average(
    daily: &BTreeMap<LocalDate, NutrientValues>,
    from: LocalDate,
    to: LocalDate,
    id: NutrientId,
) -> f64 {
    let days: Vec<&NutrientValues> = daily.range(from..=to).map(|(_, v)| v).collect();
    if days.is_empty() {
        return 0.0;
    }
    days.iter().map(|v| sanitize_amount(v.get(id))).sum::<f64>() / days.len() as f64
}

/// Average per logged day over `[today-6, today]` against `[today-13, today-7]`.
///
/// Empty when neither week has any logged day.
pub fn compare_weeks(daily: &BTreeMap<LocalDate, NutrientValues>, today: LocalDate) -> Vec<WeeklyChange> {
    let this_start = today - Duration::days(6);
    let last_end = today - Duration::days(7);
    let last_start = today - Duration::days(13);

    if daily.range(last_start..=today).next().is_none() {
        return Vec::new();
    }

    let mut ids: BTreeSet<NutrientId> = NutrientId::MACROS.into_iter().collect();
    for (_, values) in daily.range(last_start..=today) {
        ids.extend(values.other.keys().copied());
    }

    let mut ordered: Vec<NutrientId> = NutrientId::MACROS.to_vec();
    ordered.extend(ids.into_iter().filter(|id| !id.is_macro()));

    ordered
        .into_iter()
        .map(|id| {
            let this_week_avg = window_average(daily, this_start, today, id);
            let last_week_avg = window_average(daily, last_start, last_end, id);
            let change = this_week_avg - last_week_avg;
            WeeklyChange {
                nutrient_id: id,
                this_week_avg,
                last_week_avg,
                change,
                change_percent: (last_week_avg > 0.0).then(|| change / last_week_avg * 100.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn d(day: u32) -> LocalDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn energy_target(kcal: f64) -> NutrientTarget {
        NutrientTarget {
            energy_kcal: Some(kcal),
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    #[test]
    fn bucket_boundaries() {
        assert_eq!(classify_deviation(0.0), DeviationBucket::OnTrack);
        assert_eq!(classify_deviation(0.10), DeviationBucket::OnTrack);
        assert_eq!(classify_deviation(0.1001), DeviationBucket::Close);
        assert_eq!(classify_deviation(0.25), DeviationBucket::Close);
        assert_eq!(classify_deviation(0.2501), DeviationBucket::Off);
        assert_eq!(classify_deviation(0.40), DeviationBucket::Off);
        assert_eq!(classify_deviation(0.4001), DeviationBucket::FarOff);
    }

    #[test]
    fn computed_ten_percent_is_on_track() {
        let dev = deviation(2200.0, Some(2000.0));
        assert_eq!(classify_deviation(dev), DeviationBucket::OnTrack);
        let dev = deviation(1800.0, Some(2000.0));
        assert_eq!(classify_deviation(dev), DeviationBucket::OnTrack);
        let dev = deviation(2200.2, Some(2000.0));
        assert_eq!(classify_deviation(dev), DeviationBucket::Close);
    }

    #[test]
    fn unset_or_zero_target_has_no_deviation() {
        assert_eq!(deviation(500.0, None), 0.0);
        assert_eq!(deviation(500.0, Some(0.0)), 0.0);
    }

    #[test]
    fn bucket_serializes_kebab_case() {
        assert_eq!(serde_json::to_value(DeviationBucket::OnTrack).unwrap(), "on-track");
        assert_eq!(serde_json::to_value(DeviationBucket::FarOff).unwrap(), "far-off");
    }

    // -----------------------------------------------------------------------
    // build_trend
    // -----------------------------------------------------------------------

    #[test]
    fn empty_history_still_yields_full_window() {
        let trend = build_trend(&BTreeMap::new(), &energy_target(2000.0), d(20), 7, None);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend.first().unwrap().date, d(14));
        assert_eq!(trend.last().unwrap().date, d(20));
        for day in &trend {
            assert!(!day.logged);
            assert!(day.nutrients.iter().all(|n| n.value == 0.0));
        }
        // Zero intake against a set target is far off.
        assert_eq!(trend[0].nutrients[0].bucket, DeviationBucket::FarOff);
    }

    #[test]
    fn dates_are_contiguous_across_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let trend = build_trend(&BTreeMap::new(), &NutrientTarget::default(), today, 5, None);
        let dates: Vec<LocalDate> = trend.iter().map(|t| t.date).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 2, 27).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(dates[4], today);
    }

    #[test]
    fn logged_days_are_classified() {
        let mut daily = BTreeMap::new();
        daily.insert(d(19), NutrientValues::new(1950.0, 0.0, 0.0, 0.0));
        daily.insert(d(20), NutrientValues::new(1400.0, 0.0, 0.0, 0.0));
        let trend = build_trend(&daily, &energy_target(2000.0), d(20), 3, None);

        assert!(!trend[0].logged);
        assert!(trend[1].logged);
        assert_eq!(trend[1].nutrients[0].bucket, DeviationBucket::OnTrack);
        assert!((trend[2].nutrients[0].deviation - 0.3).abs() < 1e-9);
        assert_eq!(trend[2].nutrients[0].bucket, DeviationBucket::Off);
    }

    #[test]
    fn fresh_today_overrides_stored_value() {
        let mut daily = BTreeMap::new();
        daily.insert(d(20), NutrientValues::new(500.0, 0.0, 0.0, 0.0));
        let fresh = NutrientValues::new(2000.0, 0.0, 0.0, 0.0);
        let trend = build_trend(&daily, &energy_target(2000.0), d(20), 2, Some(&fresh));
        assert_eq!(trend[1].nutrients[0].value, 2000.0);
        assert_eq!(trend[1].nutrients[0].bucket, DeviationBucket::OnTrack);
    }

    #[test]
    fn window_days_validation() {
        assert_eq!(validate_window_days(7).unwrap(), 7);
        assert_eq!(validate_window_days(MAX_WINDOW_DAYS).unwrap(), MAX_WINDOW_DAYS);
        assert_matches!(validate_window_days(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_window_days(MAX_WINDOW_DAYS + 1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn oversized_window_is_clamped() {
        let trend = build_trend(&BTreeMap::new(), &energy_target(2000.0), d(15), 200_000_000, None);
        assert_eq!(trend.len(), MAX_WINDOW_DAYS as usize);
        assert_eq!(trend.last().unwrap().date, d(15));
    }

    #[test]
    fn macro_id_in_extra_targets_is_reported_once() {
        let targets: NutrientTarget =
            serde_json::from_str(r#"{"protein_g": 100.0, "other": {"1003": 50.0}}"#).unwrap();
        let trend = build_trend(&BTreeMap::new(), &targets, d(15), 1, None);
        let ids: Vec<NutrientId> = trend[0].nutrients.iter().map(|n| n.nutrient_id).collect();
        assert_eq!(ids, NutrientId::MACROS.to_vec());
        assert_eq!(trend[0].nutrients[1].target, Some(100.0));
    }

    // -----------------------------------------------------------------------
    // compare_weeks
    // -----------------------------------------------------------------------

    #[test]
    fn compare_weeks_averages_logged_days_only() {
        let mut daily = BTreeMap::new();
        // This week: 20 and 18.
        daily.insert(d(20), NutrientValues::new(2000.0, 100.0, 0.0, 0.0));
        daily.insert(d(18), NutrientValues::new(1000.0, 80.0, 0.0, 0.0));
        // Last week: 13 only.
        daily.insert(d(13), NutrientValues::new(1000.0, 60.0, 0.0, 0.0));
        // Outside both windows.
        daily.insert(d(1), NutrientValues::new(9000.0, 0.0, 0.0, 0.0));

        let changes = compare_weeks(&daily, d(20));
        assert_eq!(changes.len(), 4);
        let energy = &changes[0];
        assert_eq!(energy.nutrient_id, NutrientId::ENERGY);
        assert_eq!(energy.this_week_avg, 1500.0);
        assert_eq!(energy.last_week_avg, 1000.0);
        assert_eq!(energy.change, 500.0);
        assert_eq!(energy.change_percent, Some(50.0));

        let protein = &changes[1];
        assert_eq!(protein.this_week_avg, 90.0);
        assert_eq!(protein.change, 30.0);

        let carbs = &changes[2];
        assert_eq!(carbs.change_percent, None);
    }

    #[test]
    fn compare_weeks_empty_without_recent_logs() {
        let mut daily = BTreeMap::new();
        daily.insert(d(1), NutrientValues::new(2000.0, 0.0, 0.0, 0.0));
        assert!(compare_weeks(&daily, d(20)).is_empty());
    }
}
