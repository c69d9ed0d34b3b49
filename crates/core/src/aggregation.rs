//! Log entry arithmetic and daily aggregation.
//!
//! Entries carry the local calendar date resolved when they were logged, so
//! grouping here never re-derives a date from the stored instant.

use std::collections::BTreeMap;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::nutrients::{sanitize_amount, NutrientId, NutrientValues};
use crate::types::{DbId, LocalDate, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Food nutrient profiles are expressed per this many grams.
pub const REFERENCE_SERVING_G: f64 = 100.0;

/// Per-entry energy above this is treated as corrupt and ignored.
pub const ENERGY_SANITY_CAP_KCAL: f64 = 50_000.0;

/// Per-entry amount of any non-energy nutrient above this is ignored.
pub const NUTRIENT_SANITY_CAP_G: f64 = 5_000.0;

/// Largest UTC offset in use anywhere (UTC+14 / UTC-12 fits inside).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// A single logged food with its denormalized nutrient contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: DbId,
    pub food_id: DbId,
    pub food_name: String,
    pub serving_g: f64,
    pub consumed_at: Timestamp,
    pub local_date: LocalDate,
    pub contribution: NutrientValues,
}

/// Scale a per-100g nutrient profile to a serving size.
pub fn scale_per_100g(per_100g: &NutrientValues, serving_g: f64) -> NutrientValues {
    per_100g.scaled(sanitize_amount(serving_g) / REFERENCE_SERVING_G)
}

/// Reject serving sizes that are not strictly positive and finite.
pub fn validate_serving(serving_g: f64) -> Result<(), CoreError> {
    if !serving_g.is_finite() || serving_g <= 0.0 {
        return Err(CoreError::Validation(format!(
            "serving size must be a positive number of grams, got {serving_g}"
        )));
    }
    Ok(())
}

/// Return a copy of `entry` with a new serving size and its contribution
/// re-derived linearly from the old one.
pub fn rescale_serving(entry: &LogEntry, new_serving_g: f64) -> Result<LogEntry, CoreError> {
    validate_serving(new_serving_g)?;
    if entry.serving_g <= 0.0 || !entry.serving_g.is_finite() {
        return Err(CoreError::Validation(format!(
            "log entry {} has an unusable serving size {}",
            entry.id, entry.serving_g
        )));
    }

    let factor = new_serving_g / entry.serving_g;
    Ok(LogEntry {
        serving_g: new_serving_g,
        contribution: entry.contribution.scaled(factor),
        ..entry.clone()
    })
}

// ---------------------------------------------------------------------------
// Local dates
// ---------------------------------------------------------------------------

/// Reject offsets outside the range of real-world time zones.
pub fn validate_utc_offset(minutes: i32) -> Result<(), CoreError> {
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(CoreError::Validation(format!(
            "utc offset must be within +/-{MAX_UTC_OFFSET_MINUTES} minutes, got {minutes}"
        )));
    }
    Ok(())
}

fn fixed_offset(minutes: i32) -> FixedOffset {
    let clamped = minutes.clamp(-MAX_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES);
    FixedOffset::east_opt(clamped * 60).unwrap_or_else(|| Utc.fix())
}

/// Calendar date of `instant` as seen from a zone `utc_offset_minutes` east
/// of UTC.
pub fn local_date(instant: Timestamp, utc_offset_minutes: i32) -> LocalDate {
    instant
        .with_timezone(&fixed_offset(utc_offset_minutes))
        .date_naive()
}

/// The user's "today" at the instant `now`.
pub fn local_today(now: Timestamp, utc_offset_minutes: i32) -> LocalDate {
    local_date(now, utc_offset_minutes)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Contribution with corrupt amounts (negative, non-finite, or above the
/// sanity caps) replaced by `0.0`.
pub fn capped_contribution(contribution: &NutrientValues) -> NutrientValues {
    let mut out = contribution.sanitized();
    for id in out.nutrient_ids() {
        let cap = if id == NutrientId::ENERGY {
            ENERGY_SANITY_CAP_KCAL
        } else {
            NUTRIENT_SANITY_CAP_G
        };
        if out.get(id) > cap {
            out.set(id, 0.0);
        }
    }
    out
}

/// Sum entry contributions per local date.
pub fn group_daily_totals<'a, I>(entries: I) -> BTreeMap<LocalDate, NutrientValues>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut totals: BTreeMap<LocalDate, NutrientValues> = BTreeMap::new();
    for entry in entries {
        totals
            .entry(entry.local_date)
            .or_default()
            .add(&capped_contribution(&entry.contribution));
    }
    totals
}

/// Totals for a single local date; zero when nothing was logged.
pub fn totals_for_date<'a, I>(entries: I, date: LocalDate) -> NutrientValues
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut total = NutrientValues::default();
    for entry in entries.into_iter().filter(|e| e.local_date == date) {
        total.add(&capped_contribution(&entry.contribution));
    }
    total
}
