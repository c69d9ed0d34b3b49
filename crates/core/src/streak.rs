//! Daily logging streaks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::LocalDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    /// Nothing has ever been logged.
    NoLogs,
    /// Today is logged.
    Active,
    /// Yesterday is logged but today is not yet; the streak survives until
    /// the end of today.
    AtRisk,
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub best: u32,
    pub last_logged_date: Option<LocalDate>,
    pub status: StreakStatus,
}

/// Compute the streak over a set of local logging dates.
///
/// The current run is anchored at `today` when today is logged, otherwise at
/// yesterday, so a streak is not lost before the day is over. The best run
/// is independent of `today`.
pub fn compute_streak(logged: &BTreeSet<LocalDate>, today: LocalDate) -> StreakState {
    if logged.is_empty() {
        return StreakState {
            current: 0,
            best: 0,
            last_logged_date: None,
            status: StreakStatus::NoLogs,
        };
    }

    let yesterday = today.pred_opt();
    let anchor = if logged.contains(&today) { Some(today) } else { yesterday };

    let mut current = 0;
    let mut cursor = anchor;
    while let Some(day) = cursor.filter(|d| logged.contains(d)) {
        current += 1;
        cursor = day.pred_opt();
    }

    let status = if logged.contains(&today) {
        StreakStatus::Active
    } else if yesterday.is_some_and(|y| logged.contains(&y)) {
        StreakStatus::AtRisk
    } else {
        StreakStatus::Broken
    };

    let last_logged_date = logged
        .range(..=today)
        .next_back()
        .or_else(|| logged.iter().next_back())
        .copied();

    StreakState {
        current,
        best: longest_run(logged),
        last_logged_date,
        status,
    }
}

/// Length of the longest run of consecutive dates.
pub fn longest_run(dates: &BTreeSet<LocalDate>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<LocalDate> = None;

    for &date in dates {
        run = match previous.and_then(|p| p.succ_opt()) {
            Some(next) if next == date => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(date);
    }
    best
}
