//! Quiz leaderboard ranking.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const DEFAULT_TOP_N: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSort {
    #[default]
    Score,
    /// Ranks by best streak ever reached.
    Streak,
}

impl FromStr for LeaderboardSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score" => Ok(Self::Score),
            "streak" => Ok(Self::Streak),
            other => Err(CoreError::Validation(format!(
                "unknown leaderboard sort '{other}', expected 'score' or 'streak'"
            ))),
        }
    }
}

/// A quiz player as read from the participant store.
///
/// `None` fields have never been recorded and rank as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizParticipant {
    pub user_id: DbId,
    pub username: String,
    pub score: Option<i64>,
    pub current_streak: Option<i64>,
    pub best_streak: Option<i64>,
}

impl QuizParticipant {
    fn sort_value(&self, sort: LeaderboardSort) -> i64 {
        let raw = match sort {
            LeaderboardSort::Score => self.score,
            LeaderboardSort::Streak => self.best_streak,
        };
        raw.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: DbId,
    pub username: String,
    pub value: i64,
}

/// The requesting user's position when it falls outside the top slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfRank {
    pub rank: usize,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub sort: LeaderboardSort,
    pub top: Vec<LeaderboardEntry>,
    #[serde(rename = "self")]
    pub self_entry: Option<SelfRank>,
    pub total_participants: usize,
}

/// Sort participants descending by `sort` (ties by ascending user id) and
/// assign 1-based ranks over the whole population.
///
/// `self_entry` is only filled when `requesting_user` ranks below the top
/// `top_n`, so the user never appears twice.
pub fn rank(
    participants: &[QuizParticipant],
    sort: LeaderboardSort,
    requesting_user: Option<DbId>,
    top_n: usize,
) -> Leaderboard {
    let mut ordered: Vec<&QuizParticipant> = participants.iter().collect();
    ordered.sort_by(|a, b| {
        b.sort_value(sort)
            .cmp(&a.sort_value(sort))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    let top = ordered
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i + 1,
            user_id: p.user_id,
            username: p.username.clone(),
            value: p.sort_value(sort),
        })
        .collect();

    let self_entry = requesting_user.and_then(|user_id| {
        ordered
            .iter()
            .position(|p| p.user_id == user_id)
            .filter(|&i| i >= top_n)
            .map(|i| SelfRank {
                rank: i + 1,
                value: ordered[i].sort_value(sort),
            })
    });

    Leaderboard {
        sort,
        top,
        self_entry,
        total_participants: ordered.len(),
    }
}
