//! Quiz participant model.

use nutrilog_core::leaderboard::QuizParticipant;
use nutrilog_core::quiz::QuizStats;
use nutrilog_core::types::DbId;
use sqlx::FromRow;

/// A user joined with their quiz counters. Counters are `NULL` for users who
/// never answered.
#[derive(Debug, Clone, FromRow)]
pub struct QuizParticipantRow {
    pub user_id: DbId,
    pub username: String,
    pub score: Option<i64>,
    pub current_streak: Option<i64>,
    pub best_streak: Option<i64>,
}

impl From<QuizParticipantRow> for QuizParticipant {
    fn from(row: QuizParticipantRow) -> Self {
        QuizParticipant {
            user_id: row.user_id,
            username: row.username,
            score: row.score,
            current_streak: row.current_streak,
            best_streak: row.best_streak,
        }
    }
}

/// Row from the `quiz_participants` table.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct QuizStatsRow {
    pub score: i64,
    pub current_streak: i64,
    pub best_streak: i64,
}

impl From<QuizStatsRow> for QuizStats {
    fn from(row: QuizStatsRow) -> Self {
        QuizStats {
            score: row.score,
            current_streak: row.current_streak,
            best_streak: row.best_streak,
        }
    }
}
