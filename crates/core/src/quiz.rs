//! Quiz score and streak transitions.
//!
//! Every mutation of a participant's quiz counters goes through
//! [`apply_answer`], so stored records only ever move between states this
//! function can produce.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizStats {
    pub score: i64,
    pub current_streak: i64,
    pub best_streak: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    TimedOut,
}

/// Correct: score and streak grow, best follows. Otherwise the streak resets
/// and score and best are kept.
pub fn apply_answer(stats: QuizStats, outcome: AnswerOutcome) -> QuizStats {
    match outcome {
        AnswerOutcome::Correct => {
            let current_streak = stats.current_streak.max(0) + 1;
            QuizStats {
                score: stats.score.max(0) + 1,
                current_streak,
                best_streak: stats.best_streak.max(current_streak),
            }
        }
        AnswerOutcome::Incorrect | AnswerOutcome::TimedOut => QuizStats {
            current_streak: 0,
            ..stats
        },
    }
}

pub fn reset() -> QuizStats {
    QuizStats::default()
}
