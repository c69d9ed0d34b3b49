//! Repository for `quiz_participants`.

use nutrilog_core::leaderboard::QuizParticipant;
use nutrilog_core::quiz::{apply_answer, AnswerOutcome, QuizStats};
use nutrilog_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::quiz::{QuizParticipantRow, QuizStatsRow};

/// Reads quiz standings and persists answer outcomes.
pub struct QuizParticipantRepo;

impl QuizParticipantRepo {
    /// Every user with their quiz counters; counters are `None` for users
    /// who have never answered.
    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<QuizParticipant>, sqlx::Error> {
        let rows = sqlx::query_as::<_, QuizParticipantRow>(
            "SELECT u.id AS user_id, u.username, q.score, q.current_streak, q.best_streak
             FROM users u
             LEFT JOIN quiz_participants q ON q.user_id = u.id
             ORDER BY u.id",
        )
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().map(QuizParticipant::from).collect())
    }

    /// Counters for one user; all zero when they have never answered.
    pub async fn find_stats(conn: &mut PgConnection, user_id: DbId) -> Result<QuizStats, sqlx::Error> {
        let row = sqlx::query_as::<_, QuizStatsRow>(
            "SELECT score, current_streak, best_streak FROM quiz_participants WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(QuizStats::from).unwrap_or_default())
    }

    /// Apply one answer outcome atomically and return the new counters.
    ///
    /// The participant row is locked for the duration of the transition, so
    /// concurrent answers from the same user serialize.
    pub async fn record_outcome(
        pool: &PgPool,
        user_id: DbId,
        outcome: AnswerOutcome,
    ) -> Result<QuizStats, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("INSERT INTO quiz_participants (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let current = sqlx::query_as::<_, QuizStatsRow>(
            "SELECT score, current_streak, best_streak FROM quiz_participants
             WHERE user_id = $1
             FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let next = apply_answer(current.into(), outcome);

        sqlx::query(
            "UPDATE quiz_participants
             SET score = $2, current_streak = $3, best_streak = $4, updated_at = now()
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(next.score)
        .bind(next.current_streak)
        .bind(next.best_streak)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(user_id, ?outcome, score = next.score, streak = next.current_streak, "Quiz outcome recorded");
        Ok(next)
    }

    /// Zero a user's counters. Returns `true` if the user had a row.
    pub async fn reset(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let stats = nutrilog_core::quiz::reset();
        let result = sqlx::query(
            "UPDATE quiz_participants
             SET score = $2, current_streak = $3, best_streak = $4, updated_at = now()
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(stats.score)
        .bind(stats.current_streak)
        .bind(stats.best_streak)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
