//! Handlers for quiz standings and answer outcomes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use nutrilog_core::error::CoreError;
use nutrilog_core::leaderboard::{rank, LeaderboardSort};
use nutrilog_core::quiz::AnswerOutcome;
use nutrilog_db::repositories::{QuizParticipantRepo, UserRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{validated, LeaderboardParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /quiz/leaderboard?sort=&limit=
pub async fn get_leaderboard(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<impl IntoResponse> {
    let params = validated(params)?;
    let sort = match params.sort.as_deref() {
        Some(raw) => raw.parse::<LeaderboardSort>()?,
        None => LeaderboardSort::default(),
    };
    let top_n = params.limit.unwrap_or(state.config.analytics.leaderboard_top_n);

    let mut snapshot = nutrilog_db::begin_snapshot(&state.pool).await?;
    let participants = QuizParticipantRepo::list_all(&mut snapshot).await?;
    snapshot.commit().await?;

    let board = rank(&participants, sort, Some(auth.user_id), top_n);

    tracing::info!(
        user_id = auth.user_id,
        ?sort,
        total = board.total_participants,
        outside_top = board.self_entry.is_some(),
        "Leaderboard ranked"
    );

    Ok(Json(DataResponse { data: board }))
}

/// GET /quiz/stats
pub async fn get_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let stats = QuizParticipantRepo::find_stats(&mut conn, auth.user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

#[derive(Debug, Deserialize)]
pub struct RecordOutcomeRequest {
    pub outcome: AnswerOutcome,
}

/// POST /quiz/outcomes
///
/// Applies one answer outcome to the caller's counters and returns the new
/// values.
pub async fn record_outcome(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecordOutcomeRequest>,
) -> AppResult<impl IntoResponse> {
    {
        let mut conn = state.pool.acquire().await?;
        UserRepo::find_by_id(&mut conn, auth.user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: auth.user_id,
            })?;
    }

    let stats = QuizParticipantRepo::record_outcome(&state.pool, auth.user_id, input.outcome).await?;

    tracing::info!(
        user_id = auth.user_id,
        outcome = ?input.outcome,
        score = stats.score,
        current_streak = stats.current_streak,
        "Quiz outcome recorded"
    );

    Ok((StatusCode::OK, Json(DataResponse { data: stats })))
}
