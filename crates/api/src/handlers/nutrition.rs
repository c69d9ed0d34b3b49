//! Handlers for the nutrition analytics endpoints.
//!
//! Each handler reads all of its inputs inside one snapshot transaction and
//! hands them to the pure computations in `nutrilog_core`. "Today" is the
//! authenticated user's local date at request time.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use nutrilog_core::aggregation::{group_daily_totals, local_today, totals_for_date};
use nutrilog_core::contributors::{
    top_contributors, validate_contributor_nutrient, validate_lookback_days,
    DEFAULT_CONTRIBUTOR_LIMIT, DEFAULT_LOOKBACK_DAYS,
};
use nutrilog_core::error::CoreError;
use nutrilog_core::gap::{analyze_day, compute_gaps, GapReport};
use nutrilog_core::nutrients::{NutrientId, NutrientTarget};
use nutrilog_core::recommendation::{
    recommend_with, CandidateFilter, CandidateFood, Recommendation, RecommendationConfig,
};
use nutrilog_core::streak::compute_streak;
use nutrilog_core::trend::{build_trend, compare_weeks, validate_window_days};
use nutrilog_core::types::{DbId, LocalDate};
use nutrilog_db::repositories::{FoodRepo, LogEntryRepo, NutrientTargetRepo, UserRepo};
use serde::Serialize;
use sqlx::PgConnection;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{
    validated, ContributorParams, GapsParams, RecommendationParams, TrendParams,
};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared lookups
// ---------------------------------------------------------------------------

/// The user's local "today", resolved from their stored UTC offset.
async fn user_today(conn: &mut PgConnection, user_id: DbId) -> AppResult<LocalDate> {
    let user = UserRepo::find_by_id(conn, user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user_id,
        })?;
    Ok(local_today(Utc::now(), user.utc_offset_minutes))
}

async fn user_targets(conn: &mut PgConnection, user_id: DbId) -> AppResult<NutrientTarget> {
    Ok(NutrientTargetRepo::find_for_user(conn, user_id)
        .await?
        .unwrap_or_default())
}

/// First day of a window of `days` days ending at `today`.
fn window_start(today: LocalDate, days: u32) -> LocalDate {
    today - Duration::days(i64::from(days.saturating_sub(1)))
}

// ---------------------------------------------------------------------------
// Gaps
// ---------------------------------------------------------------------------

/// GET /nutrition/gaps?date=
pub async fn get_gaps(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<GapsParams>,
) -> AppResult<impl IntoResponse> {
    let params = validated(params)?;
    let mut snapshot = nutrilog_db::begin_snapshot(&state.pool).await?;

    let today = user_today(&mut snapshot, auth.user_id).await?;
    let date = params.date.unwrap_or(today);
    let targets = user_targets(&mut snapshot, auth.user_id).await?;
    let entries = LogEntryRepo::list_for_range(&mut snapshot, auth.user_id, date, date).await?;
    snapshot.commit().await?;

    let report = analyze_day(date, &totals_for_date(&entries, date), &targets);

    tracing::info!(
        user_id = auth.user_id,
        %date,
        entries = entries.len(),
        targets_set = report.targets_set,
        "Gap report computed"
    );

    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    /// `true` when targets are set and every gap is closed.
    pub goals_met: bool,
    pub gaps: GapReport,
    pub recommendations: Vec<Recommendation>,
}

/// GET /nutrition/recommendations?limit=
pub async fn get_recommendations(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<impl IntoResponse> {
    let params = validated(params)?;
    let analytics = &state.config.analytics;
    let filter = CandidateFilter::default();

    let mut snapshot = nutrilog_db::begin_snapshot(&state.pool).await?;
    let today = user_today(&mut snapshot, auth.user_id).await?;
    let targets = user_targets(&mut snapshot, auth.user_id).await?;
    let entries = LogEntryRepo::list_for_range(&mut snapshot, auth.user_id, today, today).await?;
    let foods =
        FoodRepo::list_candidates(&mut snapshot, &filter, analytics.recommendation_candidate_limit)
            .await?;
    snapshot.commit().await?;

    let consumed = totals_for_date(&entries, today);
    let gaps = compute_gaps(&consumed, &targets);
    let candidates = filter.apply(foods.into_iter().map(CandidateFood::from).collect());

    let config = RecommendationConfig {
        max_results: params.limit.unwrap_or(analytics.recommendation_limit),
        calorie_overshoot_fraction: analytics.calorie_overshoot_fraction,
        ..RecommendationConfig::default()
    };
    let recommendations = recommend_with(&gaps, &candidates, &config);
    let report = analyze_day(today, &consumed, &targets);

    tracing::info!(
        user_id = auth.user_id,
        candidates = candidates.len(),
        returned = recommendations.len(),
        "Recommendations ranked"
    );

    Ok(Json(DataResponse {
        data: RecommendationsResponse {
            goals_met: report.targets_set && gaps.all_met(),
            gaps: report,
            recommendations,
        },
    }))
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// GET /nutrition/trend?days=
pub async fn get_trend(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> AppResult<impl IntoResponse> {
    let params = validated(params)?;
    let days = validate_window_days(params.days.unwrap_or(state.config.analytics.trend_window_days))?;

    let mut snapshot = nutrilog_db::begin_snapshot(&state.pool).await?;
    let today = user_today(&mut snapshot, auth.user_id).await?;
    let targets = user_targets(&mut snapshot, auth.user_id).await?;
    let entries =
        LogEntryRepo::list_for_range(&mut snapshot, auth.user_id, window_start(today, days), today)
            .await?;
    snapshot.commit().await?;

    let daily = group_daily_totals(&entries);
    let trend = build_trend(&daily, &targets, today, days, None);

    tracing::info!(user_id = auth.user_id, days, logged_days = daily.len(), "Trend built");

    Ok(Json(DataResponse { data: trend }))
}

/// GET /nutrition/trend/weekly
pub async fn get_weekly_trend(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut snapshot = nutrilog_db::begin_snapshot(&state.pool).await?;
    let today = user_today(&mut snapshot, auth.user_id).await?;
    let entries =
        LogEntryRepo::list_for_range(&mut snapshot, auth.user_id, window_start(today, 14), today)
            .await?;
    snapshot.commit().await?;

    let changes = compare_weeks(&group_daily_totals(&entries), today);

    tracing::info!(user_id = auth.user_id, nutrients = changes.len(), "Weekly comparison built");

    Ok(Json(DataResponse { data: changes }))
}

// ---------------------------------------------------------------------------
// Streak
// ---------------------------------------------------------------------------

/// GET /nutrition/streak
pub async fn get_streak(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut snapshot = nutrilog_db::begin_snapshot(&state.pool).await?;
    let today = user_today(&mut snapshot, auth.user_id).await?;
    let dates = LogEntryRepo::distinct_dates(&mut snapshot, auth.user_id).await?;
    snapshot.commit().await?;

    let streak = compute_streak(&dates, today);

    tracing::info!(
        user_id = auth.user_id,
        current = streak.current,
        best = streak.best,
        status = ?streak.status,
        "Streak computed"
    );

    Ok(Json(DataResponse { data: streak }))
}

// ---------------------------------------------------------------------------
// Contributors
// ---------------------------------------------------------------------------

/// GET /nutrition/contributors?nutrient_id=&days=&limit=
pub async fn get_contributors(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContributorParams>,
) -> AppResult<impl IntoResponse> {
    let params = validated(params)?;
    let nutrient = validate_contributor_nutrient(NutrientId(params.nutrient_id))?;
    let days = validate_lookback_days(params.days.unwrap_or(DEFAULT_LOOKBACK_DAYS))?;
    let limit = params.limit.unwrap_or(DEFAULT_CONTRIBUTOR_LIMIT);

    let mut snapshot = nutrilog_db::begin_snapshot(&state.pool).await?;
    let today = user_today(&mut snapshot, auth.user_id).await?;
    let entries =
        LogEntryRepo::list_for_range(&mut snapshot, auth.user_id, window_start(today, days), today)
            .await?;
    snapshot.commit().await?;

    let contributors = top_contributors(&entries, nutrient, limit);

    tracing::info!(
        user_id = auth.user_id,
        nutrient_id = nutrient.0,
        days,
        foods = contributors.len(),
        "Top contributors ranked"
    );

    Ok(Json(DataResponse { data: contributors }))
}
