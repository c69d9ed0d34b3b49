pub mod health;
pub mod nutrition;
pub mod quiz;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /nutrition/gaps                  gap report for one local date
/// /nutrition/recommendations       ranked foods for today's gaps
/// /nutrition/trend                 rolling deviation window
/// /nutrition/trend/weekly          this week vs last week
/// /nutrition/streak                logging streak
/// /nutrition/contributors          top foods for one nutrient
///
/// /quiz/leaderboard                ranked quiz standings
/// /quiz/stats                      caller's quiz counters
/// /quiz/outcomes                   record an answer outcome (POST)
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/nutrition", nutrition::router())
        .nest("/quiz", quiz::router())
}
