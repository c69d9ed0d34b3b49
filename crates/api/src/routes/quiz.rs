use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quiz;
use crate::state::AppState;

/// Routes mounted at `/quiz`.
///
/// ```text
/// GET   /leaderboard  -> get_leaderboard
/// GET   /stats        -> get_stats
/// POST  /outcomes     -> record_outcome
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(quiz::get_leaderboard))
        .route("/stats", get(quiz::get_stats))
        .route("/outcomes", post(quiz::record_outcome))
}
