//! Route definitions for the nutrition analytics endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::nutrition;
use crate::state::AppState;

/// Routes mounted at `/nutrition`.
///
/// ```text
/// GET  /gaps              -> get_gaps
/// GET  /recommendations   -> get_recommendations
/// GET  /trend             -> get_trend
/// GET  /trend/weekly      -> get_weekly_trend
/// GET  /streak            -> get_streak
/// GET  /contributors      -> get_contributors
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gaps", get(nutrition::get_gaps))
        .route("/recommendations", get(nutrition::get_recommendations))
        .route("/trend", get(nutrition::get_trend))
        .route("/trend/weekly", get(nutrition::get_weekly_trend))
        .route("/streak", get(nutrition::get_streak))
        .route("/contributors", get(nutrition::get_contributors))
}
