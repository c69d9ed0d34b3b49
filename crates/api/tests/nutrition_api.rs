//! Integration tests for the `/api/v1/nutrition` endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, get, get_as, log_food, seed_food, seed_targets, seed_user};
use serde_json::Value;
use sqlx::PgPool;

/// Find the entry for `nutrient_id` in a list of per-nutrient rows.
fn nutrient<'a>(rows: &'a Value, nutrient_id: u64) -> &'a Value {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|r| r["nutrient_id"] == nutrient_id)
        .unwrap_or_else(|| panic!("nutrient {nutrient_id} missing from {rows}"))
}

// ---------------------------------------------------------------------------
// Gaps
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn gaps_require_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/nutrition/gaps").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gaps_for_unknown_user_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/gaps", 999_999).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gaps_without_targets_report_consumption_only(pool: PgPool) {
    let user = seed_user(&pool, "no-targets").await;
    let app = common::build_test_app(pool);

    let response = get_as(app, "/api/v1/nutrition/gaps", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["targets_set"], false);
    let energy = nutrient(&json["data"]["nutrients"], 1008);
    assert!(energy["target"].is_null());
    assert_eq!(energy["consumed"], 0.0);
    assert_eq!(energy["gap"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gaps_subtract_todays_intake_from_targets(pool: PgPool) {
    let user = seed_user(&pool, "tracker").await;
    seed_targets(&pool, user, 2000.0, 125.0, 250.0, 70.0).await;
    // 200 g yields {1200 kcal, 60 g protein, 150 g carbohydrate, 40 g fat}.
    let food = seed_food(&pool, "Test meal", 600.0, 30.0, 75.0, 20.0).await;
    log_food(&pool, user, food, 200.0, Utc::now()).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/gaps", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let rows = &json["data"]["nutrients"];
    assert_eq!(json["data"]["targets_set"], true);
    assert_eq!(nutrient(rows, 1008)["gap"], 800.0);
    assert_eq!(nutrient(rows, 1003)["gap"], 65.0);
    assert_eq!(nutrient(rows, 1005)["gap"], 100.0);
    assert_eq!(nutrient(rows, 1004)["gap"], 30.0);
    assert_eq!(nutrient(rows, 1003)["consumed"], 60.0);

    let order: Vec<u64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["nutrient_id"].as_u64().unwrap())
        .collect();
    assert_eq!(order, vec![1008, 1003, 1005, 1004]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gaps_for_explicit_date_ignore_other_days(pool: PgPool) {
    let user = seed_user(&pool, "historian").await;
    seed_targets(&pool, user, 2000.0, 125.0, 250.0, 70.0).await;
    let food = seed_food(&pool, "Test meal", 600.0, 30.0, 75.0, 20.0).await;
    log_food(&pool, user, food, 100.0, Utc::now()).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/gaps?date=2020-01-01", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["date"], "2020-01-01");
    assert_eq!(nutrient(&json["data"]["nutrients"], 1008)["gap"], 2000.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gaps_reject_malformed_date(pool: PgPool) {
    let user = seed_user(&pool, "typo").await;
    let app = common::build_test_app(pool);

    let response = get_as(app, "/api/v1/nutrition/gaps?date=yesterday", user).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn recommendations_rank_foods_that_close_gaps(pool: PgPool) {
    let user = seed_user(&pool, "hungry").await;
    seed_targets(&pool, user, 2000.0, 125.0, 250.0, 70.0).await;
    let meal = seed_food(&pool, "Test meal", 600.0, 30.0, 75.0, 20.0).await;
    log_food(&pool, user, meal, 200.0, Utc::now()).await;

    let pork = seed_food(&pool, "Pork loin, lean, roasted", 200.0, 30.0, 5.0, 2.0).await;
    let rice = seed_food(&pool, "White rice, cooked", 130.0, 2.7, 28.0, 0.3).await;
    seed_food(&pool, "Potato chips", 300.0, 6.0, 50.0, 10.0).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/recommendations", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["goals_met"], false);

    let ids: Vec<i64> = data["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["food_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![pork, rice]);
    assert!(data["recommendations"][0]["score"].as_f64().unwrap() > 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recommendations_are_empty_when_goals_are_met(pool: PgPool) {
    let user = seed_user(&pool, "satisfied").await;
    seed_targets(&pool, user, 1000.0, 50.0, 100.0, 30.0).await;
    let meal = seed_food(&pool, "Test meal", 600.0, 30.0, 75.0, 20.0).await;
    log_food(&pool, user, meal, 200.0, Utc::now()).await;
    seed_food(&pool, "Pork loin, lean, roasted", 200.0, 30.0, 5.0, 2.0).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/recommendations", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["goals_met"], true);
    assert!(json["data"]["recommendations"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_foods_do_not_crowd_out_good_candidates(pool: PgPool) {
    let user = seed_user(&pool, "picky").await;
    seed_targets(&pool, user, 2000.0, 125.0, 250.0, 70.0).await;
    // A full candidate page of in-range foods that the blacklist rejects.
    sqlx::query(
        "INSERT INTO foods (name, energy_kcal, protein_g, carbohydrate_g, fat_g)
         SELECT 'Fried snack ' || n, 200, 5, 20, 10 FROM generate_series(1, 500) AS n",
    )
    .execute(&pool)
    .await
    .unwrap();
    let chicken = seed_food(&pool, "Chicken breast", 165.0, 31.0, 0.0, 3.6).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/recommendations", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["goals_met"], false);
    let recommendations = json["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["food_id"], chicken);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recommendations_reject_zero_limit(pool: PgPool) {
    let user = seed_user(&pool, "limited").await;
    let app = common::build_test_app(pool);

    let response = get_as(app, "/api/v1/nutrition/recommendations?limit=0", user).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn trend_defaults_to_a_week_ending_today(pool: PgPool) {
    let user = seed_user(&pool, "trending").await;
    seed_targets(&pool, user, 2000.0, 125.0, 250.0, 70.0).await;
    let meal = seed_food(&pool, "Test meal", 600.0, 30.0, 75.0, 20.0).await;
    log_food(&pool, user, meal, 100.0, Utc::now()).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/trend", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let days = json["data"].as_array().unwrap();
    assert_eq!(days.len(), 7);

    let today = days.last().unwrap();
    assert_eq!(today["logged"], true);
    assert_eq!(nutrient(&today["nutrients"], 1008)["value"], 600.0);
    assert_eq!(days[0]["logged"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn trend_honours_requested_window(pool: PgPool) {
    let user = seed_user(&pool, "monthly").await;
    let app = common::build_test_app(pool);

    let response = get_as(app, "/api/v1/nutrition/trend?days=30", user).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 30);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn trend_rejects_out_of_range_windows(pool: PgPool) {
    let user = seed_user(&pool, "greedy").await;

    for uri in ["/api/v1/nutrition/trend?days=0", "/api/v1/nutrition/trend?days=400"] {
        let app = common::build_test_app(pool.clone());
        let response = get_as(app, uri, user).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weekly_trend_compares_against_last_week(pool: PgPool) {
    let user = seed_user(&pool, "weekly").await;
    let meal = seed_food(&pool, "Test meal", 600.0, 30.0, 75.0, 20.0).await;
    log_food(&pool, user, meal, 100.0, Utc::now()).await;
    log_food(&pool, user, meal, 100.0, Utc::now() - Duration::days(8)).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/trend/weekly", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let rows = &json["data"];
    assert_eq!(rows.as_array().unwrap().len(), 4);
    let energy = nutrient(rows, 1008);
    assert_eq!(energy["change"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weekly_trend_is_empty_without_recent_logs(pool: PgPool) {
    let user = seed_user(&pool, "quiet").await;
    let app = common::build_test_app(pool);

    let response = get_as(app, "/api/v1/nutrition/trend/weekly", user).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Streak
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn streak_without_logs(pool: PgPool) {
    let user = seed_user(&pool, "fresh").await;
    let app = common::build_test_app(pool);

    let response = get_as(app, "/api/v1/nutrition/streak", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["current"], 0);
    assert_eq!(json["data"]["status"], "no_logs");
    assert!(json["data"]["last_logged_date"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn streak_counts_consecutive_days(pool: PgPool) {
    let user = seed_user(&pool, "consistent").await;
    let meal = seed_food(&pool, "Test meal", 600.0, 30.0, 75.0, 20.0).await;
    let now = Utc::now();
    for days_ago in 0..3 {
        log_food(&pool, user, meal, 100.0, now - Duration::days(days_ago)).await;
    }
    // A second entry on the same day does not extend the streak.
    log_food(&pool, user, meal, 50.0, now).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/streak", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["current"], 3);
    assert_eq!(json["data"]["best"], 3);
    assert_eq!(json["data"]["status"], "active");
}

// ---------------------------------------------------------------------------
// Contributors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn contributors_rank_foods_by_nutrient(pool: PgPool) {
    let user = seed_user(&pool, "protein-fan").await;
    let chicken = seed_food(&pool, "Chicken breast", 165.0, 31.0, 0.0, 3.6).await;
    let yogurt = seed_food(&pool, "Greek yogurt", 59.0, 10.0, 3.6, 0.4).await;
    let apple = seed_food(&pool, "Apple", 52.0, 0.0, 14.0, 0.2).await;
    let now = Utc::now();
    log_food(&pool, user, chicken, 100.0, now).await;
    log_food(&pool, user, yogurt, 100.0, now).await;
    log_food(&pool, user, yogurt, 100.0, now - Duration::days(1)).await;
    log_food(&pool, user, apple, 100.0, now).await;

    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/nutrition/contributors?nutrient_id=1003", user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["food_id"], chicken);
    assert_eq!(rows[1]["food_id"], yogurt);
    assert_eq!(rows[1]["entry_count"], 2);
    assert_eq!(rows[1]["total"], 20.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn contributors_reject_untracked_nutrient(pool: PgPool) {
    let user = seed_user(&pool, "curious").await;
    let app = common::build_test_app(pool);

    let response = get_as(app, "/api/v1/nutrition/contributors?nutrient_id=1079", user).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
