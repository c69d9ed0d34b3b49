#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use nutrilog_api::auth::jwt::{Claims, JwtConfig};
use nutrilog_api::config::{AnalyticsConfig, ServerConfig};
use nutrilog_api::router::build_app_router;
use nutrilog_api::state::AppState;
use nutrilog_core::types::{DbId, Timestamp};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            leeway_secs: 60,
        },
        analytics: AnalyticsConfig::default(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Sign a valid access token for `user_id`.
pub fn token_for(user_id: DbId) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: "user".to_string(),
        exp: now + 900,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_as(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token_for(user_id)))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    user_id: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token_for(user_id)))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub async fn seed_user(pool: &PgPool, username: &str) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO users (username, utc_offset_minutes) VALUES ($1, 0) RETURNING id")
            .bind(username)
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

pub async fn seed_food(
    pool: &PgPool,
    name: &str,
    energy: f64,
    protein: f64,
    carb: f64,
    fat: f64,
) -> DbId {
    let row: (DbId,) = sqlx::query_as(
        "INSERT INTO foods (name, energy_kcal, protein_g, carbohydrate_g, fat_g)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(name)
    .bind(energy)
    .bind(protein)
    .bind(carb)
    .bind(fat)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

pub async fn seed_targets(pool: &PgPool, user_id: DbId, energy: f64, protein: f64, carb: f64, fat: f64) {
    sqlx::query(
        "INSERT INTO nutrient_targets (user_id, energy_kcal, protein_g, carbohydrate_g, fat_g)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(energy)
    .bind(protein)
    .bind(carb)
    .bind(fat)
    .execute(pool)
    .await
    .unwrap();
}

/// Log `serving_g` of a food at `consumed_at` through the repository, so the
/// local date and contribution are derived the same way production does.
pub async fn log_food(
    pool: &PgPool,
    user_id: DbId,
    food_id: DbId,
    serving_g: f64,
    consumed_at: Timestamp,
) {
    nutrilog_db::repositories::LogEntryRepo::create(
        pool,
        &nutrilog_db::models::log_entry::CreateLogEntry {
            user_id,
            food_id,
            serving_g,
            consumed_at,
        },
    )
    .await
    .unwrap()
    .expect("seeded user and food must exist");
}
