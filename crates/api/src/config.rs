use nutrilog_core::error::CoreError;
use nutrilog_core::leaderboard::DEFAULT_TOP_N;
use nutrilog_core::recommendation::{DEFAULT_CALORIE_OVERSHOOT_FRACTION, DEFAULT_MAX_RESULTS};
use nutrilog_core::trend::{validate_window_days, DEFAULT_WINDOW_DAYS};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight requests to finish after a shutdown signal
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub analytics: AnalyticsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            analytics: AnalyticsConfig::from_env(),
        }
    }
}

/// Tunables for the analytics endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Days in the trend window when `?days=` is omitted.
    pub trend_window_days: u32,
    /// Recommendations returned when `?limit=` is omitted.
    pub recommendation_limit: usize,
    /// Upper bound on catalog rows scored per request.
    pub recommendation_candidate_limit: i64,
    pub calorie_overshoot_fraction: f64,
    /// Leaderboard slice size when `?limit=` is omitted.
    pub leaderboard_top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trend_window_days: DEFAULT_WINDOW_DAYS,
            recommendation_limit: DEFAULT_MAX_RESULTS,
            recommendation_candidate_limit: 500,
            calorie_overshoot_fraction: DEFAULT_CALORIE_OVERSHOOT_FRACTION,
            leaderboard_top_n: DEFAULT_TOP_N,
        }
    }
}

impl AnalyticsConfig {
    /// Load analytics tunables from environment variables with defaults.
    ///
    /// | Env Var                          | Default |
    /// |----------------------------------|---------|
    /// | `TREND_WINDOW_DAYS`              | `7`     |
    /// | `RECOMMENDATION_LIMIT`           | `6`     |
    /// | `RECOMMENDATION_CANDIDATE_LIMIT` | `500`   |
    /// | `CALORIE_OVERSHOOT_FRACTION`     | `1.0`   |
    /// | `LEADERBOARD_TOP_N`              | `25`    |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            trend_window_days: env_or("TREND_WINDOW_DAYS", defaults.trend_window_days),
            recommendation_limit: env_or("RECOMMENDATION_LIMIT", defaults.recommendation_limit),
            recommendation_candidate_limit: env_or(
                "RECOMMENDATION_CANDIDATE_LIMIT",
                defaults.recommendation_candidate_limit,
            ),
            calorie_overshoot_fraction: env_or(
                "CALORIE_OVERSHOOT_FRACTION",
                defaults.calorie_overshoot_fraction,
            ),
            leaderboard_top_n: env_or("LEADERBOARD_TOP_N", defaults.leaderboard_top_n),
        };
        config.validate().expect("Invalid analytics configuration");
        config
    }

    /// Reject values that would make an endpoint return nothing or fail on
    /// every request.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_window_days(self.trend_window_days)?;
        if !(self.calorie_overshoot_fraction.is_finite() && self.calorie_overshoot_fraction > 0.0) {
            return Err(CoreError::Validation(
                "CALORIE_OVERSHOOT_FRACTION must be a positive number".into(),
            ));
        }
        for (key, is_zero) in [
            ("RECOMMENDATION_LIMIT", self.recommendation_limit == 0),
            ("RECOMMENDATION_CANDIDATE_LIMIT", self.recommendation_candidate_limit <= 0),
            ("LEADERBOARD_TOP_N", self.leaderboard_top_n == 0),
        ] {
            if is_zero {
                return Err(CoreError::Validation(format!("{key} must be at least 1")));
            }
        }
        Ok(())
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid value: {e}")),
        Err(_) => default,
    }
}
