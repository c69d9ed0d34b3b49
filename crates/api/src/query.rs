//! Query parameter types for the analytics handlers.
//!
//! Ranges are enforced with `validator`; call [`validated`] on the extracted
//! struct before use.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;

/// Run `validator` rules on extracted parameters.
pub fn validated<T: Validate>(params: T) -> AppResult<T> {
    params.validate()?;
    Ok(params)
}

/// `GET /nutrition/gaps?date=`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct GapsParams {
    /// Local date to analyze (`YYYY-MM-DD`). Defaults to the user's today.
    pub date: Option<NaiveDate>,
}

/// `GET /nutrition/recommendations?limit=`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RecommendationParams {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

/// `GET /nutrition/trend?days=`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TrendParams {
    #[validate(range(min = 1, max = 366))]
    pub days: Option<u32>,
}

/// `GET /nutrition/contributors?nutrient_id=&days=&limit=`
#[derive(Debug, Deserialize, Validate)]
pub struct ContributorParams {
    pub nutrient_id: u32,
    #[validate(range(min = 1, max = 366))]
    pub days: Option<u32>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

/// `GET /quiz/leaderboard?sort=&limit=`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LeaderboardParams {
    /// `score` (default) or `streak`.
    pub sort: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use nutrilog_core::error::CoreError;

    use super::*;
    use crate::error::AppError;

    #[test]
    fn limit_out_of_range_is_a_validation_error() {
        let params = RecommendationParams { limit: Some(0) };
        assert_matches!(
            validated(params),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[test]
    fn absent_optional_fields_pass() {
        assert!(validated(TrendParams::default()).is_ok());
        assert!(validated(LeaderboardParams::default()).is_ok());
    }

    #[test]
    fn days_upper_bound() {
        assert!(validated(TrendParams { days: Some(366) }).is_ok());
        assert!(validated(TrendParams { days: Some(367) }).is_err());
    }
}
