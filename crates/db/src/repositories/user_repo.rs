//! Repository for the `users` table.

use nutrilog_core::aggregation::validate_utc_offset;
use nutrilog_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, username, utc_offset_minutes, created_at, updated_at";

/// Provides access to users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// An offset outside ±14 hours is rejected before any write.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, RepoError> {
        if let Some(minutes) = input.utc_offset_minutes {
            validate_utc_offset(minutes)?;
        }

        let query = format!(
            "INSERT INTO users (username, utc_offset_minutes)
             VALUES ($1, COALESCE($2, 0))
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(input.utc_offset_minutes)
            .fetch_one(pool)
            .await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
