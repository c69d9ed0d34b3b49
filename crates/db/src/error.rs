use nutrilog_core::error::CoreError;

/// Error for repository writes that validate their input before touching
/// the database.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
