//! Repository layer.
//!
//! Each repository is a zero-sized struct. Writes take `&PgPool`; reads that
//! feed an analytics computation take `&mut PgConnection` so callers can run
//! them inside one snapshot transaction.

pub mod food_repo;
pub mod log_entry_repo;
pub mod nutrient_target_repo;
pub mod quiz_participant_repo;
pub mod user_repo;

pub use food_repo::FoodRepo;
pub use log_entry_repo::LogEntryRepo;
pub use nutrient_target_repo::NutrientTargetRepo;
pub use quiz_participant_repo::QuizParticipantRepo;
pub use user_repo::UserRepo;
