//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table, the
//! `Deserialize` DTOs used for inserts, and conversions into the core types
//! the analytics operate on.

pub mod food;
pub mod log_entry;
pub mod nutrient_target;
pub mod quiz;
pub mod user;
