//! Nutrition analytics core.
//!
//! Pure, synchronous computations over already-materialized inputs: gap
//! analysis, food recommendations, trend windows, logging streaks, and the
//! quiz leaderboard. Nothing in this crate performs I/O or reads a clock.

pub mod aggregation;
pub mod contributors;
pub mod error;
pub mod gap;
pub mod leaderboard;
pub mod nutrients;
pub mod quiz;
pub mod recommendation;
pub mod streak;
pub mod trend;
pub mod types;
