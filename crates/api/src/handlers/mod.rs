pub mod nutrition;
pub mod quiz;
