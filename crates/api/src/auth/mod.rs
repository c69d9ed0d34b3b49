//! Authentication primitives.
//!
//! Tokens are issued by the external identity service; this crate only
//! validates them.

pub mod jwt;
