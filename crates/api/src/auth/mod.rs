//! Principal tokens.
//!
//! - [`jwt`] -- HS256 token generation and validation.

pub mod jwt;
