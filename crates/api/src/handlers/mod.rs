//! Request handlers.
//!
//! Handlers validate input with the pure functions in `classroll_core`,
//! delegate persistence to the repositories in `classroll_db`, and map
//! errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod attendance;
pub mod batch;
pub mod facts;
pub mod session;
pub mod student;
