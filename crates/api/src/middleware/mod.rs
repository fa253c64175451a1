//! Principal extractors.
//!
//! - [`auth::AuthUser`] -- the verified `{id, role}` from a Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireStaff`] -- requires `admin` or `teacher`.
//! - [`rbac::RequireStudent`] -- requires the `student` role.

pub mod auth;
pub mod rbac;
