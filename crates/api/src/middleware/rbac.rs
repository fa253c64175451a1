//! Role-based extractors.
//!
//! Each wraps [`AuthUser`] and rejects with 403 when the role does not
//! match.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use classroll_core::error::CoreError;
use classroll_core::roles::{ROLE_ADMIN, ROLE_STUDENT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.into()))
}

/// Requires the `admin` role.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(forbidden("Admin role required"));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `admin` or `teacher`.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff() {
            return Err(forbidden("Admin or Teacher role required"));
        }
        Ok(RequireStaff(user))
    }
}

/// Requires the `student` role.
pub struct RequireStudent(pub AuthUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_STUDENT {
            return Err(forbidden("Student role required"));
        }
        Ok(RequireStudent(user))
    }
}
