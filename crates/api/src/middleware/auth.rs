//! JWT-based principal extractor for handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use classroll_core::error::CoreError;
use classroll_core::roles::{is_staff, ROLE_STUDENT};
use classroll_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Principal extracted from a Bearer token in the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The principal's id (`claims.sub`). For students, the student id.
    pub user_id: DbId,
    pub role: String,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        is_staff(&self.role)
    }

    pub fn is_student(&self) -> bool {
        self.role == ROLE_STUDENT
    }

    /// Staff may act on any student; a student only on themself.
    pub fn ensure_staff_or_self(&self, student_id: DbId) -> Result<(), AppError> {
        if self.is_staff() || (self.is_student() && self.user_id == student_id) {
            return Ok(());
        }
        Err(AppError::Core(CoreError::Forbidden(
            "Only staff or the student themself may view this".into(),
        )))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
