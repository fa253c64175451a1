//! Handlers for marking attendance, session rosters, and student history.

use axum::extract::{Path, State};
use axum::Json;
use classroll_core::error::CoreError;
use classroll_core::ledger::AttendanceStatus;
use classroll_core::types::DbId;
use classroll_db::models::attendance::{
    AttendanceHistoryEntry, MarkAttendance, MarkOutcome, RosterEntry,
};
use classroll_db::repositories::{AttendanceRepo, SessionRepo, StudentRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub student_id: DbId,
    pub session_id: DbId,
    pub status: String,
}

async fn require_student(state: &AppState, id: DbId) -> AppResult<()> {
    StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Student", id)))?;
    Ok(())
}

/// POST /api/v1/attendance
///
/// Records PRESENT or ABSENT and settles the session's wallet bucket in the
/// same transaction. Insufficient balance and missing wallets are reported
/// in `warning`, never as errors.
pub async fn mark(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<MarkAttendanceRequest>,
) -> AppResult<Json<DataResponse<MarkOutcome>>> {
    let status = AttendanceStatus::parse(&input.status).map_err(CoreError::Validation)?;
    require_student(&state, input.student_id).await?;

    let mark = MarkAttendance {
        student_id: input.student_id,
        session_id: input.session_id,
        status,
    };
    let outcome = AttendanceRepo::mark(&state.pool, &mark, &state.config.ledger.tariff)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Session", input.session_id)))?;

    state.metrics.record_mark(&outcome);

    match &outcome.warning {
        Some(warning) => tracing::warn!(
            student_id = input.student_id,
            session_id = input.session_id,
            action = %outcome.action,
            bucket = %outcome.bucket,
            new_balance = ?outcome.new_balance,
            warning = %warning,
            user_id = user.user_id,
            "Attendance marked with ledger warning",
        ),
        None => tracing::info!(
            student_id = input.student_id,
            session_id = input.session_id,
            status = %status,
            action = %outcome.action,
            bucket = %outcome.bucket,
            new_balance = ?outcome.new_balance,
            user_id = user.user_id,
            "Attendance marked",
        ),
    }

    Ok(Json(DataResponse::new(outcome)))
}

/// GET /api/v1/sessions/{id}/attendance
///
/// Every enrolled student, with `UNMARKED` for those without a record.
pub async fn roster(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RosterEntry>>>> {
    SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Session", session_id)))?;
    let roster = AttendanceRepo::roster_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse::new(roster)))
}

/// GET /api/v1/students/{id}/attendance
///
/// Newest first.
pub async fn history(
    user: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttendanceHistoryEntry>>>> {
    user.ensure_staff_or_self(student_id)?;
    require_student(&state, student_id).await?;
    let history = AttendanceRepo::history_for_student(&state.pool, student_id).await?;
    Ok(Json(DataResponse::new(history)))
}
