//! Handlers for batch sessions, including the student-facing gated views.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use classroll_core::batch::BatchMode;
use classroll_core::error::CoreError;
use classroll_core::schedule::{
    is_connection_info_visible, validate_session_times, LINK_PLACEHOLDER, TODAY_LINK_PLACEHOLDER,
};
use classroll_core::types::DbId;
use classroll_db::models::session::{BatchSession, CreateSession, UpdateSession};
use classroll_db::repositories::{EnrollmentRepo, SessionRepo};
use serde::Serialize;

use super::batch::{require_batch, BatchView};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStudent};
use crate::response::DataResponse;
use crate::state::AppState;

/// Today's class for a student, if any, and the next class date.
#[derive(Debug, Serialize)]
pub struct TodaySession {
    pub batch: BatchView,
    pub has_class_today: bool,
    pub session: Option<BatchSession>,
    pub next_class_date: Option<NaiveDate>,
}

/// Hide the links of an ONLINE session until an hour before it starts.
///
/// The stored row is untouched; only the returned copy is rewritten.
pub fn gate_session(
    mut session: BatchSession,
    now: NaiveDateTime,
    placeholder: &str,
) -> AppResult<BatchSession> {
    let mode = session.batch_mode().map_err(AppError::InternalError)?;
    if !is_connection_info_visible(mode, session.date, &session.start_time, now) {
        session.connection_info = Some(placeholder.to_string());
        session.classroom_link = None;
    }
    Ok(session)
}

async fn ensure_enrolled(state: &AppState, batch_id: DbId, student_id: DbId) -> AppResult<()> {
    if !EnrollmentRepo::exists(&state.pool, batch_id, student_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Student is not enrolled in this batch".into(),
        )));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Session title must not be empty".into()));
    }
    Ok(())
}

fn ensure_link_allowed(mode: BatchMode, classroom_link: Option<&str>) -> Result<(), CoreError> {
    if classroom_link.is_some() && mode == BatchMode::Offline {
        return Err(CoreError::Validation(
            "classroom_link is only allowed for ONLINE sessions".into(),
        ));
    }
    Ok(())
}

/// POST /api/v1/batches/{id}/sessions
///
/// The session inherits the batch's current mode.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
    Json(input): Json<CreateSession>,
) -> AppResult<(StatusCode, Json<DataResponse<BatchSession>>)> {
    let batch = require_batch(&state, batch_id).await?.batch;
    let mode = BatchMode::parse(&batch.mode).map_err(AppError::InternalError)?;

    if input.session_number < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "session_number must be at least 1".into(),
        )));
    }
    validate_title(&input.title)?;
    validate_session_times(&input.start_time, &input.end_time).map_err(CoreError::Validation)?;
    ensure_link_allowed(mode, input.classroom_link.as_deref())?;

    if SessionRepo::number_exists(&state.pool, batch_id, input.session_number).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Session number {} already exists for batch {batch_id}",
            input.session_number
        ))));
    }

    let session = SessionRepo::create(&state.pool, batch_id, mode, &input).await?;

    tracing::info!(
        batch_id,
        session_id = session.id,
        session_number = session.session_number,
        user_id = admin.user_id,
        "Session created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(session))))
}

/// GET /api/v1/batches/{id}/sessions
///
/// Staff see stored values. Enrolled students see the gated view.
pub async fn list_for_batch(
    user: AuthUser,
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<BatchSession>>>> {
    require_batch(&state, batch_id).await?;

    if user.is_staff() {
        let sessions = SessionRepo::list_for_batch(&state.pool, batch_id).await?;
        return Ok(Json(DataResponse::new(sessions)));
    }
    if !user.is_student() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Session listings are available to staff and enrolled students".into(),
        )));
    }

    ensure_enrolled(&state, batch_id, user.user_id).await?;
    let now = state.config.ledger.clock.local(Utc::now());
    let sessions = SessionRepo::list_for_batch(&state.pool, batch_id)
        .await?
        .into_iter()
        .map(|s| gate_session(s, now, LINK_PLACEHOLDER))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(DataResponse::new(sessions)))
}

/// GET /api/v1/batches/{id}/today
pub async fn today(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
) -> AppResult<Json<DataResponse<TodaySession>>> {
    let batch = require_batch(&state, batch_id).await?;
    ensure_enrolled(&state, batch_id, user.user_id).await?;

    let now = state.config.ledger.clock.local(Utc::now());
    let today = now.date();

    let session = match SessionRepo::find_on_date(&state.pool, batch_id, today).await? {
        Some(session) => Some(gate_session(session, now, TODAY_LINK_PLACEHOLDER)?),
        None => None,
    };
    let next_class_date = SessionRepo::find_next_after(&state.pool, batch_id, today)
        .await?
        .map(|s| s.date);

    Ok(Json(DataResponse::new(TodaySession {
        batch: batch.into(),
        has_class_today: session.is_some(),
        session,
        next_class_date,
    })))
}

/// PUT /api/v1/sessions/{id}
///
/// A `null` `connection_info` clears it; an absent one leaves it as is.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSession>,
) -> AppResult<Json<DataResponse<BatchSession>>> {
    let existing = SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Session", id)))?;

    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if input.start_time.is_some() || input.end_time.is_some() {
        let start = input.start_time.as_deref().unwrap_or(&existing.start_time);
        let end = input.end_time.as_deref().unwrap_or(&existing.end_time);
        validate_session_times(start, end).map_err(CoreError::Validation)?;
    }
    let mode = existing.batch_mode().map_err(AppError::InternalError)?;
    ensure_link_allowed(mode, input.classroom_link.as_deref())?;

    let session = SessionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Session", id)))?;

    tracing::info!(session_id = id, user_id = admin.user_id, "Session updated");
    Ok(Json(DataResponse::new(session)))
}
