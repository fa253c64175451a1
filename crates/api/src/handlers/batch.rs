//! Handlers for the `/batches` resource and its enrolled students.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use classroll_core::batch::{
    batch_code_prefix, normalize_location, normalize_venue_type, validate_batch_name, BatchMode,
    BatchStatus, VenueType,
};
use classroll_core::error::CoreError;
use classroll_core::types::DbId;
use classroll_db::models::batch::{
    Batch, BatchEdit, BatchName, BatchStatusUpdate, BatchWithStatus, CreateBatch, NewBatch,
    SetBatchStatus, UpdateBatch,
};
use classroll_db::models::enrollment::{BatchEnrollment, EnrolledStudent};
use classroll_db::repositories::{BatchRepo, EnrollmentRepo, StudentRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// A batch with its status and a convenience `is_live` flag.
#[derive(Debug, Serialize)]
pub struct BatchView {
    #[serde(flatten)]
    pub batch: BatchWithStatus,
    pub is_live: bool,
}

impl From<BatchWithStatus> for BatchView {
    fn from(batch: BatchWithStatus) -> Self {
        let is_live = batch.status == BatchStatus::Live.as_str();
        Self { batch, is_live }
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkStudentRequest {
    pub student_id: DbId,
}

/// OFFLINE-only batch fields, normalised against the mode.
#[derive(Debug, PartialEq)]
struct Placement {
    location: Option<String>,
    city_code: Option<String>,
    venue_type: Option<VenueType>,
}

/// Location, city code, and venue type are all required for OFFLINE and
/// dropped for ONLINE.
fn placement(
    mode: BatchMode,
    location: Option<&str>,
    city_code: Option<&str>,
    venue_type: Option<&str>,
) -> Result<Placement, CoreError> {
    let location = normalize_location(mode, location)?;
    let city_code = match mode {
        BatchMode::Online => None,
        BatchMode::Offline => match city_code.map(str::trim) {
            Some(code) if !code.is_empty() => Some(code.to_ascii_uppercase()),
            _ => {
                return Err(CoreError::Validation(
                    "OFFLINE batches require a city_code".into(),
                ))
            }
        },
    };
    let venue_type = normalize_venue_type(mode, venue_type)?;
    Ok(Placement {
        location,
        city_code,
        venue_type,
    })
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) async fn require_batch(state: &AppState, id: DbId) -> AppResult<BatchWithStatus> {
    BatchRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Batch", id)))
}

/// POST /api/v1/batches
///
/// Without a `name`, the batch is named from `cohort` and `level`.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateBatch>,
) -> AppResult<(StatusCode, Json<DataResponse<BatchView>>)> {
    let mode = BatchMode::parse(&input.mode).map_err(CoreError::Validation)?;

    let name = match (input.name.as_deref(), &input.cohort, &input.level) {
        (Some(name), _, _) => {
            BatchName::Given(validate_batch_name(name).map_err(CoreError::Validation)?)
        }
        (None, Some(cohort), Some(level)) => BatchName::Generated {
            prefix: batch_code_prefix(cohort, level).map_err(CoreError::Validation)?,
        },
        (None, _, _) => {
            return Err(AppError::Core(CoreError::Validation(
                "Either name or both cohort and level are required".into(),
            )))
        }
    };

    let placement = placement(
        mode,
        input.location.as_deref(),
        input.city_code.as_deref(),
        input.venue_type.as_deref(),
    )?;

    let new_batch = NewBatch {
        name,
        mode,
        start_date: input.start_date,
        location: placement.location,
        city_code: placement.city_code,
        venue_type: placement.venue_type,
        level: trimmed(input.level),
        description: input.description.unwrap_or_default().trim().to_string(),
    };
    let batch = BatchRepo::create(&state.pool, &new_batch).await?;

    tracing::info!(
        batch_id = batch.batch.id,
        name = %batch.batch.name,
        mode = %mode,
        user_id = admin.user_id,
        "Batch created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(batch.into()))))
}

/// GET /api/v1/batches
///
/// UPCOMING and LIVE batches.
pub async fn list_active(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<BatchView>>>> {
    let batches = BatchRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse::new(
        batches.into_iter().map(BatchView::from).collect(),
    )))
}

/// GET /api/v1/batches/{id}
pub async fn get_by_id(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BatchView>>> {
    let batch = require_batch(&state, id).await?;
    Ok(Json(DataResponse::new(batch.into())))
}

/// PUT /api/v1/batches/{id}
///
/// The merged batch must still satisfy the location rule for its mode.
/// Existing sessions keep the mode they were created with.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBatch>,
) -> AppResult<Json<DataResponse<Batch>>> {
    let existing = require_batch(&state, id).await?.batch;

    let mode = match input.mode.as_deref() {
        Some(mode) => BatchMode::parse(mode).map_err(CoreError::Validation)?,
        None => BatchMode::parse(&existing.mode).map_err(AppError::InternalError)?,
    };
    let location = input.location.or(existing.location);
    let city_code = input.city_code.or(existing.city_code);
    let venue_type = input.venue_type.or(existing.venue_type);
    let placement = placement(
        mode,
        location.as_deref(),
        city_code.as_deref(),
        venue_type.as_deref(),
    )?;

    let edit = BatchEdit {
        mode,
        start_date: input.start_date.unwrap_or(existing.start_date),
        location: placement.location,
        city_code: placement.city_code,
        venue_type: placement.venue_type,
        level: trimmed(input.level).or(existing.level),
        description: input
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or(existing.description),
    };

    let batch = BatchRepo::update(&state.pool, id, &edit)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Batch", id)))?;

    tracing::info!(batch_id = id, mode = %mode, user_id = admin.user_id, "Batch updated");
    Ok(Json(DataResponse::new(batch)))
}

/// PUT /api/v1/batches/{id}/status
///
/// Any status may be set from any other.
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetBatchStatus>,
) -> AppResult<Json<DataResponse<BatchStatusUpdate>>> {
    let status = BatchStatus::parse(&input.status).map_err(CoreError::Validation)?;

    let update = BatchRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Batch", id)))?;

    tracing::info!(
        batch_id = id,
        from = %update.previous,
        to = %update.status,
        user_id = admin.user_id,
        "Batch status set",
    );
    Ok(Json(DataResponse::new(update)))
}

/// GET /api/v1/batches/{id}/students
pub async fn list_students(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EnrolledStudent>>>> {
    require_batch(&state, id).await?;
    let students = EnrollmentRepo::list_students(&state.pool, id).await?;
    Ok(Json(DataResponse::new(students)))
}

/// POST /api/v1/batches/{id}/students
///
/// Manual link. Unlike onboarding, an existing link is rejected.
pub async fn link_student(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<LinkStudentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BatchEnrollment>>)> {
    require_batch(&state, id).await?;
    let student = StudentRepo::find_by_id(&state.pool, input.student_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Student", input.student_id)))?;

    if EnrollmentRepo::exists(&state.pool, id, student.id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Student {} is already enrolled in batch {id}",
            student.id
        ))));
    }

    let enrollment =
        EnrollmentRepo::create(&state.pool, id, student.id, &student.student_number).await?;

    tracing::info!(
        batch_id = id,
        student_id = student.id,
        user_id = admin.user_id,
        "Student linked to batch",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(enrollment))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_drops_offline_fields() {
        let placement =
            placement(BatchMode::Online, Some("Hall"), Some("blr"), Some("school")).unwrap();
        assert_eq!(
            placement,
            Placement {
                location: None,
                city_code: None,
                venue_type: None,
            }
        );
    }

    #[test]
    fn offline_requires_city_code() {
        assert!(placement(BatchMode::Offline, Some("Hall"), None, Some("school")).is_err());
        let placement =
            placement(BatchMode::Offline, Some(" Hall "), Some("blr"), Some("school")).unwrap();
        assert_eq!(placement.location.as_deref(), Some("Hall"));
        assert_eq!(placement.city_code.as_deref(), Some("BLR"));
        assert_eq!(placement.venue_type, Some(VenueType::School));
    }

    #[test]
    fn offline_requires_venue_type() {
        assert!(placement(BatchMode::Offline, Some("Hall"), Some("blr"), None).is_err());
        assert!(placement(BatchMode::Offline, Some("Hall"), Some("blr"), Some("college")).is_err());
    }
}
