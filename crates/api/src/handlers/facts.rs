//! Handlers for facts delivered by the onboarding and payment services.
//!
//! Both endpoints are replay-safe: a redelivered fact returns the current
//! state and moves no money.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use classroll_core::error::CoreError;
use classroll_core::facts::{StudentOnboarded, TargetOutcome, TopUpSettled};
use classroll_db::models::student::{Student, UpsertStudent};
use classroll_db::models::wallet::{CreditWallet, TopUpReceipt};
use classroll_db::repositories::{EnrollmentRepo, StudentRepo, WalletRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OnboardingResult {
    pub student: Student,
    pub wallet: CreditWallet,
    /// False when the wallet already existed and was left untouched.
    pub wallet_created: bool,
    pub enrollments: Vec<TargetOutcome>,
}

/// POST /api/v1/facts/student-onboarded
pub async fn student_onboarded(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(fact): Json<StudentOnboarded>,
) -> AppResult<(StatusCode, Json<DataResponse<OnboardingResult>>)> {
    fact.validate().map_err(CoreError::Validation)?;

    let student = StudentRepo::upsert(
        &state.pool,
        &UpsertStudent {
            id: fact.student_id,
            student_number: fact.student_number.trim().to_string(),
            name: fact.name.trim().to_string(),
            email: fact
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        },
    )
    .await?;

    let opening = WalletRepo::open(&state.pool, student.id, fact.initial_balances()).await?;
    let enrollments = EnrollmentRepo::enroll_targets(
        &state.pool,
        student.id,
        &student.student_number,
        &fact.distinct_targets(),
    )
    .await;

    state.metrics.record_onboarding();

    let failed = enrollments.iter().filter(|t| t.outcome.is_failure()).count();
    tracing::info!(
        student_id = student.id,
        wallet_created = opening.created,
        targets = enrollments.len(),
        failed,
        "Student onboarding applied",
    );

    let status = if opening.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(DataResponse::new(OnboardingResult {
            student,
            wallet: opening.wallet,
            wallet_created: opening.created,
            enrollments,
        })),
    ))
}

/// POST /api/v1/facts/top-up-settled
pub async fn top_up_settled(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(fact): Json<TopUpSettled>,
) -> AppResult<Json<DataResponse<TopUpReceipt>>> {
    fact.validate().map_err(CoreError::Validation)?;

    StudentRepo::find_by_id(&state.pool, fact.student_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Student", fact.student_id)))?;

    let reference = fact.reference.as_deref().map(str::trim);
    let receipt = WalletRepo::top_up(
        &state.pool,
        fact.student_id,
        fact.mode,
        fact.amount,
        reference,
    )
    .await?;

    state.metrics.record_top_up(receipt.duplicate);

    if receipt.duplicate {
        tracing::info!(
            student_id = fact.student_id,
            reference = ?reference,
            "Top-up reference already applied, ignoring",
        );
    } else {
        tracing::info!(
            student_id = fact.student_id,
            bucket = %fact.mode,
            amount = fact.amount,
            "Top-up applied",
        );
    }

    Ok(Json(DataResponse::new(receipt)))
}
