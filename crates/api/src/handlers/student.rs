//! Handlers for a student's wallet and their live batches.

use axum::extract::{Path, State};
use axum::Json;
use classroll_core::error::CoreError;
use classroll_core::ledger::remaining_sessions;
use classroll_core::types::DbId;
use classroll_db::models::batch::LiveBatchSummary;
use classroll_db::models::wallet::{CreditWallet, WalletTransaction};
use classroll_db::repositories::{BatchRepo, WalletRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Journal lines returned with a wallet.
const RECENT_TRANSACTIONS: i64 = 20;

#[derive(Debug, Serialize)]
pub struct WalletView {
    #[serde(flatten)]
    pub wallet: CreditWallet,
    pub recent_transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Serialize)]
pub struct MyBatch {
    #[serde(flatten)]
    pub batch: LiveBatchSummary,
    pub remaining_classes: i64,
}

/// GET /api/v1/students/{id}/wallet
pub async fn wallet(
    user: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<Json<DataResponse<WalletView>>> {
    user.ensure_staff_or_self(student_id)?;

    let wallet = WalletRepo::find_by_student(&state.pool, student_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Wallet for student", student_id)))?;
    let recent_transactions =
        WalletRepo::list_transactions(&state.pool, wallet.id, RECENT_TRANSACTIONS).await?;

    Ok(Json(DataResponse::new(WalletView {
        wallet,
        recent_transactions,
    })))
}

/// GET /api/v1/me/batches
///
/// LIVE batches the caller is enrolled in, with classes left in the bundle.
pub async fn my_batches(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<MyBatch>>>> {
    let bundle = state.config.ledger.sessions_per_bundle;
    let batches = BatchRepo::list_live_for_student(&state.pool, user.user_id)
        .await?
        .into_iter()
        .map(|batch| MyBatch {
            remaining_classes: remaining_sessions(bundle, batch.attended),
            batch,
        })
        .collect();
    Ok(Json(DataResponse::new(batches)))
}
