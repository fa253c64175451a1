//! Operator-only diagnostics.

use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::metrics::LedgerMetricsSnapshot;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/ledger/metrics
pub async fn ledger_metrics(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<LedgerMetricsSnapshot>>> {
    Ok(Json(DataResponse::new(state.metrics.snapshot())))
}
