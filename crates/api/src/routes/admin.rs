use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /ledger/metrics       -> ledger_metrics
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/ledger/metrics", get(admin::ledger_metrics))
}
