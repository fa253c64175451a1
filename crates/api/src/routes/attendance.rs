use axum::routing::post;
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// POST   /                     -> mark
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(attendance::mark))
}
