use axum::routing::get;
use axum::Router;

use crate::handlers::student;
use crate::state::AppState;

/// Routes mounted at `/me`, scoped to the authenticated student.
///
/// ```text
/// GET    /batches              -> my_batches
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/batches", get(student::my_batches))
}
