//! Route definitions for per-student reads.

use axum::routing::get;
use axum::Router;

use crate::handlers::{attendance, student};
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// GET    /{id}/attendance      -> attendance::history
/// GET    /{id}/wallet          -> wallet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/attendance", get(attendance::history))
        .route("/{id}/wallet", get(student::wallet))
}
