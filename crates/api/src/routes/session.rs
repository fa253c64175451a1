//! Route definitions for the `/sessions` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{attendance, session};
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// PUT    /{id}                 -> update
/// GET    /{id}/attendance      -> attendance::roster
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(session::update))
        .route("/{id}/attendance", get(attendance::roster))
}
