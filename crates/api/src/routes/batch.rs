//! Route definitions for the `/batches` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{batch, session};
use crate::state::AppState;

/// Routes mounted at `/batches`.
///
/// ```text
/// GET    /                     -> list_active
/// POST   /                     -> create
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// PUT    /{id}/status          -> set_status
/// GET    /{id}/students        -> list_students
/// POST   /{id}/students        -> link_student
/// GET    /{id}/sessions        -> session::list_for_batch
/// POST   /{id}/sessions        -> session::create
/// GET    /{id}/today           -> session::today
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(batch::list_active).post(batch::create))
        .route("/{id}", get(batch::get_by_id).put(batch::update))
        .route("/{id}/status", put(batch::set_status))
        .route(
            "/{id}/students",
            get(batch::list_students).post(batch::link_student),
        )
        .route(
            "/{id}/sessions",
            get(session::list_for_batch).post(session::create),
        )
        .route("/{id}/today", get(session::today))
}
