//! Route definitions for facts delivered by collaborating services.

use axum::routing::post;
use axum::Router;

use crate::handlers::facts;
use crate::state::AppState;

/// Routes mounted at `/facts`.
///
/// ```text
/// POST   /student-onboarded    -> student_onboarded
/// POST   /top-up-settled       -> top_up_settled
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/student-onboarded", post(facts::student_onboarded))
        .route("/top-up-settled", post(facts::top_up_settled))
}
