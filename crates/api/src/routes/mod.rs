pub mod admin;
pub mod attendance;
pub mod batch;
pub mod facts;
pub mod health;
pub mod me;
pub mod session;
pub mod student;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /batches                                  list active (staff), create (admin)
/// /batches/{id}                             get (staff), update (admin)
/// /batches/{id}/status                      set status (admin, PUT)
/// /batches/{id}/students                    list (staff), link (admin)
/// /batches/{id}/sessions                    list (enrolled or staff), create (admin)
/// /batches/{id}/today                       today's session (student)
///
/// /sessions/{id}                            update (admin, PUT)
/// /sessions/{id}/attendance                 roster (staff)
///
/// /attendance                               mark (staff, POST)
///
/// /students/{id}/attendance                 history (staff or self)
/// /students/{id}/wallet                     wallet and journal (staff or self)
///
/// /me/batches                               live batches with remaining classes
///
/// /facts/student-onboarded                  onboarding fact (admin, POST)
/// /facts/top-up-settled                     top-up fact (admin, POST)
///
/// /admin/ledger/metrics                     ledger counters (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Batches with their enrollments and sessions.
        .nest("/batches", batch::router())
        // Session edits and rosters.
        .nest("/sessions", session::router())
        // Attendance marking (ledger entry point).
        .nest("/attendance", attendance::router())
        // Per-student wallet and history.
        .nest("/students", student::router())
        // Caller-scoped views.
        .nest("/me", me::router())
        // Facts from onboarding and payments.
        .nest("/facts", facts::router())
        // Operator diagnostics.
        .nest("/admin", admin::router())
}
