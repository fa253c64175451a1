#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use classroll_api::auth::jwt::{generate_access_token, JwtConfig};
use classroll_api::config::{LedgerConfig, ServerConfig};
use classroll_api::router::build_app_router;
use classroll_api::state::AppState;
use classroll_core::ledger::Tariff;

pub const ADMIN_ID: i64 = 1;
pub const TEACHER_ID: i64 = 2;

/// Both buckets charge 1000 per session in tests.
pub const TEST_SESSION_COST: i64 = 1000;

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "classroll-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
        ledger: LedgerConfig {
            tariff: Tariff {
                online: TEST_SESSION_COST,
                offline: TEST_SESSION_COST,
            },
            ..LedgerConfig::default()
        },
    }
}

/// The production router over the given pool, with fresh counters.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

/// Like [`build_test_app`], but shares `state` across requests so counters
/// accumulate.
pub fn build_app_with_state(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config())
}

pub fn token(principal_id: i64, role: &str) -> String {
    generate_access_token(principal_id, role, &test_config().jwt).unwrap()
}

pub fn admin_token() -> String {
    token(ADMIN_ID, "admin")
}

pub fn teacher_token() -> String {
    token(TEACHER_ID, "teacher")
}

pub fn student_token(student_id: i64) -> String {
    token(student_id, "student")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_anonymous(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::post(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::put(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Onboard a student through the facts endpoint and return the response
/// `data`.
pub async fn onboard(
    pool: &PgPool,
    student_id: i64,
    online_credit: i64,
    offline_credit: i64,
    targets: &[i64],
) -> serde_json::Value {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/facts/student-onboarded",
        &admin_token(),
        serde_json::json!({
            "student_id": student_id,
            "student_number": format!("GZST{student_id:04}"),
            "name": format!("Student {student_id}"),
            "initial_online_credit": online_credit,
            "initial_offline_credit": offline_credit,
            "enroll_targets": targets,
        }),
    )
    .await;
    body_json(response).await["data"].clone()
}

/// Create a batch through the API and return its id.
pub async fn create_batch(pool: &PgPool, body: serde_json::Value) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/batches",
        &admin_token(),
        body,
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

pub async fn create_online_batch(pool: &PgPool, name: &str) -> i64 {
    create_batch(
        pool,
        serde_json::json!({
            "name": name,
            "mode": "ONLINE",
            "start_date": "2026-11-01",
        }),
    )
    .await
}

pub async fn create_session(
    pool: &PgPool,
    batch_id: i64,
    number: i32,
    date: &str,
    connection_info: Option<&str>,
) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/batches/{batch_id}/sessions"),
        &admin_token(),
        serde_json::json!({
            "session_number": number,
            "title": format!("Session {number}"),
            "date": date,
            "start_time": "10:00 AM",
            "end_time": "11:00 AM",
            "connection_info": connection_info,
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
