//! HTTP tests for the onboarding and top-up facts.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, create_online_batch, onboard, post_json,
    teacher_token,
};
use sqlx::PgPool;

fn onboarding_body(student_id: i64, targets: &[i64]) -> serde_json::Value {
    serde_json::json!({
        "student_id": student_id,
        "student_number": format!("GZST{student_id:04}"),
        "name": "Meera",
        "email": "meera@example.com",
        "initial_online_credit": 6000,
        "initial_offline_credit": 3000,
        "enroll_targets": targets,
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn onboarding_is_idempotent(pool: PgPool) {
    let batch_id = create_online_batch(&pool, "Onboard Target").await;
    let uri = "/api/v1/facts/student-onboarded";

    let first = post_json(
        build_test_app(pool.clone()),
        uri,
        &admin_token(),
        onboarding_body(41, &[batch_id]),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let data = &body_json(first).await["data"];
    assert_eq!(data["wallet_created"], true);
    assert_eq!(data["wallet"]["online_balance"], 6000);
    assert_eq!(data["wallet"]["offline_balance"], 3000);
    assert_eq!(data["enrollments"][0]["outcome"], "ENROLLED");

    let again = post_json(
        build_test_app(pool),
        uri,
        &admin_token(),
        onboarding_body(41, &[batch_id]),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
    let data = &body_json(again).await["data"];
    assert_eq!(data["wallet_created"], false);
    assert_eq!(data["wallet"]["online_balance"], 6000);
    assert_eq!(data["enrollments"][0]["outcome"], "ALREADY_ENROLLED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_target_does_not_block_others(pool: PgPool) {
    let batch_id = create_online_batch(&pool, "Real Target").await;

    let data = onboard(&pool, 42, 0, 0, &[999999, batch_id]).await;
    assert_eq!(data["enrollments"][0]["batch_id"], 999999);
    assert_eq!(data["enrollments"][0]["outcome"], "FAILED");
    assert_eq!(data["enrollments"][1]["outcome"], "ENROLLED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn onboarding_rejects_negative_credit(pool: PgPool) {
    let mut body = onboarding_body(43, &[]);
    body["initial_online_credit"] = serde_json::json!(-5);
    let response = post_json(
        build_test_app(pool),
        "/api/v1/facts/student-onboarded",
        &admin_token(),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn top_up_reference_applies_once(pool: PgPool) {
    onboard(&pool, 44, 0, 0, &[]).await;
    let body = serde_json::json!({
        "student_id": 44,
        "mode": "OFFLINE",
        "amount": 18000,
        "reference": "pay_abc123",
    });

    let first = post_json(
        build_test_app(pool.clone()),
        "/api/v1/facts/top-up-settled",
        &admin_token(),
        body.clone(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let data = &body_json(first).await["data"];
    assert_eq!(data["duplicate"], false);
    assert_eq!(data["wallet"]["offline_balance"], 18000);
    assert_eq!(data["wallet"]["online_balance"], 0);

    let again = post_json(
        build_test_app(pool),
        "/api/v1/facts/top-up-settled",
        &admin_token(),
        body,
    )
    .await;
    let data = &body_json(again).await["data"];
    assert_eq!(data["duplicate"], true);
    assert_eq!(data["wallet"]["offline_balance"], 18000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn top_up_for_unknown_student_returns_404(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/facts/top-up-settled",
        &admin_token(),
        serde_json::json!({"student_id": 4040, "mode": "ONLINE", "amount": 1000}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn top_up_requires_positive_amount(pool: PgPool) {
    onboard(&pool, 45, 0, 0, &[]).await;
    let response = post_json(
        build_test_app(pool),
        "/api/v1/facts/top-up-settled",
        &admin_token(),
        serde_json::json!({"student_id": 45, "mode": "ONLINE", "amount": 0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn facts_require_admin(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/facts/student-onboarded",
        &teacher_token(),
        onboarding_body(46, &[]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
