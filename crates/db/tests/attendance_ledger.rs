//! Integration tests for attendance marking and wallet settlement.
//!
//! Exercises `AttendanceRepo::mark` against a real database:
//! - Transition table (first mark, re-mark, flip in both directions)
//! - Bucket isolation between ONLINE and OFFLINE sessions
//! - Clamping to zero on insufficient balance
//! - Students without a wallet
//! - Journal lines and wallet versioning
//! - Concurrent marks on the same pair

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;
use classroll_core::batch::{BatchMode, VenueType};
use classroll_core::ledger::{AttendanceStatus, Balances, LedgerAction, Tariff, WARN_NO_WALLET};
use classroll_core::types::{Credits, DbId};
use classroll_db::models::attendance::{MarkAttendance, MarkOutcome};
use classroll_db::models::batch::{BatchName, NewBatch};
use classroll_db::models::session::CreateSession;
use classroll_db::models::student::UpsertStudent;
use classroll_db::repositories::{
    AttendanceRepo, BatchRepo, SessionRepo, StudentRepo, WalletRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const COST: Credits = 1000;

fn tariff() -> Tariff {
    Tariff::new(COST, COST).unwrap()
}

async fn seed_student(pool: &PgPool, id: DbId) {
    StudentRepo::upsert(
        pool,
        &UpsertStudent {
            id,
            student_number: format!("GZST{id:04}"),
            name: format!("Student {id}"),
            email: None,
        },
    )
    .await
    .unwrap();
}

async fn seed_wallet(pool: &PgPool, student_id: DbId, online: Credits, offline: Credits) {
    WalletRepo::open(pool, student_id, Balances { online, offline })
        .await
        .unwrap();
}

/// Create a batch of `mode` with one session, returning the session id.
async fn seed_session(pool: &PgPool, name: &str, mode: BatchMode) -> DbId {
    let batch = BatchRepo::create(
        pool,
        &NewBatch {
            name: BatchName::Given(name.to_string()),
            mode,
            start_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            location: (mode == BatchMode::Offline).then(|| "Hall 1".to_string()),
            city_code: None,
            venue_type: (mode == BatchMode::Offline).then_some(VenueType::Individual),
            level: None,
            description: String::new(),
        },
    )
    .await
    .unwrap();

    let session = SessionRepo::create(
        pool,
        batch.batch.id,
        mode,
        &CreateSession {
            session_number: 1,
            title: "Opening".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            start_time: "7:00 PM".to_string(),
            end_time: "8:00 PM".to_string(),
            connection_info: None,
            classroom_link: None,
        },
    )
    .await
    .unwrap();
    session.id
}

async fn mark(
    pool: &PgPool,
    student_id: DbId,
    session_id: DbId,
    status: AttendanceStatus,
) -> MarkOutcome {
    AttendanceRepo::mark(
        pool,
        &MarkAttendance {
            student_id,
            session_id,
            status,
        },
        &tariff(),
    )
    .await
    .unwrap()
    .expect("session exists")
}

async fn balances(pool: &PgPool, student_id: DbId) -> Balances {
    WalletRepo::find_by_student(pool, student_id)
        .await
        .unwrap()
        .expect("wallet exists")
        .balances()
}

// ---------------------------------------------------------------------------
// Test: transition table
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_present_deducts_session_bucket(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 3000).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    let outcome = mark(&pool, 1, session, AttendanceStatus::Present).await;

    assert_eq!(outcome.action, LedgerAction::Deduct);
    assert_eq!(outcome.bucket, BatchMode::Online);
    assert_eq!(outcome.new_balance, Some(4000));
    assert_eq!(outcome.warning, None);
    assert_eq!(outcome.record.status, "PRESENT");
    assert_eq!(balances(&pool, 1).await, Balances { online: 4000, offline: 3000 });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_absent_moves_nothing(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 0).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    let outcome = mark(&pool, 1, session, AttendanceStatus::Absent).await;

    assert_eq!(outcome.action, LedgerAction::None);
    assert_eq!(outcome.new_balance, Some(5000));
    assert_eq!(balances(&pool, 1).await.online, 5000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remark_same_status_is_idempotent(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 0).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    mark(&pool, 1, session, AttendanceStatus::Present).await;
    let again = mark(&pool, 1, session, AttendanceStatus::Present).await;

    assert_eq!(again.action, LedgerAction::None);
    assert_eq!(balances(&pool, 1).await.online, 4000);

    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_flip_sequence_conserves_credits(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 0).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    let steps = [
        (AttendanceStatus::Present, LedgerAction::Deduct, 4000),
        (AttendanceStatus::Present, LedgerAction::None, 4000),
        (AttendanceStatus::Absent, LedgerAction::Refund, 5000),
        (AttendanceStatus::Present, LedgerAction::Deduct, 4000),
    ];
    for (status, action, balance) in steps {
        let outcome = mark(&pool, 1, session, status).await;
        assert_eq!(outcome.action, action, "marking {status}");
        assert_eq!(outcome.new_balance, Some(balance), "marking {status}");
    }

    // One deduction net.
    assert_eq!(balances(&pool, 1).await.online, 5000 - COST);
}

// ---------------------------------------------------------------------------
// Test: bucket isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_offline_session_uses_offline_bucket(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 3000).await;
    let session = seed_session(&pool, "Saturday Hall", BatchMode::Offline).await;

    let outcome = mark(&pool, 1, session, AttendanceStatus::Present).await;

    assert_eq!(outcome.bucket, BatchMode::Offline);
    assert_eq!(balances(&pool, 1).await, Balances { online: 5000, offline: 2000 });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_mode_snapshot_survives_batch_change(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 3000).await;
    let session = seed_session(&pool, "Switcher", BatchMode::Online).await;

    sqlx::query("UPDATE batches SET mode = 'OFFLINE', location = 'Hall 3'")
        .execute(&pool)
        .await
        .unwrap();

    let outcome = mark(&pool, 1, session, AttendanceStatus::Present).await;
    assert_eq!(outcome.bucket, BatchMode::Online);
    assert_eq!(balances(&pool, 1).await, Balances { online: 4000, offline: 3000 });
}

// ---------------------------------------------------------------------------
// Test: soft conditions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_insufficient_balance_clamps_to_zero(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 500, 0).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    let outcome = mark(&pool, 1, session, AttendanceStatus::Present).await;

    assert_eq!(outcome.action, LedgerAction::Deduct);
    assert_eq!(outcome.new_balance, Some(0));
    assert!(outcome.clamped);
    assert_eq!(
        outcome.warning.as_deref(),
        Some("Insufficient ONLINE balance, reset to 0")
    );
    assert_eq!(outcome.record.status, "PRESENT");

    // The refund is the full tariff, not the amount actually taken.
    let refund = mark(&pool, 1, session, AttendanceStatus::Absent).await;
    assert_eq!(refund.action, LedgerAction::Refund);
    assert_eq!(refund.new_balance, Some(COST));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_wallet_saves_record_with_warning(pool: PgPool) {
    seed_student(&pool, 1).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    let outcome = mark(&pool, 1, session, AttendanceStatus::Present).await;

    assert_eq!(outcome.action, LedgerAction::Deduct);
    assert_eq!(outcome.new_balance, None);
    assert_eq!(outcome.warning.as_deref(), Some(WARN_NO_WALLET));

    let record = AttendanceRepo::find(&pool, 1, session).await.unwrap();
    assert_matches!(record, Some(r) if r.status == "PRESENT");
    assert!(WalletRepo::find_by_student(&pool, 1).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_session_returns_none(pool: PgPool) {
    seed_student(&pool, 1).await;

    let result = AttendanceRepo::mark(
        &pool,
        &MarkAttendance {
            student_id: 1,
            session_id: 9999,
            status: AttendanceStatus::Present,
        },
        &tariff(),
    )
    .await
    .unwrap();

    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Test: journal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_money_moves_are_journaled(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 0).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    mark(&pool, 1, session, AttendanceStatus::Present).await;
    mark(&pool, 1, session, AttendanceStatus::Present).await;
    mark(&pool, 1, session, AttendanceStatus::Absent).await;

    let wallet = WalletRepo::find_by_student(&pool, 1).await.unwrap().unwrap();
    // Onboarding credit, deduction, refund; the repeated mark writes nothing.
    assert_eq!(wallet.version, 2);

    let lines = WalletRepo::list_transactions(&pool, wallet.id, 10).await.unwrap();
    let kinds: Vec<&str> = lines.iter().map(|l| l.kind.as_str()).collect();
    assert_eq!(kinds, ["REFUND", "DEDUCT", "ONBOARDING_CREDIT"]);
    assert_eq!(lines[0].delta, COST);
    assert_eq!(lines[1].delta, -COST);
    assert_eq!(lines[0].session_id, Some(session));
    assert_eq!(lines[0].balance_after, 5000);
}

// ---------------------------------------------------------------------------
// Test: concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_first_marks_deduct_once(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 0).await;
    let session = seed_session(&pool, "Weekend Online", BatchMode::Online).await;

    let (a, b) = tokio::join!(
        mark(&pool, 1, session, AttendanceStatus::Present),
        mark(&pool, 1, session, AttendanceStatus::Present),
    );

    let deductions = [a.action, b.action]
        .iter()
        .filter(|action| **action == LedgerAction::Deduct)
        .count();
    assert_eq!(deductions, 1);
    assert_eq!(balances(&pool, 1).await.online, 4000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_marks_on_two_sessions_both_apply(pool: PgPool) {
    seed_student(&pool, 1).await;
    seed_wallet(&pool, 1, 5000, 0).await;
    let first = seed_session(&pool, "Weekend Online", BatchMode::Online).await;
    let second = seed_session(&pool, "Weekday Online", BatchMode::Online).await;

    tokio::join!(
        mark(&pool, 1, first, AttendanceStatus::Present),
        mark(&pool, 1, second, AttendanceStatus::Present),
    );

    assert_eq!(balances(&pool, 1).await.online, 5000 - 2 * COST);
}
