//! Repository for `attendance_records`, including the attendance ledger.

use sqlx::PgPool;
use classroll_core::batch::BatchMode;
use classroll_core::ledger::{plan_mark, AttendanceStatus, JournalKind, Tariff};
use classroll_core::types::DbId;

use super::decode_error;
use super::wallet_repo::{self, append_journal, balance_column, JournalEntry};
use crate::models::attendance::{
    AttendanceHistoryEntry, AttendanceRecord, MarkAttendance, MarkOutcome, RosterEntry, RosterRow,
};
use crate::models::wallet::CreditWallet;

const COLUMNS: &str = "id, student_id, session_id, status, marked_at, created_at, updated_at";

/// Provides attendance marking, rosters, and history.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Record attendance and settle the wallet in one transaction.
    ///
    /// The wallet row is locked before the previous record is read, so
    /// concurrent marks for the same student apply one after another and
    /// each sees the other's record. The session's mode decides which bucket
    /// moves; a deduction larger than the balance clamps the bucket to zero
    /// and still saves the record. A student without a wallet gets the
    /// record and a warning.
    ///
    /// Returns `None` if the session does not exist.
    pub async fn mark(
        pool: &PgPool,
        input: &MarkAttendance,
        tariff: &Tariff,
    ) -> Result<Option<MarkOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mode: Option<String> = sqlx::query_scalar("SELECT mode FROM batch_sessions WHERE id = $1")
            .bind(input.session_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mode) = mode else {
            return Ok(None);
        };
        let bucket = BatchMode::parse(&mode).map_err(decode_error)?;

        let query = format!(
            "SELECT {} FROM credit_wallets WHERE student_id = $1 FOR UPDATE",
            wallet_repo::COLUMNS
        );
        let wallet = sqlx::query_as::<_, CreditWallet>(&query)
            .bind(input.student_id)
            .fetch_optional(&mut *tx)
            .await?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT status FROM attendance_records
             WHERE student_id = $1 AND session_id = $2
             FOR UPDATE",
        )
        .bind(input.student_id)
        .bind(input.session_id)
        .fetch_optional(&mut *tx)
        .await?;
        let existing = existing
            .as_deref()
            .map(AttendanceStatus::parse)
            .transpose()
            .map_err(decode_error)?;

        let cost = tariff.cost_for(bucket);
        let plan = plan_mark(
            existing,
            input.status,
            bucket,
            cost,
            wallet.as_ref().map(|w| w.balances().get(bucket)),
        );

        let mut new_balance = wallet.as_ref().map(|w| w.balances().get(bucket));
        if let (Some(effect), Some(wallet), Some(kind)) =
            (plan.effect, wallet.as_ref(), JournalKind::for_action(plan.action))
        {
            let column = balance_column(bucket);
            let query = format!(
                "UPDATE credit_wallets SET {column} = $2, version = version + 1 WHERE id = $1"
            );
            sqlx::query(&query)
                .bind(wallet.id)
                .bind(effect.balance_after)
                .execute(&mut *tx)
                .await?;

            let entry = JournalEntry {
                wallet_id: wallet.id,
                bucket,
                kind,
                delta: effect.delta,
                balance_after: effect.balance_after,
                session_id: Some(input.session_id),
                reference: None,
                warning: plan.warning.as_deref(),
            };
            append_journal(&mut *tx, &entry).await?;
            new_balance = Some(effect.balance_after);
        }

        let query = format!(
            "INSERT INTO attendance_records (student_id, session_id, status, marked_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT ON CONSTRAINT uq_attendance_records_student_session DO UPDATE SET
                status = EXCLUDED.status,
                marked_at = EXCLUDED.marked_at
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(input.student_id)
            .bind(input.session_id)
            .bind(input.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(MarkOutcome {
            record,
            action: plan.action,
            bucket,
            cost,
            new_balance,
            clamped: plan.effect.is_some_and(|e| e.clamped),
            warning: plan.warning,
        }))
    }

    pub async fn find(
        pool: &PgPool,
        student_id: DbId,
        session_id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records WHERE student_id = $1 AND session_id = $2"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(student_id)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Every student enrolled in the session's batch, with their mark or
    /// `UNMARKED`.
    pub async fn roster_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<RosterEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RosterRow>(
            "SELECT s.id AS student_id, s.name, e.student_number, a.status, a.marked_at
             FROM batch_sessions bs
             JOIN batch_enrollments e ON e.batch_id = bs.batch_id
             JOIN students s ON s.id = e.student_id
             LEFT JOIN attendance_records a ON a.session_id = bs.id AND a.student_id = s.id
             WHERE bs.id = $1
             ORDER BY s.name, s.id",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(RosterEntry::from).collect())
    }

    /// A student's records across all batches, most recently marked first.
    pub async fn history_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<AttendanceHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceHistoryEntry>(
            "SELECT a.id, a.status, a.marked_at,
                    bs.id AS session_id, bs.session_number, bs.title AS session_title,
                    bs.date AS session_date, bs.mode AS session_mode,
                    b.id AS batch_id, b.name AS batch_name
             FROM attendance_records a
             JOIN batch_sessions bs ON bs.id = a.session_id
             JOIN batches b ON b.id = bs.batch_id
             WHERE a.student_id = $1
             ORDER BY a.marked_at DESC, a.id DESC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }
}
