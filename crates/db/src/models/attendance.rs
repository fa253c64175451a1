//! Attendance records and the shapes returned around them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use classroll_core::batch::BatchMode;
use classroll_core::ledger::{AttendanceStatus, LedgerAction, RosterStatus};
use classroll_core::types::{Credits, DbId, Timestamp};

/// A row from the `attendance_records` table. At most one per
/// (student, session).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub student_id: DbId,
    pub session_id: DbId,
    pub status: String,
    pub marked_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for marking one student on one session.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendance {
    pub student_id: DbId,
    pub session_id: DbId,
    pub status: AttendanceStatus,
}

/// What a mark did to the record and the wallet.
#[derive(Debug, Clone, Serialize)]
pub struct MarkOutcome {
    pub record: AttendanceRecord,
    pub action: LedgerAction,
    pub bucket: BatchMode,
    pub cost: Credits,
    /// Balance of the affected bucket after the mark. `None` without a wallet.
    pub new_balance: Option<Credits>,
    /// Set when a deduction was clamped or the student has no wallet.
    pub warning: Option<String>,
    /// `true` when the deduction was larger than the balance.
    pub clamped: bool,
}

/// Raw roster row; `status` is null for unmarked students.
#[derive(Debug, Clone, FromRow)]
pub struct RosterRow {
    pub student_id: DbId,
    pub name: String,
    pub student_number: String,
    pub status: Option<String>,
    pub marked_at: Option<Timestamp>,
}

/// One enrolled student on a session roster.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_id: DbId,
    pub name: String,
    pub student_number: String,
    pub status: RosterStatus,
    pub marked_at: Option<Timestamp>,
}

impl From<RosterRow> for RosterEntry {
    fn from(row: RosterRow) -> Self {
        let status = row
            .status
            .as_deref()
            .and_then(|s| AttendanceStatus::parse(s).ok());
        Self {
            student_id: row.student_id,
            name: row.name,
            student_number: row.student_number,
            status: RosterStatus::from(status),
            marked_at: row.marked_at,
        }
    }
}

/// A student's attendance record with its session and batch.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceHistoryEntry {
    pub id: DbId,
    pub status: String,
    pub marked_at: Timestamp,
    pub session_id: DbId,
    pub session_number: i32,
    pub session_title: String,
    pub session_date: NaiveDate,
    pub session_mode: String,
    pub batch_id: DbId,
    pub batch_name: String,
}
