//! Batch enrollment model.

use serde::Serialize;
use sqlx::FromRow;
use classroll_core::types::{DbId, Timestamp};

/// A row from the `batch_enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BatchEnrollment {
    pub id: DbId,
    pub batch_id: DbId,
    pub student_id: DbId,
    /// Student number at the time of linking.
    pub student_number: String,
    pub joined_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An enrolled student as listed on a batch.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledStudent {
    pub student_id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub student_number: String,
    pub joined_at: Timestamp,
}
