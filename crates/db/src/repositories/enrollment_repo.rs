//! Repository for the `batch_enrollments` table.

use sqlx::PgPool;
use classroll_core::facts::{EnrollmentOutcome, TargetOutcome};
use classroll_core::types::DbId;

use super::BatchRepo;
use crate::models::enrollment::{BatchEnrollment, EnrolledStudent};

const COLUMNS: &str = "id, batch_id, student_id, student_number, joined_at, created_at, updated_at";

/// Provides student-batch membership operations.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Link a student to a batch. A duplicate pair violates
    /// `uq_batch_enrollments_batch_student`.
    pub async fn create(
        pool: &PgPool,
        batch_id: DbId,
        student_id: DbId,
        student_number: &str,
    ) -> Result<BatchEnrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO batch_enrollments (batch_id, student_id, student_number)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BatchEnrollment>(&query)
            .bind(batch_id)
            .bind(student_id)
            .bind(student_number)
            .fetch_one(pool)
            .await
    }

    /// Link a student to a batch if not already linked.
    ///
    /// Returns `true` when a new enrollment was created.
    pub async fn ensure(
        pool: &PgPool,
        batch_id: DbId,
        student_id: DbId,
        student_number: &str,
    ) -> Result<bool, sqlx::Error> {
        let inserted: Option<DbId> = sqlx::query_scalar(
            "INSERT INTO batch_enrollments (batch_id, student_id, student_number)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_batch_enrollments_batch_student DO NOTHING
             RETURNING id",
        )
        .bind(batch_id)
        .bind(student_id)
        .bind(student_number)
        .fetch_optional(pool)
        .await?;
        Ok(inserted.is_some())
    }

    pub async fn exists(pool: &PgPool, batch_id: DbId, student_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM batch_enrollments WHERE batch_id = $1 AND student_id = $2
             )",
        )
        .bind(batch_id)
        .bind(student_id)
        .fetch_one(pool)
        .await
    }

    /// Students enrolled in a batch, in joining order.
    pub async fn list_students(
        pool: &PgPool,
        batch_id: DbId,
    ) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledStudent>(
            "SELECT s.id AS student_id, s.name, s.email, e.student_number, e.joined_at
             FROM batch_enrollments e
             JOIN students s ON s.id = e.student_id
             WHERE e.batch_id = $1
             ORDER BY e.joined_at, e.id",
        )
        .bind(batch_id)
        .fetch_all(pool)
        .await
    }

    /// Enroll a student in each target batch, independently.
    ///
    /// A failing target is reported in its outcome and never stops the
    /// others. Replaying the same targets yields `ALREADY_ENROLLED`.
    pub async fn enroll_targets(
        pool: &PgPool,
        student_id: DbId,
        student_number: &str,
        targets: &[DbId],
    ) -> Vec<TargetOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for &batch_id in targets {
            let outcome = match Self::enroll_one(pool, batch_id, student_id, student_number).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(batch_id, student_id, error = %e, "Enrollment target failed");
                    EnrollmentOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(TargetOutcome { batch_id, outcome });
        }
        outcomes
    }

    async fn enroll_one(
        pool: &PgPool,
        batch_id: DbId,
        student_id: DbId,
        student_number: &str,
    ) -> Result<EnrollmentOutcome, sqlx::Error> {
        if !BatchRepo::exists(pool, batch_id).await? {
            return Ok(EnrollmentOutcome::Failed {
                reason: format!("Batch {batch_id} not found"),
            });
        }
        let created = Self::ensure(pool, batch_id, student_id, student_number).await?;
        Ok(if created {
            EnrollmentOutcome::Enrolled
        } else {
            EnrollmentOutcome::AlreadyEnrolled
        })
    }
}
