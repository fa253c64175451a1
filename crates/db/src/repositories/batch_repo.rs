//! Repository for `batches`, `batch_statuses`, and `batch_counters`.

use sqlx::PgPool;
use classroll_core::batch::{format_batch_code, BatchStatus, VenueType};
use classroll_core::types::{DbId, Timestamp};

use super::decode_error;
use crate::models::batch::{
    Batch, BatchEdit, BatchName, BatchStatusUpdate, BatchWithStatus, LiveBatchSummary, NewBatch,
};

const COLUMNS: &str = "id, name, mode, start_date, location, city_code, venue_type, level, \
                       description, created_at, updated_at";

/// Batch columns qualified with `b.` plus the joined status columns.
const JOINED_COLUMNS: &str = "b.id, b.name, b.mode, b.start_date, b.location, b.city_code, \
                              b.venue_type, b.level, b.description, b.created_at, b.updated_at, \
                              s.status, s.updated_at AS status_updated_at";

/// Provides batch CRUD and lifecycle operations.
pub struct BatchRepo;

impl BatchRepo {
    /// Insert a batch together with its initial UPCOMING status.
    ///
    /// Generated names take the next value of the per-prefix counter inside
    /// the same transaction, so two concurrent creates never share a code.
    pub async fn create(pool: &PgPool, input: &NewBatch) -> Result<BatchWithStatus, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let name = match &input.name {
            BatchName::Given(name) => name.clone(),
            BatchName::Generated { prefix } => {
                let sequence: i32 = sqlx::query_scalar(
                    "INSERT INTO batch_counters (key, count) VALUES ($1, 1)
                     ON CONFLICT (key) DO UPDATE SET count = batch_counters.count + 1
                     RETURNING count",
                )
                .bind(prefix)
                .fetch_one(&mut *tx)
                .await?;
                format_batch_code(prefix, sequence)
            }
        };

        let query = format!(
            "INSERT INTO batches
                (name, mode, start_date, location, city_code, venue_type, level, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let batch = sqlx::query_as::<_, Batch>(&query)
            .bind(&name)
            .bind(input.mode.as_str())
            .bind(input.start_date)
            .bind(&input.location)
            .bind(&input.city_code)
            .bind(input.venue_type.map(VenueType::as_str))
            .bind(&input.level)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        let (status, status_updated_at): (String, Timestamp) = sqlx::query_as(
            "INSERT INTO batch_statuses (batch_id, status) VALUES ($1, $2)
             RETURNING status, updated_at",
        )
        .bind(batch.id)
        .bind(BatchStatus::INITIAL.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BatchWithStatus {
            batch,
            status,
            status_updated_at,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BatchWithStatus>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM batches b
             JOIN batch_statuses s ON s.batch_id = b.id
             WHERE b.id = $1"
        );
        sqlx::query_as::<_, BatchWithStatus>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM batches WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List UPCOMING and LIVE batches, earliest start first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<BatchWithStatus>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM batches b
             JOIN batch_statuses s ON s.batch_id = b.id
             WHERE s.status IN ('UPCOMING', 'LIVE')
             ORDER BY b.start_date, b.id"
        );
        sqlx::query_as::<_, BatchWithStatus>(&query)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the mutable fields of a batch. The name is immutable.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &BatchEdit,
    ) -> Result<Option<Batch>, sqlx::Error> {
        let query = format!(
            "UPDATE batches SET
                mode = $2,
                start_date = $3,
                location = $4,
                city_code = $5,
                venue_type = $6,
                level = $7,
                description = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Batch>(&query)
            .bind(id)
            .bind(input.mode.as_str())
            .bind(input.start_date)
            .bind(&input.location)
            .bind(&input.city_code)
            .bind(input.venue_type.map(VenueType::as_str))
            .bind(&input.level)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Set a batch's status, returning the status it replaced.
    ///
    /// Any status may follow any other. Returns `None` if the batch does not
    /// exist.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: BatchStatus,
    ) -> Result<Option<BatchStatusUpdate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<String> =
            sqlx::query_scalar("SELECT status FROM batch_statuses WHERE batch_id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };
        let previous = BatchStatus::parse(&previous).map_err(decode_error)?;

        let updated_at: Timestamp = sqlx::query_scalar(
            "UPDATE batch_statuses SET status = $2 WHERE batch_id = $1 RETURNING updated_at",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(BatchStatusUpdate {
            batch_id: id,
            previous,
            status,
            updated_at,
        }))
    }

    /// LIVE batches the student is enrolled in, with how many of their
    /// sessions the student was marked PRESENT for.
    pub async fn list_live_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<LiveBatchSummary>, sqlx::Error> {
        sqlx::query_as::<_, LiveBatchSummary>(
            "SELECT b.id, b.name, b.mode, b.start_date, b.location, e.joined_at,
                    (SELECT COUNT(*)
                       FROM attendance_records a
                       JOIN batch_sessions bs ON bs.id = a.session_id
                      WHERE bs.batch_id = b.id
                        AND a.student_id = e.student_id
                        AND a.status = 'PRESENT') AS attended
             FROM batch_enrollments e
             JOIN batches b ON b.id = e.batch_id
             JOIN batch_statuses s ON s.batch_id = b.id
             WHERE e.student_id = $1 AND s.status = 'LIVE'
             ORDER BY b.start_date, b.id",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }
}
