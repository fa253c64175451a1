//! Repository for the `batch_sessions` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use classroll_core::batch::BatchMode;
use classroll_core::types::DbId;

use crate::models::session::{BatchSession, CreateSession, UpdateSession};

const COLUMNS: &str = "id, batch_id, session_number, title, description, date, start_time, \
                       end_time, mode, connection_info, classroom_link, created_at, updated_at";

/// Provides CRUD and schedule lookups for batch sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a session, snapshotting `mode` from its batch.
    ///
    /// A missing description is stored as the empty string.
    pub async fn create(
        pool: &PgPool,
        batch_id: DbId,
        mode: BatchMode,
        input: &CreateSession,
    ) -> Result<BatchSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO batch_sessions
                (batch_id, session_number, title, description, date, start_time, end_time,
                 mode, connection_info, classroom_link)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BatchSession>(&query)
            .bind(batch_id)
            .bind(input.session_number)
            .bind(input.title.trim())
            .bind(input.description.as_deref().map(str::trim).unwrap_or(""))
            .bind(input.date)
            .bind(input.start_time.trim())
            .bind(input.end_time.trim())
            .bind(mode.as_str())
            .bind(&input.connection_info)
            .bind(&input.classroom_link)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BatchSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM batch_sessions WHERE id = $1");
        sqlx::query_as::<_, BatchSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn number_exists(
        pool: &PgPool,
        batch_id: DbId,
        session_number: i32,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM batch_sessions WHERE batch_id = $1 AND session_number = $2
             )",
        )
        .bind(batch_id)
        .bind(session_number)
        .fetch_one(pool)
        .await
    }

    /// All sessions of a batch in session-number order.
    pub async fn list_for_batch(
        pool: &PgPool,
        batch_id: DbId,
    ) -> Result<Vec<BatchSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM batch_sessions WHERE batch_id = $1 ORDER BY session_number"
        );
        sqlx::query_as::<_, BatchSession>(&query)
            .bind(batch_id)
            .fetch_all(pool)
            .await
    }

    /// The lowest-numbered session of a batch on `date`.
    pub async fn find_on_date(
        pool: &PgPool,
        batch_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<BatchSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM batch_sessions
             WHERE batch_id = $1 AND date = $2
             ORDER BY session_number
             LIMIT 1"
        );
        sqlx::query_as::<_, BatchSession>(&query)
            .bind(batch_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// The first session of a batch strictly after `date`.
    pub async fn find_next_after(
        pool: &PgPool,
        batch_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<BatchSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM batch_sessions
             WHERE batch_id = $1 AND date > $2
             ORDER BY date, session_number
             LIMIT 1"
        );
        sqlx::query_as::<_, BatchSession>(&query)
            .bind(batch_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// Update a session. Only present fields in `input` are applied; an
    /// explicit null `connection_info` clears it.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSession,
    ) -> Result<Option<BatchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE batch_sessions SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                date = COALESCE($4, date),
                start_time = COALESCE($5, start_time),
                end_time = COALESCE($6, end_time),
                connection_info = CASE WHEN $7 THEN $8 ELSE connection_info END,
                classroom_link = COALESCE($9, classroom_link)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BatchSession>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.date)
            .bind(input.start_time.as_deref().map(str::trim))
            .bind(input.end_time.as_deref().map(str::trim))
            .bind(input.connection_info.is_some())
            .bind(input.connection_info.clone().flatten())
            .bind(&input.classroom_link)
            .fetch_optional(pool)
            .await
    }
}
