//! Repository for the `students` table.

use sqlx::PgPool;
use classroll_core::types::DbId;

use crate::models::student::{Student, UpsertStudent};

const COLUMNS: &str = "id, student_number, name, email, created_at, updated_at";

/// Provides access to students created by onboarding.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a student or refresh its number, name, and email.
    pub async fn upsert(pool: &PgPool, input: &UpsertStudent) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (id, student_number, name, email)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                student_number = EXCLUDED.student_number,
                name = EXCLUDED.name,
                email = EXCLUDED.email
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(input.id)
            .bind(&input.student_number)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
