//! Student rows, written by the onboarding fact.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use classroll_core::types::{DbId, Timestamp};

/// A row from the `students` table. The id is issued by the onboarding
/// collaborator, not generated here.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub student_number: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert-or-refresh payload for a student.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertStudent {
    pub id: DbId,
    pub student_number: String,
    pub name: String,
    pub email: Option<String>,
}
