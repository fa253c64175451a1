//! Batch session model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use classroll_core::batch::BatchMode;
use classroll_core::types::{DbId, Timestamp};

/// A row from the `batch_sessions` table.
///
/// `mode` is copied from the batch when the session is created and does not
/// follow later changes to the batch.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BatchSession {
    pub id: DbId,
    pub batch_id: DbId,
    pub session_number: i32,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub mode: String,
    pub connection_info: Option<String>,
    pub classroom_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BatchSession {
    pub fn batch_mode(&self) -> Result<BatchMode, String> {
        BatchMode::parse(&self.mode)
    }
}

/// DTO for creating a session under a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSession {
    pub session_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub connection_info: Option<String>,
    /// Only accepted for ONLINE sessions.
    pub classroom_link: Option<String>,
}

/// DTO for updating a session. Absent fields are left unchanged.
///
/// `connection_info` distinguishes an absent field from an explicit `null`,
/// which clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSession {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub connection_info: Option<Option<String>>,
    pub classroom_link: Option<String>,
}

/// Wrap any present value, including `null`, in `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
