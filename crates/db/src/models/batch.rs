//! Batch entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use classroll_core::batch::{BatchMode, BatchStatus, VenueType};
use classroll_core::types::{DbId, Timestamp};

/// A row from the `batches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Batch {
    pub id: DbId,
    pub name: String,
    pub mode: String,
    pub start_date: NaiveDate,
    pub location: Option<String>,
    pub city_code: Option<String>,
    /// `S`, `C`, or `I`; set only for OFFLINE batches.
    pub venue_type: Option<String>,
    pub level: Option<String>,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A batch joined with its one-to-one lifecycle status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BatchWithStatus {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub batch: Batch,
    pub status: String,
    pub status_updated_at: Timestamp,
}

/// DTO for creating a batch.
///
/// When `name` is omitted the batch is named from `cohort` and `level`,
/// e.g. `SPA001` for the first spark/alpha batch.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatch {
    pub name: Option<String>,
    pub cohort: Option<String>,
    pub level: Option<String>,
    pub mode: String,
    pub start_date: NaiveDate,
    pub location: Option<String>,
    pub city_code: Option<String>,
    #[serde(alias = "type")]
    pub venue_type: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating a batch. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBatch {
    pub mode: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub city_code: Option<String>,
    #[serde(alias = "type")]
    pub venue_type: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
}

/// DTO for setting a batch's lifecycle status.
#[derive(Debug, Clone, Deserialize)]
pub struct SetBatchStatus {
    pub status: String,
}

/// How a new batch gets its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchName {
    Given(String),
    /// Next value of the counter keyed by this prefix.
    Generated { prefix: String },
}

/// A validated batch ready to insert.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub name: BatchName,
    pub mode: BatchMode,
    pub start_date: NaiveDate,
    pub location: Option<String>,
    pub city_code: Option<String>,
    pub venue_type: Option<VenueType>,
    pub level: Option<String>,
    pub description: String,
}

/// The full set of mutable batch fields after merging an update.
#[derive(Debug, Clone)]
pub struct BatchEdit {
    pub mode: BatchMode,
    pub start_date: NaiveDate,
    pub location: Option<String>,
    pub city_code: Option<String>,
    pub venue_type: Option<VenueType>,
    pub level: Option<String>,
    pub description: String,
}

/// Result of a status write, including the status it replaced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStatusUpdate {
    pub batch_id: DbId,
    pub previous: BatchStatus,
    pub status: BatchStatus,
    pub updated_at: Timestamp,
}

/// A LIVE batch a student is enrolled in, with their PRESENT count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LiveBatchSummary {
    pub id: DbId,
    pub name: String,
    pub mode: String,
    pub start_date: NaiveDate,
    pub location: Option<String>,
    pub joined_at: Timestamp,
    pub attended: i64,
}
