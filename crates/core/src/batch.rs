//! Batch modes, lifecycle statuses, and generated batch codes.
//!
//! A batch is either ONLINE or OFFLINE. The mode decides which wallet bucket
//! its sessions draw from and whether a physical location is required.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a batch name.
pub const MAX_BATCH_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Delivery mode of a batch, snapshotted onto each of its sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchMode {
    Online,
    Offline,
}

impl BatchMode {
    pub const ALL: [BatchMode; 2] = [BatchMode::Online, BatchMode::Offline];

    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
        }
    }

    /// Parse a mode, ignoring surrounding whitespace and case.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(Self::Online),
            "OFFLINE" => Ok(Self::Offline),
            _ => Err(format!(
                "Invalid batch mode '{value}'. Must be one of: ONLINE, OFFLINE"
            )),
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalise a batch location against its mode.
///
/// OFFLINE batches must name a non-blank location. ONLINE batches never
/// store one, so any supplied value is dropped.
pub fn normalize_location(mode: BatchMode, location: Option<&str>) -> Result<Option<String>, String> {
    match mode {
        BatchMode::Online => Ok(None),
        BatchMode::Offline => match location.map(str::trim) {
            Some(loc) if !loc.is_empty() => Ok(Some(loc.to_string())),
            _ => Err("OFFLINE batches require a location".to_string()),
        },
    }
}

/// Kind of venue hosting an OFFLINE batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueType {
    School,
    Society,
    Individual,
}

impl VenueType {
    /// One-letter database code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::School => "S",
            Self::Society => "C",
            Self::Individual => "I",
        }
    }

    /// Parse a venue type from its name or its one-letter code.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "s" | "school" => Ok(Self::School),
            "c" | "society" => Ok(Self::Society),
            "i" | "individual" => Ok(Self::Individual),
            _ => Err(format!(
                "Invalid venue type '{value}'. Must be one of: school, society, individual"
            )),
        }
    }
}

impl fmt::Display for VenueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a batch's venue type against its mode.
///
/// Required for OFFLINE, dropped for ONLINE.
pub fn normalize_venue_type(mode: BatchMode, value: Option<&str>) -> Result<Option<VenueType>, String> {
    match mode {
        BatchMode::Online => Ok(None),
        BatchMode::Offline => match value.map(str::trim) {
            Some(v) if !v.is_empty() => VenueType::parse(v).map(Some),
            _ => Err("OFFLINE batches require a venue type".to_string()),
        },
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Operator-controlled lifecycle of a batch.
///
/// Every batch starts as [`BatchStatus::Upcoming`]. Any status may be set to
/// any other status; nothing advances automatically with time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Upcoming,
    Live,
    Ended,
}

impl BatchStatus {
    /// Status assigned when a batch is created.
    pub const INITIAL: BatchStatus = BatchStatus::Upcoming;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "UPCOMING",
            Self::Live => "LIVE",
            Self::Ended => "ENDED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UPCOMING" => Ok(Self::Upcoming),
            "LIVE" => Ok(Self::Live),
            "ENDED" => Ok(Self::Ended),
            _ => Err(format!(
                "Invalid batch status '{value}'. Must be one of: UPCOMING, LIVE, ENDED"
            )),
        }
    }

    /// LIVE and UPCOMING batches are listed as active.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Upcoming | Self::Live)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an operator setting a batch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub from: BatchStatus,
    pub to: BatchStatus,
}

impl StatusChange {
    /// Transitions are unconstrained, including out of ENDED.
    pub fn new(from: BatchStatus, to: BatchStatus) -> Self {
        Self { from, to }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

// ---------------------------------------------------------------------------
// Generated batch codes
// ---------------------------------------------------------------------------

/// Two-letter code for a cohort name.
pub fn cohort_code(cohort: &str) -> Result<&'static str, String> {
    match cohort.trim().to_ascii_lowercase().as_str() {
        "spark" => Ok("SP"),
        "blaze" => Ok("BZ"),
        "ignite" => Ok("IG"),
        "inferno" => Ok("IN"),
        _ => Err(format!(
            "Invalid cohort '{cohort}'. Must be one of: spark, blaze, ignite, inferno"
        )),
    }
}

/// One-letter code for a level name.
pub fn level_code(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "alpha" => Ok("A"),
        "beta" => Ok("B"),
        "gamma" => Ok("C"),
        _ => Err(format!(
            "Invalid level '{level}'. Must be one of: alpha, beta, gamma"
        )),
    }
}

/// Counter key for generated names, e.g. `"SPA"` for spark/alpha.
pub fn batch_code_prefix(cohort: &str, level: &str) -> Result<String, String> {
    Ok(format!("{}{}", cohort_code(cohort)?, level_code(level)?))
}

/// Render a generated batch name: prefix followed by a 3-digit sequence.
///
/// ```
/// use classroll_core::batch::format_batch_code;
///
/// assert_eq!(format_batch_code("SPA", 7), "SPA007");
/// assert_eq!(format_batch_code("BZC", 1234), "BZC1234");
/// ```
pub fn format_batch_code(prefix: &str, sequence: i32) -> String {
    format!("{prefix}{sequence:03}")
}

/// Validate an operator-supplied batch name, returning it trimmed.
pub fn validate_batch_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Batch name must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_BATCH_NAME_LEN {
        return Err(format!(
            "Batch name must be at most {MAX_BATCH_NAME_LEN} characters"
        ));
    }
    Ok(trimmed.to_string())
}
