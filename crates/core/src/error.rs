use crate::types::DbId;

/// Domain error shared by every layer of the service.
///
/// Soft ledger conditions (missing wallet, clamped deduction) are *not*
/// represented here; they travel as warnings inside successful results.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<String> for CoreError {
    /// Pure validators in this crate report failures as plain strings.
    fn from(msg: String) -> Self {
        Self::Validation(msg)
    }
}
