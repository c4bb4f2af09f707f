//! Store error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A persisted row failed to decode into its domain type. Indicates
    /// hand-edited data or a schema mismatch, not a caller mistake.
    #[error("Corrupt row in {entity}: {detail}")]
    Corrupt { entity: &'static str, detail: String },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn corrupt(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            entity,
            detail: detail.into(),
        }
    }
}
