//! Configuration and payload error types

use crate::model::RowId;

/// Errors raised while decoding a widget payload or loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The payload was not valid JSON or did not match the expected shape.
    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The dataset has no columns once the sentinel column is removed.
    #[error("dataset has no columns")]
    NoColumns,

    /// Two rows carry the same persistent identity.
    #[error("duplicate row identity {id} at row {position}")]
    DuplicateIdentity {
        /// The repeated identity.
        id: RowId,
        /// Load position of the second occurrence.
        position: usize,
    },
}

impl ConfigError {
    /// Creates a duplicate identity error.
    pub fn duplicate_identity(id: RowId, position: usize) -> Self {
        Self::DuplicateIdentity { id, position }
    }
}
