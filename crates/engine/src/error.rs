//! Engine-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the ordering engine and the position store contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    // ------ Lookup errors ------

    /// A referenced board, list or card does not exist or does not belong to
    /// the expected parent.
    #[error("{entity} '{id}' not found")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },

    // ------ Validation errors ------

    /// Malformed move descriptor or update batch.
    #[error("validation error: {0}")]
    Validation(String),

    // ------ Persistence errors ------

    /// The batch was computed against an older version of the board.
    #[error("board '{board_id}' is at version {actual}, expected {expected}")]
    StaleVersion {
        board_id: Uuid,
        expected: i64,
        actual: i64,
    },

    /// The underlying storage write failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl EngineError {
    pub fn board_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "board", id }
    }

    pub fn list_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "list", id }
    }

    pub fn card_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "card", id }
    }
}
