//! The `PositionStore` trait: the persistence contract behind every reorder.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    EngineError,
    models::{BoardSnapshot, CardPositionUpdate, ListPositionUpdate, PositionBatch},
};

/// Durable storage for list and card order.
///
/// Implementations must apply each batch atomically: either every update in
/// the batch is committed and the board version is bumped, or nothing is.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// The board with its lists and cards, each sorted ascending by position.
    async fn get_lists_with_cards(&self, board_id: Uuid) -> Result<BoardSnapshot, EngineError>;

    /// Persist new list positions.  Returns the board's new version.
    async fn update_list_positions(
        &self,
        batch: &PositionBatch<ListPositionUpdate>,
    ) -> Result<i64, EngineError>;

    /// Persist new card positions and owning lists.  Returns the board's new
    /// version.
    async fn update_card_positions(
        &self,
        batch: &PositionBatch<CardPositionUpdate>,
    ) -> Result<i64, EngineError>;
}

/// Rejects updates scoped to a board other than the batch's.
pub fn check_batch_scope<U>(
    batch: &PositionBatch<U>,
    scope_of: impl Fn(&U) -> Uuid,
) -> Result<(), EngineError> {
    match batch.updates.iter().map(scope_of).find(|id| *id != batch.board_id) {
        Some(other) => Err(EngineError::Validation(format!(
            "update scoped to board '{other}' submitted in a batch for board '{}'",
            batch.board_id
        ))),
        None => Ok(()),
    }
}

/// Compares a batch's expected version against the board's current one.
pub fn check_version<U>(batch: &PositionBatch<U>, current: i64) -> Result<(), EngineError> {
    match batch.expected_version {
        Some(expected) if expected != current => Err(EngineError::StaleVersion {
            board_id: batch.board_id,
            expected,
            actual: current,
        }),
        _ => Ok(()),
    }
}
