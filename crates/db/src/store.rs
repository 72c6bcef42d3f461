//! SQL-backed implementation of [`engine::PositionStore`].

use async_trait::async_trait;
use engine::{
    BoardSnapshot, CardPositionUpdate, EngineError, ListPositionUpdate, PositionBatch,
    PositionStore,
};
use uuid::Uuid;

use crate::{DbPool, repository::positions};

/// Position store backed by the shared connection pool.
#[derive(Debug, Clone)]
pub struct SqlPositionStore {
    pool: DbPool,
}

impl SqlPositionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl PositionStore for SqlPositionStore {
    async fn get_lists_with_cards(&self, board_id: Uuid) -> Result<BoardSnapshot, EngineError> {
        Ok(positions::get_lists_with_cards(&self.pool, board_id).await?)
    }

    async fn update_list_positions(
        &self,
        batch: &PositionBatch<ListPositionUpdate>,
    ) -> Result<i64, EngineError> {
        Ok(positions::apply_list_positions(&self.pool, batch).await?)
    }

    async fn update_card_positions(
        &self,
        batch: &PositionBatch<CardPositionUpdate>,
    ) -> Result<i64, EngineError> {
        Ok(positions::apply_card_positions(&self.pool, batch).await?)
    }
}

#[cfg(test)]
mod tests {
    use engine::{BoardView, DragEnd, PositionBase, SyncOutcome};

    use super::*;
    use crate::repository::{cards, fixtures::pool_with_board, lists};

    #[tokio::test]
    async fn board_view_round_trips_through_sql() {
        let (pool, _, board_id) = pool_with_board().await;
        let base = PositionBase::default();
        let todo = lists::create_list(&pool, board_id, "Todo", base).await.unwrap();
        let done = lists::create_list(&pool, board_id, "Done", base).await.unwrap();
        cards::create_card(&pool, board_id, todo.id, "Ship it", base).await.unwrap();

        let store = SqlPositionStore::new(pool);
        let snapshot = store.get_lists_with_cards(board_id).await.unwrap();
        let mut view = BoardView::from_snapshot(snapshot);

        let outcome = view
            .drop_item(&store, &DragEnd::card(todo.id, 0, done.id, 0))
            .await
            .unwrap();
        assert!(matches!(outcome, SyncOutcome::Committed { .. }));

        let server = store.get_lists_with_cards(board_id).await.unwrap();
        assert!(server.lists[0].cards.is_empty());
        assert_eq!(server.lists[1].cards[0].title, "Ship it");
        assert_eq!(server.board.version, view.version());
    }

    #[tokio::test]
    async fn stale_view_is_refreshed_from_sql() {
        let (pool, _, board_id) = pool_with_board().await;
        let base = PositionBase::default();
        lists::create_list(&pool, board_id, "A", base).await.unwrap();
        lists::create_list(&pool, board_id, "B", base).await.unwrap();

        let store = SqlPositionStore::new(pool.clone());
        let mut view = BoardView::from_snapshot(store.get_lists_with_cards(board_id).await.unwrap());

        // Another client adds a list after the view was loaded.
        lists::create_list(&pool, board_id, "C", base).await.unwrap();

        let outcome = view.drop_item(&store, &DragEnd::list(board_id, 0, 1)).await.unwrap();
        assert!(matches!(
            outcome,
            SyncOutcome::Refetched { error: EngineError::StaleVersion { .. } }
        ));
        assert_eq!(view.lists().len(), 3);
        assert_eq!(view.take_notices()[0].message, "Failed to update list position");
    }
}
