//! Position batches: loading a board in order and persisting reorders.
//!
//! A batch is applied inside one transaction.  The board version is claimed
//! first with a conditional `UPDATE`, so a concurrent writer either sees the
//! bumped version or is rejected.  Any update that matches no row aborts the
//! transaction and nothing is written.

use std::collections::HashMap;

use chrono::Utc;
use engine::{
    BoardSnapshot, CardPositionUpdate, EngineError, ListPositionUpdate, ListWithCards,
    PositionBatch,
    store::{check_batch_scope, check_version},
};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::{
    DbError, DbPool,
    models::{BoardRow, CardRow, ListRow},
    repository::{boards, cards::ensure_list_in_board},
};

/// Load a board with its lists and cards, each ordered by position.
///
/// Rows sharing a position keep insertion order.
pub async fn get_lists_with_cards(pool: &DbPool, board_id: Uuid) -> Result<BoardSnapshot, DbError> {
    let mut tx = pool.begin().await?;

    let board = sqlx::query_as::<_, BoardRow>(
        "SELECT id, workspace_id, title, version, created_at, updated_at FROM boards WHERE id = ?",
    )
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::not_found("board", board_id))?;

    let lists = sqlx::query_as::<_, ListRow>(
        r#"
        SELECT id, board_id, title, position, created_at, updated_at
        FROM lists
        WHERE board_id = ?
        ORDER BY position ASC, rowid ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(&mut *tx)
    .await?;

    let cards = sqlx::query_as::<_, CardRow>(
        r#"
        SELECT c.id, c.list_id, c.title, c.description, c.position, c.created_at, c.updated_at
        FROM cards c
        JOIN lists l ON l.id = c.list_id
        WHERE l.board_id = ?
        ORDER BY c.position ASC, c.rowid ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    let mut by_list: HashMap<Uuid, Vec<engine::Card>> = HashMap::new();
    for card in cards {
        by_list.entry(card.list_id).or_default().push(card.into());
    }

    let lists = lists
        .into_iter()
        .map(|row| {
            let cards = by_list.remove(&row.id).unwrap_or_default();
            ListWithCards::new(row.into(), cards)
        })
        .collect();

    Ok(BoardSnapshot { board: board.into(), lists })
}

/// Persist a batch of list positions.  Returns the board's new version.
pub async fn apply_list_positions(
    pool: &DbPool,
    batch: &PositionBatch<ListPositionUpdate>,
) -> Result<i64, DbError> {
    check_batch_scope(batch, |u| u.board_id)?;
    if batch.updates.is_empty() {
        return current_version(pool, batch).await;
    }

    let mut tx = pool.begin().await?;
    let version = claim_version(&mut tx, batch).await?;

    let now = Utc::now();
    for update in &batch.updates {
        let result = sqlx::query(
            "UPDATE lists SET position = ?, updated_at = ? WHERE id = ? AND board_id = ?",
        )
        .bind(update.position)
        .bind(now)
        .bind(update.id)
        .bind(batch.board_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("list", update.id));
        }
    }

    tx.commit().await?;
    debug!(
        "board '{}': {} list positions committed at version {}",
        batch.board_id,
        batch.updates.len(),
        version
    );
    Ok(version)
}

/// Persist a batch of card positions and owning lists.  Returns the board's
/// new version.
///
/// Both the card and its target list must belong to the batch's board.
pub async fn apply_card_positions(
    pool: &DbPool,
    batch: &PositionBatch<CardPositionUpdate>,
) -> Result<i64, DbError> {
    check_batch_scope(batch, |u| u.board_id)?;
    if batch.updates.is_empty() {
        return current_version(pool, batch).await;
    }

    let mut tx = pool.begin().await?;
    let version = claim_version(&mut tx, batch).await?;

    let now = Utc::now();
    for update in &batch.updates {
        ensure_list_in_board(&mut tx, update.list_id, batch.board_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE cards SET position = ?, list_id = ?, updated_at = ?
            WHERE id = ? AND list_id IN (SELECT id FROM lists WHERE board_id = ?)
            "#,
        )
        .bind(update.position)
        .bind(update.list_id)
        .bind(now)
        .bind(update.id)
        .bind(batch.board_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("card", update.id));
        }
    }

    tx.commit().await?;
    debug!(
        "board '{}': {} card positions committed at version {}",
        batch.board_id,
        batch.updates.len(),
        version
    );
    Ok(version)
}

/// An empty batch writes nothing but still honours the version guard.
async fn current_version<U>(pool: &DbPool, batch: &PositionBatch<U>) -> Result<i64, DbError> {
    let mut conn = pool.acquire().await?;
    let current = boards::version(&mut conn, batch.board_id).await?;
    check_version(batch, current)?;
    Ok(current)
}

/// Bump the board version if it still matches the batch's expectation.
async fn claim_version<U>(
    conn: &mut SqliteConnection,
    batch: &PositionBatch<U>,
) -> Result<i64, DbError> {
    let claimed: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE boards SET version = version + 1, updated_at = ?
        WHERE id = ? AND (? IS NULL OR version = ?)
        RETURNING version
        "#,
    )
    .bind(Utc::now())
    .bind(batch.board_id)
    .bind(batch.expected_version)
    .bind(batch.expected_version)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(version) = claimed {
        return Ok(version);
    }

    let current = boards::version(conn, batch.board_id).await?;
    check_version(batch, current)?;
    Err(EngineError::StaleVersion {
        board_id: batch.board_id,
        expected: batch.expected_version.unwrap_or(current),
        actual: current,
    }
    .into())
}
