//! Card repository functions.
//!
//! Every mutation is scoped to a board: a card is only touched when its list
//! belongs to the given `board_id`.  Transactions that bump the board version
//! do so first, so the write lock is taken before anything is read.

use chrono::Utc;
use engine::PositionBase;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{DbError, DbPool, models::CardRow, repository::boards};

const CARD_COLUMNS: &str = "id, list_id, title, description, position, created_at, updated_at";

/// Append a new card at the end of a list.
///
/// Returns `DbError::NotFound` for the list when it does not belong to
/// `board_id`.
pub async fn create_card(
    pool: &DbPool,
    board_id: Uuid,
    list_id: Uuid,
    title: &str,
    base: PositionBase,
) -> Result<CardRow, DbError> {
    let mut tx = pool.begin().await?;
    boards::touch(&mut tx, board_id).await?;
    ensure_list_in_board(&mut tx, list_id, board_id).await?;

    let position = next_position(&mut tx, list_id, base).await?;
    let row = insert_card(&mut tx, list_id, title, None, position).await?;

    tx.commit().await?;
    Ok(row)
}

/// Fetch a single card by its primary key.
pub async fn get_card(pool: &DbPool, id: Uuid) -> Result<CardRow, DbError> {
    sqlx::query_as::<_, CardRow>(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::not_found("card", id))
}

/// Cards of one list in position order.
pub async fn cards_for_list(pool: &DbPool, list_id: Uuid) -> Result<Vec<CardRow>, DbError> {
    let rows = sqlx::query_as::<_, CardRow>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE list_id = ? ORDER BY position ASC, rowid ASC"
    ))
    .bind(list_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Changes to apply to a card.  `None` leaves a field as it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct CardChanges<'a> {
    pub title: Option<&'a str>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<&'a str>>,
}

/// Apply title and description changes to a card on `board_id` in a single
/// statement.
pub async fn update_card(
    pool: &DbPool,
    id: Uuid,
    board_id: Uuid,
    changes: CardChanges<'_>,
) -> Result<CardRow, DbError> {
    sqlx::query_as::<_, CardRow>(&format!(
        r#"
        UPDATE cards
        SET title = COALESCE(?, title),
            description = CASE WHEN ? THEN ? ELSE description END,
            updated_at = ?
        WHERE id = ? AND list_id IN (SELECT id FROM lists WHERE board_id = ?)
        RETURNING {CARD_COLUMNS}
        "#
    ))
    .bind(changes.title)
    .bind(changes.description.is_some())
    .bind(changes.description.flatten())
    .bind(Utc::now())
    .bind(id)
    .bind(board_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::not_found("card", id))
}

/// Delete a card.  Sibling positions are not compacted.
pub async fn delete_card(pool: &DbPool, id: Uuid, board_id: Uuid) -> Result<CardRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, CardRow>(&format!(
        r#"
        DELETE FROM cards
        WHERE id = ? AND list_id IN (SELECT id FROM lists WHERE board_id = ?)
        RETURNING {CARD_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::not_found("card", id))?;
    boards::touch(&mut tx, board_id).await?;

    tx.commit().await?;
    Ok(row)
}

/// Copy a card to the end of its own list as `"<title> - Copy"`.
pub async fn copy_card(
    pool: &DbPool,
    id: Uuid,
    board_id: Uuid,
    base: PositionBase,
) -> Result<CardRow, DbError> {
    let mut tx = pool.begin().await?;
    boards::touch(&mut tx, board_id).await?;

    let source = sqlx::query_as::<_, CardRow>(&format!(
        r#"
        SELECT {CARD_COLUMNS} FROM cards
        WHERE id = ? AND list_id IN (SELECT id FROM lists WHERE board_id = ?)
        "#
    ))
    .bind(id)
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::not_found("card", id))?;

    let position = next_position(&mut tx, source.list_id, base).await?;
    let row = insert_card(
        &mut tx,
        source.list_id,
        &format!("{} - Copy", source.title),
        source.description.as_deref(),
        position,
    )
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Fail with `NotFound` for the list unless it belongs to `board_id`.
pub(crate) async fn ensure_list_in_board(
    conn: &mut SqliteConnection,
    list_id: Uuid,
    board_id: Uuid,
) -> Result<(), DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lists WHERE id = ? AND board_id = ?")
        .bind(list_id)
        .bind(board_id)
        .fetch_one(&mut *conn)
        .await?;
    if count == 0 {
        return Err(DbError::not_found("list", list_id));
    }
    Ok(())
}

async fn next_position(
    conn: &mut SqliteConnection,
    list_id: Uuid,
    base: PositionBase,
) -> Result<i32, DbError> {
    let max: Option<i32> = sqlx::query_scalar("SELECT MAX(position) FROM cards WHERE list_id = ?")
        .bind(list_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(base.next_after(max))
}

async fn insert_card(
    conn: &mut SqliteConnection,
    list_id: Uuid,
    title: &str,
    description: Option<&str>,
    position: i32,
) -> Result<CardRow, DbError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, CardRow>(&format!(
        r#"
        INSERT INTO cards (id, list_id, title, description, position, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {CARD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(list_id)
    .bind(title)
    .bind(description)
    .bind(position)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}
