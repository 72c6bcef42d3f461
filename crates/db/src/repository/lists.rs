//! List repository functions.
//!
//! Creating, copying and deleting a list changes the board's structure and
//! bumps its version inside the same transaction.  Renaming does not.  The
//! bump is the first statement wherever the transaction also reads, so the
//! write lock is held before the reads.

use chrono::Utc;
use engine::PositionBase;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
    DbError, DbPool,
    models::{CardRow, ListRow},
    repository::boards,
};

const LIST_COLUMNS: &str = "id, board_id, title, position, created_at, updated_at";

/// Append a new list at the end of a board.
///
/// The list is placed one past the current maximum position, or at `base`
/// when the board has no lists.
pub async fn create_list(
    pool: &DbPool,
    board_id: Uuid,
    title: &str,
    base: PositionBase,
) -> Result<ListRow, DbError> {
    let mut tx = pool.begin().await?;
    boards::touch(&mut tx, board_id).await?;

    let position = next_position(&mut tx, board_id, base).await?;
    let row = insert_list(&mut tx, board_id, title, position).await?;

    tx.commit().await?;
    Ok(row)
}

/// Fetch a single list by its primary key.
pub async fn get_list(pool: &DbPool, id: Uuid) -> Result<ListRow, DbError> {
    sqlx::query_as::<_, ListRow>(&format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::not_found("list", id))
}

/// Lists of a board in position order.
pub async fn lists_for_board(pool: &DbPool, board_id: Uuid) -> Result<Vec<ListRow>, DbError> {
    let rows = sqlx::query_as::<_, ListRow>(&format!(
        "SELECT {LIST_COLUMNS} FROM lists WHERE board_id = ? ORDER BY position ASC, rowid ASC"
    ))
    .bind(board_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Rename a list belonging to `board_id`.
pub async fn update_list_title(
    pool: &DbPool,
    id: Uuid,
    board_id: Uuid,
    title: &str,
) -> Result<ListRow, DbError> {
    sqlx::query_as::<_, ListRow>(&format!(
        "UPDATE lists SET title = ?, updated_at = ? WHERE id = ? AND board_id = ? RETURNING {LIST_COLUMNS}"
    ))
    .bind(title)
    .bind(Utc::now())
    .bind(id)
    .bind(board_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::not_found("list", id))
}

/// Delete a list and all of its cards.
///
/// Sibling positions are left as they are; the gap closes the next time the
/// board is reordered.
pub async fn delete_list(pool: &DbPool, id: Uuid, board_id: Uuid) -> Result<ListRow, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM cards WHERE list_id IN (SELECT id FROM lists WHERE id = ? AND board_id = ?)")
        .bind(id)
        .bind(board_id)
        .execute(&mut *tx)
        .await?;
    let row = sqlx::query_as::<_, ListRow>(&format!(
        "DELETE FROM lists WHERE id = ? AND board_id = ? RETURNING {LIST_COLUMNS}"
    ))
    .bind(id)
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::not_found("list", id))?;
    boards::touch(&mut tx, board_id).await?;

    tx.commit().await?;
    Ok(row)
}

/// Copy a list, with all its cards, to the end of its board.
///
/// The copy is titled `"<title> - Copy"`.  Cards keep their titles,
/// descriptions and relative positions but get fresh ids.
pub async fn copy_list(
    pool: &DbPool,
    id: Uuid,
    board_id: Uuid,
    base: PositionBase,
) -> Result<ListRow, DbError> {
    let mut tx = pool.begin().await?;
    boards::touch(&mut tx, board_id).await?;

    let source = sqlx::query_as::<_, ListRow>(&format!(
        "SELECT {LIST_COLUMNS} FROM lists WHERE id = ? AND board_id = ?"
    ))
    .bind(id)
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::not_found("list", id))?;

    let cards = sqlx::query_as::<_, CardRow>(
        r#"
        SELECT id, list_id, title, description, position, created_at, updated_at
        FROM cards
        WHERE list_id = ?
        ORDER BY position ASC, rowid ASC
        "#,
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    let position = next_position(&mut tx, board_id, base).await?;
    let copy = insert_list(&mut tx, board_id, &format!("{} - Copy", source.title), position).await?;

    let now = Utc::now();
    for card in &cards {
        sqlx::query(
            r#"
            INSERT INTO cards (id, list_id, title, description, position, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(copy.id)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.position)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(copy)
}

async fn next_position(
    conn: &mut SqliteConnection,
    board_id: Uuid,
    base: PositionBase,
) -> Result<i32, DbError> {
    let max: Option<i32> = sqlx::query_scalar("SELECT MAX(position) FROM lists WHERE board_id = ?")
        .bind(board_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(base.next_after(max))
}

async fn insert_list(
    conn: &mut SqliteConnection,
    board_id: Uuid,
    title: &str,
    position: i32,
) -> Result<ListRow, DbError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, ListRow>(&format!(
        r#"
        INSERT INTO lists (id, board_id, title, position, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {LIST_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(board_id)
    .bind(title)
    .bind(position)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}
