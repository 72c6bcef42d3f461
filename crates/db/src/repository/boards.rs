//! Board CRUD operations and board-version bookkeeping.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{DbError, DbPool, models::BoardRow};

const BOARD_COLUMNS: &str = "id, workspace_id, title, version, created_at, updated_at";

/// Insert a new board at version 0.
///
/// Returns `DbError::NotFound` if the workspace does not exist.
pub async fn create_board(
    pool: &DbPool,
    workspace_id: Uuid,
    title: &str,
) -> Result<BoardRow, DbError> {
    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workspaces WHERE id = ?")
        .bind(workspace_id)
        .fetch_one(pool)
        .await?;
    if exists == 0 {
        return Err(DbError::not_found("workspace", workspace_id));
    }

    let now = Utc::now();
    let row = sqlx::query_as::<_, BoardRow>(&format!(
        r#"
        INSERT INTO boards (id, workspace_id, title, version, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        RETURNING {BOARD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(workspace_id)
    .bind(title)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single board by its primary key.
pub async fn get_board(pool: &DbPool, id: Uuid) -> Result<BoardRow, DbError> {
    sqlx::query_as::<_, BoardRow>(&format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::not_found("board", id))
}

/// Return a workspace's boards, newest first.
pub async fn list_boards(pool: &DbPool, workspace_id: Uuid) -> Result<Vec<BoardRow>, DbError> {
    let rows = sqlx::query_as::<_, BoardRow>(&format!(
        "SELECT {BOARD_COLUMNS} FROM boards WHERE workspace_id = ? ORDER BY created_at DESC, rowid DESC"
    ))
    .bind(workspace_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Rename a board.  Does not change its version.
pub async fn update_board_title(pool: &DbPool, id: Uuid, title: &str) -> Result<BoardRow, DbError> {
    sqlx::query_as::<_, BoardRow>(&format!(
        "UPDATE boards SET title = ?, updated_at = ? WHERE id = ? RETURNING {BOARD_COLUMNS}"
    ))
    .bind(title)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::not_found("board", id))
}

/// Permanently delete a board together with its lists and cards.
///
/// Returns the deleted row, or `DbError::NotFound` if nothing was deleted.
pub async fn delete_board(pool: &DbPool, id: Uuid) -> Result<BoardRow, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM cards WHERE list_id IN (SELECT id FROM lists WHERE board_id = ?)")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM lists WHERE board_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let row = sqlx::query_as::<_, BoardRow>(&format!(
        "DELETE FROM boards WHERE id = ? RETURNING {BOARD_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::not_found("board", id))?;

    tx.commit().await?;
    Ok(row)
}

/// The board that owns `list_id`.
pub async fn board_for_list(pool: &DbPool, list_id: Uuid) -> Result<BoardRow, DbError> {
    sqlx::query_as::<_, BoardRow>(
        r#"
        SELECT b.id, b.workspace_id, b.title, b.version, b.created_at, b.updated_at
        FROM boards b
        JOIN lists l ON l.board_id = b.id
        WHERE l.id = ?
        "#,
    )
    .bind(list_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::not_found("list", list_id))
}

/// The board that owns `card_id` through its list.
pub async fn board_for_card(pool: &DbPool, card_id: Uuid) -> Result<BoardRow, DbError> {
    sqlx::query_as::<_, BoardRow>(
        r#"
        SELECT b.id, b.workspace_id, b.title, b.version, b.created_at, b.updated_at
        FROM boards b
        JOIN lists l ON l.board_id = b.id
        JOIN cards c ON c.list_id = l.id
        WHERE c.id = ?
        "#,
    )
    .bind(card_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::not_found("card", card_id))
}

/// Current version of a board, read inside the caller's transaction.
pub async fn version(conn: &mut SqliteConnection, board_id: Uuid) -> Result<i64, DbError> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM boards WHERE id = ?")
        .bind(board_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(DbError::not_found("board", board_id))
}

/// Bump a board's version after a structural change (list or card created,
/// copied or deleted).  Returns the new version.
pub async fn touch(conn: &mut SqliteConnection, board_id: Uuid) -> Result<i64, DbError> {
    sqlx::query_scalar::<_, i64>(
        "UPDATE boards SET version = version + 1, updated_at = ? WHERE id = ? RETURNING version",
    )
    .bind(Utc::now())
    .bind(board_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(DbError::not_found("board", board_id))
}
