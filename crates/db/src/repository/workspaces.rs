//! Workspace operations.

use chrono::Utc;
use uuid::Uuid;

use crate::{DbError, DbPool, models::WorkspaceRow};

/// Insert a new workspace.
pub async fn create_workspace(pool: &DbPool, name: &str) -> Result<WorkspaceRow, DbError> {
    let row = sqlx::query_as::<_, WorkspaceRow>(
        r#"
        INSERT INTO workspaces (id, name, created_at)
        VALUES (?, ?, ?)
        RETURNING id, name, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single workspace by its primary key.
pub async fn get_workspace(pool: &DbPool, id: Uuid) -> Result<WorkspaceRow, DbError> {
    sqlx::query_as::<_, WorkspaceRow>("SELECT id, name, created_at FROM workspaces WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::not_found("workspace", id))
}
