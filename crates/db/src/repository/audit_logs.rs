//! Audit log repository functions.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    DbError, DbPool,
    models::{AuditLogRow, EntityType, NewAuditLog},
};

/// Number of entries returned for an entity when no limit is given.
pub const DEFAULT_ENTITY_LIMIT: i64 = 3;

const AUDIT_COLUMNS: &str = "id, workspace_id, action, entity_type, entity_id, entity_title, \
                             user_id, user_name, user_image, created_at";

/// Record a mutation.  Missing user name and image are stored as empty text.
pub async fn create_audit_log(pool: &DbPool, entry: &NewAuditLog) -> Result<AuditLogRow, DbError> {
    let row = sqlx::query_as::<_, AuditLogRow>(&format!(
        r#"
        INSERT INTO audit_logs
            (id, workspace_id, action, entity_type, entity_id, entity_title,
             user_id, user_name, user_image, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {AUDIT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(entry.workspace_id)
    .bind(entry.action.to_string())
    .bind(entry.entity_type.to_string())
    .bind(entry.entity_id)
    .bind(&entry.entity_title)
    .bind(&entry.user_id)
    .bind(entry.user_name.as_deref().unwrap_or_default())
    .bind(entry.user_image.as_deref().unwrap_or_default())
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// The latest `limit` entries for one entity in a workspace, newest first.
pub async fn latest_for_entity(
    pool: &DbPool,
    workspace_id: Uuid,
    entity_id: Uuid,
    entity_type: EntityType,
    limit: i64,
) -> Result<Vec<AuditLogRow>, DbError> {
    let rows = sqlx::query_as::<_, AuditLogRow>(&format!(
        r#"
        SELECT {AUDIT_COLUMNS}
        FROM audit_logs
        WHERE workspace_id = ? AND entity_id = ? AND entity_type = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#
    ))
    .bind(workspace_id)
    .bind(entity_id)
    .bind(entity_type.to_string())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The latest `limit` entries across a workspace, newest first.
pub async fn latest_for_workspace(
    pool: &DbPool,
    workspace_id: Uuid,
    limit: i64,
) -> Result<Vec<AuditLogRow>, DbError> {
    let rows = sqlx::query_as::<_, AuditLogRow>(&format!(
        r#"
        SELECT {AUDIT_COLUMNS}
        FROM audit_logs
        WHERE workspace_id = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#
    ))
    .bind(workspace_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
