use axum::{
    Json,
    extract::{Path, Query, State},
};
use db::{
    models::{AuditLogRow, EntityType},
    repository::audit_logs::{self, DEFAULT_ENTITY_LIMIT},
};
use serde::Deserialize;
use uuid::Uuid;

use super::JsonResult;
use crate::{ApiError, AppState};

/// Entries returned by the workspace activity feed when no limit is given.
const DEFAULT_ACTIVITY_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQuery {
    pub workspace_id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

/// Latest entries for one entity, newest first.
pub async fn for_entity(
    State(state): State<AppState>,
    Query(query): Query<EntityQuery>,
) -> JsonResult<Vec<AuditLogRow>> {
    let entity_type: EntityType = query.entity_type.parse().map_err(ApiError::BadRequest)?;
    let rows = audit_logs::latest_for_entity(
        &state.pool,
        query.workspace_id,
        query.entity_id,
        entity_type,
        clamp_limit(query.limit, DEFAULT_ENTITY_LIMIT),
    )
    .await?;
    Ok(Json(rows))
}

/// Latest entries across a workspace, newest first.
pub async fn activity(
    Path(workspace_id): Path<Uuid>,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> JsonResult<Vec<AuditLogRow>> {
    let rows = audit_logs::latest_for_workspace(
        &state.pool,
        workspace_id,
        clamp_limit(query.limit, DEFAULT_ACTIVITY_LIMIT),
    )
    .await?;
    Ok(Json(rows))
}
