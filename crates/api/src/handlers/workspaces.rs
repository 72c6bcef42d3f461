use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::{models::WorkspaceRow, repository::workspaces as ws_repo};
use serde::Deserialize;
use uuid::Uuid;

use super::{JsonResult, non_blank};
use crate::{Actor, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

pub async fn create(
    State(state): State<AppState>,
    _actor: Actor,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<WorkspaceRow>), ApiError> {
    let name = non_blank(&payload.name, "Name")?;
    let workspace = ws_repo::create_workspace(&state.pool, name).await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

pub async fn get(Path(id): Path<Uuid>, State(state): State<AppState>) -> JsonResult<WorkspaceRow> {
    Ok(Json(ws_repo::get_workspace(&state.pool, id).await?))
}
