use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::{
    models::{AuditAction, EntityType},
    repository::{boards as board_repo, lists as list_repo},
};
use engine::List;
use uuid::Uuid;

use super::{JsonResult, TitleRequest, record};
use crate::{Actor, ApiError, AppState};

/// Append a list to the end of a board.
pub async fn create(
    Path(board_id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TitleRequest>,
) -> Result<(StatusCode, Json<List>), ApiError> {
    let title = payload.validated()?;
    let board = board_repo::get_board(&state.pool, board_id).await?;
    let list: List = list_repo::create_list(&state.pool, board_id, title, state.base).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Create, EntityType::List, list.id, &list.title),
    )
    .await;
    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn update(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TitleRequest>,
) -> JsonResult<List> {
    let title = payload.validated()?;
    let board = board_repo::board_for_list(&state.pool, id).await?;
    let list: List = list_repo::update_list_title(&state.pool, id, board.id, title).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Update, EntityType::List, list.id, &list.title),
    )
    .await;
    Ok(Json(list))
}

/// Delete a list and its cards.  Responds with the deleted list.
pub async fn delete(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
) -> JsonResult<List> {
    let board = board_repo::board_for_list(&state.pool, id).await?;
    let list: List = list_repo::delete_list(&state.pool, id, board.id).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Delete, EntityType::List, list.id, &list.title),
    )
    .await;
    Ok(Json(list))
}

/// Copy a list and its cards to the end of the board.
pub async fn copy(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
) -> Result<(StatusCode, Json<List>), ApiError> {
    let board = board_repo::board_for_list(&state.pool, id).await?;
    let list: List = list_repo::copy_list(&state.pool, id, board.id, state.base).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Create, EntityType::List, list.id, &list.title),
    )
    .await;
    Ok((StatusCode::CREATED, Json(list)))
}
