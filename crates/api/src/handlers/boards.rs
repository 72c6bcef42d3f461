use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::{
    models::{AuditAction, EntityType},
    repository::{boards as board_repo, workspaces as ws_repo},
};
use engine::Board;
use uuid::Uuid;

use super::{JsonResult, TitleRequest, record};
use crate::{Actor, ApiError, AppState};

/// Boards of a workspace, newest first.
pub async fn list(Path(workspace_id): Path<Uuid>, State(state): State<AppState>) -> JsonResult<Vec<Board>> {
    ws_repo::get_workspace(&state.pool, workspace_id).await?;
    let boards = board_repo::list_boards(&state.pool, workspace_id).await?;
    Ok(Json(boards.into_iter().map(Board::from).collect()))
}

pub async fn create(
    Path(workspace_id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let title = payload.validated()?;
    let board: Board = board_repo::create_board(&state.pool, workspace_id, title).await?.into();

    record(
        &state,
        actor.audit(workspace_id, AuditAction::Create, EntityType::Board, board.id, &board.title),
    )
    .await;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get(Path(id): Path<Uuid>, State(state): State<AppState>) -> JsonResult<Board> {
    Ok(Json(board_repo::get_board(&state.pool, id).await?.into()))
}

pub async fn update(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TitleRequest>,
) -> JsonResult<Board> {
    let title = payload.validated()?;
    let board: Board = board_repo::update_board_title(&state.pool, id, title).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Update, EntityType::Board, board.id, &board.title),
    )
    .await;
    Ok(Json(board))
}

/// Delete a board with its lists and cards.  Responds with the deleted board.
pub async fn delete(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
) -> JsonResult<Board> {
    let board: Board = board_repo::delete_board(&state.pool, id).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Delete, EntityType::Board, board.id, &board.title),
    )
    .await;
    Ok(Json(board))
}
