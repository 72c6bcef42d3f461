//! Board loading and the two drag-and-drop persistence entry points.
//!
//! Positions in the request are written verbatim.  The batch's board comes
//! from the path; any update naming a different board is rejected.

use axum::{
    Json,
    extract::{Path, State},
};
use engine::{BoardSnapshot, CardPositionUpdate, ListPositionUpdate, PositionBatch};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::JsonResult;
use crate::{Actor, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsRequest<U> {
    #[serde(default)]
    pub expected_version: Option<i64>,
    pub updates: Vec<U>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionsResponse {
    pub success: bool,
    pub version: i64,
}

/// The board with its lists and cards in position order.
pub async fn lists_with_cards(
    Path(board_id): Path<Uuid>,
    State(state): State<AppState>,
) -> JsonResult<BoardSnapshot> {
    Ok(Json(state.store.get_lists_with_cards(board_id).await?))
}

#[instrument(skip(state, actor, payload), fields(user = %actor.user_id, updates = payload.updates.len()))]
pub async fn update_lists(
    Path(board_id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<PositionsRequest<ListPositionUpdate>>,
) -> JsonResult<PositionsResponse> {
    let batch = PositionBatch::new(board_id, payload.expected_version, payload.updates);
    let version = state.store.update_list_positions(&batch).await?;

    info!("board '{}' list order saved at version {}", board_id, version);
    Ok(Json(PositionsResponse { success: true, version }))
}

#[instrument(skip(state, actor, payload), fields(user = %actor.user_id, updates = payload.updates.len()))]
pub async fn update_cards(
    Path(board_id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<PositionsRequest<CardPositionUpdate>>,
) -> JsonResult<PositionsResponse> {
    let batch = PositionBatch::new(board_id, payload.expected_version, payload.updates);
    let version = state.store.update_card_positions(&batch).await?;

    info!("board '{}' card order saved at version {}", board_id, version);
    Ok(Json(PositionsResponse { success: true, version }))
}
