use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::{
    models::{AuditAction, EntityType},
    repository::{
        boards as board_repo,
        cards::{self as card_repo, CardChanges},
        lists as list_repo,
    },
};
use engine::{Card, List};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{JsonResult, TitleRequest, non_blank, record};
use crate::{Actor, ApiError, AppState};

/// A card together with the list it sits in.
#[derive(Debug, Serialize)]
pub struct CardWithList {
    #[serde(flatten)]
    pub card: Card,
    pub list: List,
}

/// Partial card update.  An empty `description` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Append a card to the end of a list.
pub async fn create(
    Path(list_id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let title = payload.validated()?;
    let board = board_repo::board_for_list(&state.pool, list_id).await?;
    let card: Card = card_repo::create_card(&state.pool, board.id, list_id, title, state.base)
        .await?
        .into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Create, EntityType::Card, card.id, &card.title),
    )
    .await;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get(Path(id): Path<Uuid>, State(state): State<AppState>) -> JsonResult<CardWithList> {
    let card: Card = card_repo::get_card(&state.pool, id).await?.into();
    let list: List = list_repo::get_list(&state.pool, card.list_id).await?.into();
    Ok(Json(CardWithList { card, list }))
}

pub async fn update(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<UpdateCardRequest>,
) -> JsonResult<Card> {
    if payload.title.is_none() && payload.description.is_none() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }
    let title = payload.title.as_deref().map(|t| non_blank(t, "Title")).transpose()?;

    let changes = CardChanges {
        title,
        description: payload
            .description
            .as_deref()
            .map(|d| Some(d.trim()).filter(|text| !text.is_empty())),
    };

    let board = board_repo::board_for_card(&state.pool, id).await?;
    let card: Card = card_repo::update_card(&state.pool, id, board.id, changes).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Update, EntityType::Card, card.id, &card.title),
    )
    .await;
    Ok(Json(card))
}

/// Delete a card.  Responds with the deleted card.
pub async fn delete(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
) -> JsonResult<Card> {
    let board = board_repo::board_for_card(&state.pool, id).await?;
    let card: Card = card_repo::delete_card(&state.pool, id, board.id).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Delete, EntityType::Card, card.id, &card.title),
    )
    .await;
    Ok(Json(card))
}

/// Copy a card to the end of its list.
pub async fn copy(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    actor: Actor,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let board = board_repo::board_for_card(&state.pool, id).await?;
    let card: Card = card_repo::copy_card(&state.pool, id, board.id, state.base).await?.into();

    record(
        &state,
        actor.audit(board.workspace_id, AuditAction::Create, EntityType::Card, card.id, &card.title),
    )
    .await;
    Ok((StatusCode::CREATED, Json(card)))
}
