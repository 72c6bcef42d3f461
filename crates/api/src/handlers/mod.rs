//! Route table and shared handler helpers.

use axum::{
    Json, Router,
    routing::{get, patch, post, put},
};
use db::{models::NewAuditLog, repository::audit_logs};
use serde::Deserialize;
use tracing::warn;

use crate::{ApiError, AppState};

pub mod audit;
pub mod boards;
pub mod cards;
pub mod lists;
pub mod positions;
pub mod workspaces;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/workspaces", post(workspaces::create))
        .route("/api/workspaces/:id", get(workspaces::get))
        .route(
            "/api/workspaces/:id/boards",
            get(boards::list).post(boards::create),
        )
        .route("/api/workspaces/:id/activity", get(audit::activity))
        .route(
            "/api/boards/:id",
            get(boards::get).patch(boards::update).delete(boards::delete),
        )
        .route(
            "/api/boards/:id/lists",
            get(positions::lists_with_cards).post(lists::create),
        )
        .route("/api/boards/:id/lists/positions", put(positions::update_lists))
        .route("/api/boards/:id/cards/positions", put(positions::update_cards))
        .route("/api/lists/:id", patch(lists::update).delete(lists::delete))
        .route("/api/lists/:id/copy", post(lists::copy))
        .route("/api/lists/:id/cards", post(cards::create))
        .route(
            "/api/cards/:id",
            get(cards::get).patch(cards::update).delete(cards::delete),
        )
        .route("/api/cards/:id/copy", post(cards::copy))
        .route("/api/audit-logs", get(audit::for_entity))
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}

/// Body for create and rename requests.
#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

impl TitleRequest {
    /// The trimmed title, rejected when blank.
    pub fn validated(&self) -> Result<&str, ApiError> {
        non_blank(&self.title, "Title")
    }
}

pub(crate) fn non_blank<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Write an audit entry.  Failures are logged and never fail the request.
pub(crate) async fn record(state: &AppState, entry: NewAuditLog) {
    if let Err(err) = audit_logs::create_audit_log(&state.pool, &entry).await {
        warn!(
            "failed to record {} {} for '{}': {}",
            entry.action, entry.entity_type, entry.entity_id, err
        );
    }
}

pub(crate) type JsonResult<T> = Result<Json<T>, ApiError>;
