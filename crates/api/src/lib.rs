//! `api` crate: HTTP REST API layer.
//!
//! Exposes workspaces, boards, lists, cards and audit logs, plus the two
//! position endpoints driven by drag-and-drop:
//!   PUT /api/boards/{id}/lists/positions
//!   PUT /api/boards/{id}/cards/positions

use std::sync::Arc;

use axum::Router;
use db::{DbPool, SqlPositionStore};
use engine::{PositionBase, PositionStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod error;
pub mod handlers;
pub mod identity;

#[cfg(test)]
mod tests;

pub use error::ApiError;
pub use identity::Actor;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub store: Arc<dyn PositionStore>,
    /// Position given to the first list or card of an empty container.
    pub base: PositionBase,
}

impl AppState {
    /// State backed by the SQL position store on `pool`.
    pub fn new(pool: DbPool, base: PositionBase) -> Self {
        let store = Arc::new(SqlPositionStore::new(pool.clone()));
        Self { pool, store, base }
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub position_base: PositionBase,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            position_base: PositionBase::default(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    handlers::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: ServerConfig, pool: DbPool) -> std::io::Result<()> {
    let app = router(AppState::new(pool, config.position_base));

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("taskboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
