//! Typed error type for the db crate.

use engine::EngineError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{entity} '{id}' not found")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Scope or version rejection raised by the shared batch checks.
    #[error(transparent)]
    Rejected(#[from] EngineError),
}

impl DbError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            DbError::Rejected(inner) => inner,
            other => EngineError::Persistence(other.to_string()),
        }
    }
}
