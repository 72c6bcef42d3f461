//! Caller identity, supplied by the identity provider in front of the API.
//!
//! Identity is only used to attribute audit entries.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use db::models::{AuditAction, EntityType, NewAuditLog};
use uuid::Uuid;

use crate::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_IMAGE_HEADER: &str = "x-user-image";

/// The user making a mutating request.
///
/// Extraction fails with `401` when `x-user-id` is missing or blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
}

impl Actor {
    /// An audit entry attributed to this actor.
    pub fn audit(
        &self,
        workspace_id: Uuid,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: Uuid,
        entity_title: &str,
    ) -> NewAuditLog {
        NewAuditLog {
            workspace_id,
            action,
            entity_type,
            entity_id,
            entity_title: entity_title.to_string(),
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            user_image: self.user_image.clone(),
        }
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        Ok(Self {
            user_id,
            user_name: header(&parts.headers, USER_NAME_HEADER),
            user_image: header(&parts.headers, USER_IMAGE_HEADER),
        })
    }
}
