//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models: they carry no domain behaviour.
//! Domain types live in the `engine` crate; the `From` impls below convert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// workspaces
// ---------------------------------------------------------------------------

/// A persisted workspace row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// boards
// ---------------------------------------------------------------------------

/// A persisted board row.
#[derive(Debug, Clone, FromRow)]
pub struct BoardRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BoardRow> for engine::Board {
    fn from(row: BoardRow) -> Self {
        Self {
            id: row.id,
            workspace_id: row.workspace_id,
            title: row.title,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// lists
// ---------------------------------------------------------------------------

/// A persisted list row.
#[derive(Debug, Clone, FromRow)]
pub struct ListRow {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ListRow> for engine::List {
    fn from(row: ListRow) -> Self {
        Self {
            id: row.id,
            board_id: row.board_id,
            title: row.title,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// cards
// ---------------------------------------------------------------------------

/// A persisted card row.
#[derive(Debug, Clone, FromRow)]
pub struct CardRow {
    pub id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CardRow> for engine::Card {
    fn from(row: CardRow) -> Self {
        Self {
            id: row.id,
            list_id: row.list_id,
            title: row.title,
            description: row.description,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// audit_logs
// ---------------------------------------------------------------------------

/// Mutation recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            other    => Err(format!("unknown audit action: {other}")),
        }
    }
}

/// Kind of entity an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Board,
    List,
    Card,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Board => write!(f, "BOARD"),
            Self::List  => write!(f, "LIST"),
            Self::Card  => write!(f, "CARD"),
        }
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOARD" => Ok(Self::Board),
            "LIST"  => Ok(Self::List),
            "CARD"  => Ok(Self::Card),
            other   => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// A persisted audit log row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub entity_title: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub created_at: DateTime<Utc>,
}

/// Values for a new audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub workspace_id: Uuid,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub entity_title: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
}
