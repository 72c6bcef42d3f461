//! Core domain models for the board engine.
//!
//! These types are the in-memory source of truth for a board view.  They are
//! serialised in camelCase so the HTTP layer and the CLI can exchange them
//! without a separate DTO layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A Kanban board, owned by a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    /// Monotonic counter bumped by every committed change to the board's
    /// lists or cards.  Used to reject reorders computed from stale state.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Convenience constructor for testing.
    pub fn new(workspace_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            title: title.into(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// An ordered column of cards within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    pub fn new(board_id: Uuid, title: impl Into<String>, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            title: title.into(),
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single task item within a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(list_id: Uuid, title: impl Into<String>, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            list_id,
            title: title.into(),
            description: None,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// A list together with its cards, ordered ascending by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
}

impl ListWithCards {
    pub fn new(list: List, cards: Vec<Card>) -> Self {
        Self { list, cards }
    }

    pub fn id(&self) -> Uuid {
        self.list.id
    }
}

/// A board and its full list+card tree, as served by the position store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Board,
    pub lists: Vec<ListWithCards>,
}

impl BoardSnapshot {
    /// Total number of cards across every list.
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Drag-and-drop payload
// ---------------------------------------------------------------------------

/// What kind of item a drag moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    List,
    Card,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Card => write!(f, "card"),
        }
    }
}

/// One end of a drag: a container (board for lists, list for cards) and an
/// index into that container's ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropLocation {
    pub container_id: Uuid,
    pub index: usize,
}

/// The drag-end event emitted by the UI layer.
///
/// `destination` is `None` when the drag was cancelled (dropped outside any
/// container).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnd {
    pub kind: ItemKind,
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

impl DragEnd {
    /// A list drag within `board_id`.
    pub fn list(board_id: Uuid, from: usize, to: usize) -> Self {
        Self {
            kind: ItemKind::List,
            source: DropLocation { container_id: board_id, index: from },
            destination: Some(DropLocation { container_id: board_id, index: to }),
        }
    }

    /// A card drag from `from_list[from]` to `to_list[to]`.
    pub fn card(from_list: Uuid, from: usize, to_list: Uuid, to: usize) -> Self {
        Self {
            kind: ItemKind::Card,
            source: DropLocation { container_id: from_list, index: from },
            destination: Some(DropLocation { container_id: to_list, index: to }),
        }
    }

    /// A drag that ended outside every container.
    pub fn cancelled(kind: ItemKind, source: DropLocation) -> Self {
        Self { kind, source, destination: None }
    }
}

// ---------------------------------------------------------------------------
// Position updates
// ---------------------------------------------------------------------------

/// New position for a list, scoped to its board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPositionUpdate {
    pub id: Uuid,
    pub position: i32,
    pub board_id: Uuid,
}

/// New position and owning list for a card, scoped to its board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPositionUpdate {
    pub id: Uuid,
    pub position: i32,
    pub list_id: Uuid,
    pub board_id: Uuid,
}

/// The persistence requests produced by one reorder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "updates", rename_all = "lowercase")]
pub enum PositionUpdates {
    /// Nothing changed; no persistence call is needed.
    #[default]
    None,
    Lists(Vec<ListPositionUpdate>),
    Cards(Vec<CardPositionUpdate>),
}

impl PositionUpdates {
    pub fn lists(updates: Vec<ListPositionUpdate>) -> Self {
        if updates.is_empty() { Self::None } else { Self::Lists(updates) }
    }

    pub fn cards(updates: Vec<CardPositionUpdate>) -> Self {
        if updates.is_empty() { Self::None } else { Self::Cards(updates) }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Lists(u) => u.len(),
            Self::Cards(u) => u.len(),
        }
    }
}

/// A batch of updates submitted to the position store in one call.
///
/// `expected_version`, when present, must match the board's current version
/// or the whole batch is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionBatch<U> {
    pub board_id: Uuid,
    #[serde(default)]
    pub expected_version: Option<i64>,
    pub updates: Vec<U>,
}

impl<U> PositionBatch<U> {
    pub fn new(board_id: Uuid, expected_version: Option<i64>, updates: Vec<U>) -> Self {
        Self { board_id, expected_version, updates }
    }
}
