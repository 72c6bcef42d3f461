//! Optimistic reconciliation between a client's board view and the store.
//!
//! `BoardView` is the client-side view-model:
//! 1. It holds a copy of the server's ordered lists and the board version.
//! 2. A drag is applied locally at once through [`reorder`] (zero-latency
//!    feedback) and yields a [`PendingReorder`].
//! 3. [`BoardView::submit`] sends the pending batch to a [`PositionStore`],
//!    guarded by the version the view was last synced at.
//! 4. On failure a notice is queued, then the authoritative board is
//!    refetched and replaces local state.  If the refetch fails too, the view
//!    rolls back to its pre-drag lists.  Nothing is retried.
//!
//! The view is never mutated from anywhere else: the only writers are
//! [`BoardView::apply_drag`], [`BoardView::submit`] and
//! [`BoardView::replace_from_server`].

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    EngineError,
    models::{
        Board, BoardSnapshot, CardPositionUpdate, DragEnd, ItemKind, ListPositionUpdate,
        ListWithCards, PositionBatch, PositionUpdates,
    },
    position::PositionBase,
    reorder::reorder,
    store::PositionStore,
};

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// A user-visible message (rendered as a toast by the UI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    fn error(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// Pending reorder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingUpdates {
    Lists(Vec<ListPositionUpdate>),
    Cards(Vec<CardPositionUpdate>),
}

/// An optimistic reorder that has been applied locally but not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReorder {
    updates: PendingUpdates,
    /// Lists as they were before the drag, for rollback.
    previous: Vec<ListWithCards>,
}

impl PendingReorder {
    pub fn kind(&self) -> ItemKind {
        match self.updates {
            PendingUpdates::Lists(_) => ItemKind::List,
            PendingUpdates::Cards(_) => ItemKind::Card,
        }
    }

    pub fn len(&self) -> usize {
        match &self.updates {
            PendingUpdates::Lists(u) => u.len(),
            PendingUpdates::Cards(u) => u.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What happened to a drag once it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The drag changed nothing; the store was not called.
    NoOp,
    /// The store committed the batch at this board version.
    Committed { version: i64 },
    /// The store rejected the batch; local state was replaced by a fresh
    /// snapshot.
    Refetched { error: EngineError },
    /// The store rejected the batch and the refetch failed; local state was
    /// restored to its pre-drag order.
    RolledBack { error: EngineError, refetch_error: EngineError },
}

// ---------------------------------------------------------------------------
// BoardView
// ---------------------------------------------------------------------------

/// Client-side copy of one board's ordered lists and cards.
#[derive(Debug, Clone)]
pub struct BoardView {
    board: Board,
    lists: Vec<ListWithCards>,
    base: PositionBase,
    notices: Vec<Notice>,
}

impl BoardView {
    /// Create a view from a server snapshot using the default position base.
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self::with_base(snapshot, PositionBase::default())
    }

    pub fn with_base(snapshot: BoardSnapshot, base: PositionBase) -> Self {
        Self {
            board: snapshot.board,
            lists: snapshot.lists,
            base,
            notices: Vec::new(),
        }
    }

    pub fn board_id(&self) -> Uuid {
        self.board.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Board version the view was last synced at.
    pub fn version(&self) -> i64 {
        self.board.version
    }

    pub fn lists(&self) -> &[ListWithCards] {
        &self.lists
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replace local state with authoritative data, discarding any
    /// un-reconciled optimistic changes.
    pub fn replace_from_server(&mut self, snapshot: BoardSnapshot) {
        if snapshot.board.id != self.board.id {
            warn!(
                "replacing view of board '{}' with snapshot of board '{}'",
                self.board.id, snapshot.board.id
            );
        }
        debug!("view of board '{}' reset to version {}", snapshot.board.id, snapshot.board.version);
        self.board = snapshot.board;
        self.lists = snapshot.lists;
    }

    /// Apply a drag locally.
    ///
    /// Returns `None` when the drag changes nothing, in which case no
    /// persistence call is needed.
    ///
    /// # Errors
    /// Propagates [`reorder`] errors; local state is left untouched.
    pub fn apply_drag(&mut self, drag: &DragEnd) -> Result<Option<PendingReorder>, EngineError> {
        let outcome = reorder(self.board.id, &self.lists, drag, self.base)?;

        let updates = match outcome.updates {
            PositionUpdates::None => return Ok(None),
            PositionUpdates::Lists(u) => PendingUpdates::Lists(u),
            PositionUpdates::Cards(u) => PendingUpdates::Cards(u),
        };

        let previous = std::mem::replace(&mut self.lists, outcome.lists);
        Ok(Some(PendingReorder { updates, previous }))
    }

    /// Persist a pending reorder and reconcile on failure.
    #[instrument(skip(self, store, pending), fields(board_id = %self.board.id, kind = %pending.kind()))]
    pub async fn submit<S>(&mut self, store: &S, pending: PendingReorder) -> SyncOutcome
    where
        S: PositionStore + ?Sized,
    {
        let board_id = self.board.id;
        let expected = Some(self.board.version);

        let result = match &pending.updates {
            PendingUpdates::Lists(updates) => {
                store
                    .update_list_positions(&PositionBatch::new(board_id, expected, updates.clone()))
                    .await
            }
            PendingUpdates::Cards(updates) => {
                store
                    .update_card_positions(&PositionBatch::new(board_id, expected, updates.clone()))
                    .await
            }
        };

        let error = match result {
            Ok(version) => {
                info!("{} position updates committed at version {}", pending.len(), version);
                self.board.version = version;
                return SyncOutcome::Committed { version };
            }
            Err(error) => error,
        };

        warn!("failed to persist {} positions: {}", pending.kind(), error);
        self.notices.push(Notice::error(format!("Failed to update {} position", pending.kind())));

        match store.get_lists_with_cards(board_id).await {
            Ok(snapshot) => {
                self.replace_from_server(snapshot);
                SyncOutcome::Refetched { error }
            }
            Err(refetch_error) => {
                warn!("refetch after failed reorder also failed: {}", refetch_error);
                self.lists = pending.previous;
                SyncOutcome::RolledBack { error, refetch_error }
            }
        }
    }

    /// Apply a drag locally and persist it.
    ///
    /// # Errors
    /// Returns the [`reorder`] error if the drag itself is invalid; store
    /// failures are reported through [`SyncOutcome`] instead.
    pub async fn drop_item<S>(&mut self, store: &S, drag: &DragEnd) -> Result<SyncOutcome, EngineError>
    where
        S: PositionStore + ?Sized,
    {
        match self.apply_drag(drag)? {
            Some(pending) => Ok(self.submit(store, pending).await),
            None => Ok(SyncOutcome::NoOp),
        }
    }
}
