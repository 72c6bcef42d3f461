//! `MemoryStore`: an in-process `PositionStore`.
//!
//! Applies batches with the same all-or-nothing and version semantics as the
//! SQL store, records every call it receives, and can be told to fail.  Used
//! by the reconciliation tests and anywhere a database is irrelevant.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    EngineError,
    models::{BoardSnapshot, CardPositionUpdate, ListPositionUpdate, PositionBatch},
    store::{PositionStore, check_batch_scope, check_version},
};

/// One call observed by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Fetch(Uuid),
    ListPositions { board_id: Uuid, updates: usize },
    CardPositions { board_id: Uuid, updates: usize },
}

/// Failures injected into a [`MemoryStore`].
#[derive(Debug, Default)]
struct Faults {
    reads: Option<EngineError>,
    writes: Option<EngineError>,
}

/// In-memory board storage with call recording and failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    boards: Mutex<HashMap<Uuid, BoardSnapshot>>,
    calls: Mutex<Vec<StoreCall>>,
    faults: Mutex<Faults>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a single board.
    pub fn with_snapshot(snapshot: BoardSnapshot) -> Self {
        let store = Self::new();
        store.insert(snapshot);
        store
    }

    /// Insert or replace a board.
    pub fn insert(&self, snapshot: BoardSnapshot) {
        lock(&self.boards).insert(snapshot.board.id, snapshot);
    }

    /// Raw stored state, without sorting.
    pub fn snapshot(&self, board_id: Uuid) -> Option<BoardSnapshot> {
        lock(&self.boards).get(&board_id).cloned()
    }

    /// Simulate a write by another client.
    pub fn bump_version(&self, board_id: Uuid) {
        if let Some(snapshot) = lock(&self.boards).get_mut(&board_id) {
            snapshot.board.version += 1;
        }
    }

    /// Make every subsequent position write fail with `error`.
    pub fn fail_writes_with(&self, error: EngineError) {
        lock(&self.faults).writes = Some(error);
    }

    /// Make every subsequent fetch fail with `error`.
    pub fn fail_reads_with(&self, error: EngineError) {
        lock(&self.faults).reads = Some(error);
    }

    pub fn clear_failures(&self) {
        *lock(&self.faults) = Faults::default();
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Number of position writes received (successful or not).
    pub fn write_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| !matches!(c, StoreCall::Fetch(_)))
            .count()
    }

    fn record(&self, call: StoreCall) {
        lock(&self.calls).push(call);
    }

    fn write_fault(&self) -> Result<(), EngineError> {
        match &lock(&self.faults).writes {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn get_lists_with_cards(&self, board_id: Uuid) -> Result<BoardSnapshot, EngineError> {
        self.record(StoreCall::Fetch(board_id));
        if let Some(error) = &lock(&self.faults).reads {
            return Err(error.clone());
        }

        let mut snapshot = self
            .snapshot(board_id)
            .ok_or_else(|| EngineError::board_not_found(board_id))?;

        snapshot.lists.sort_by_key(|l| l.list.position);
        for entry in &mut snapshot.lists {
            entry.cards.sort_by_key(|c| c.position);
        }
        Ok(snapshot)
    }

    async fn update_list_positions(
        &self,
        batch: &PositionBatch<ListPositionUpdate>,
    ) -> Result<i64, EngineError> {
        self.record(StoreCall::ListPositions {
            board_id: batch.board_id,
            updates: batch.updates.len(),
        });
        self.write_fault()?;
        check_batch_scope(batch, |u| u.board_id)?;

        let mut boards = lock(&self.boards);
        let snapshot = boards
            .get_mut(&batch.board_id)
            .ok_or_else(|| EngineError::board_not_found(batch.board_id))?;
        check_version(batch, snapshot.board.version)?;
        if batch.updates.is_empty() {
            return Ok(snapshot.board.version);
        }

        // Validate the whole batch before touching anything.
        for update in &batch.updates {
            if !snapshot.lists.iter().any(|l| l.list.id == update.id) {
                return Err(EngineError::list_not_found(update.id));
            }
        }

        for update in &batch.updates {
            if let Some(entry) = snapshot.lists.iter_mut().find(|l| l.list.id == update.id) {
                entry.list.position = update.position;
            }
        }

        snapshot.board.version += 1;
        Ok(snapshot.board.version)
    }

    async fn update_card_positions(
        &self,
        batch: &PositionBatch<CardPositionUpdate>,
    ) -> Result<i64, EngineError> {
        self.record(StoreCall::CardPositions {
            board_id: batch.board_id,
            updates: batch.updates.len(),
        });
        self.write_fault()?;
        check_batch_scope(batch, |u| u.board_id)?;

        let mut boards = lock(&self.boards);
        let snapshot = boards
            .get_mut(&batch.board_id)
            .ok_or_else(|| EngineError::board_not_found(batch.board_id))?;
        check_version(batch, snapshot.board.version)?;
        if batch.updates.is_empty() {
            return Ok(snapshot.board.version);
        }

        for update in &batch.updates {
            if !snapshot.lists.iter().any(|l| l.list.id == update.list_id) {
                return Err(EngineError::list_not_found(update.list_id));
            }
            if !snapshot.lists.iter().any(|l| l.cards.iter().any(|c| c.id == update.id)) {
                return Err(EngineError::card_not_found(update.id));
            }
        }

        for update in &batch.updates {
            let Some(mut card) = snapshot.lists.iter_mut().find_map(|l| {
                let at = l.cards.iter().position(|c| c.id == update.id)?;
                Some(l.cards.remove(at))
            }) else {
                continue;
            };
            card.position = update.position;
            card.list_id = update.list_id;
            if let Some(target) = snapshot.lists.iter_mut().find(|l| l.list.id == update.list_id) {
                target.cards.push(card);
            }
        }

        snapshot.board.version += 1;
        Ok(snapshot.board.version)
    }
}
