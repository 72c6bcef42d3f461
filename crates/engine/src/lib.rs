//! `engine` crate: board domain models, the ordering engine, the position
//! store contract, and optimistic client reconciliation.

pub mod models;
pub mod error;
pub mod position;
pub mod reorder;
pub mod store;
pub mod memory;
pub mod reconcile;

pub use models::{
    Board, BoardSnapshot, Card, CardPositionUpdate, DragEnd, DropLocation, ItemKind, List,
    ListPositionUpdate, ListWithCards, PositionBatch, PositionUpdates,
};
pub use error::EngineError;
pub use position::{PositionBase, DEFAULT_POSITION_BASE};
pub use reorder::{reorder, ReorderOutcome};
pub use store::PositionStore;
pub use memory::MemoryStore;
pub use reconcile::{BoardView, Notice, PendingReorder, SyncOutcome};
