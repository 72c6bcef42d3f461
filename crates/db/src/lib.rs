//! `db` crate: pure persistence layer.
//!
//! Provides a SQLite connection pool, typed row structs, repository functions
//! for every table in the taskboard schema, and the SQL-backed
//! [`engine::PositionStore`].  Ordering rules live in the `engine` crate.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;
pub mod store;

pub use pool::DbPool;
pub use error::DbError;
pub use store::SqlPositionStore;
