//! Repository functions: one function per database operation.
//!
//! Every function takes a `&DbPool` (or a connection inside a caller's
//! transaction) and returns a `Result<T, DbError>`.  No ordering logic lives
//! here: positions are written exactly as the engine computed them.

pub mod workspaces;
pub mod boards;
pub mod lists;
pub mod cards;
pub mod positions;
pub mod audit_logs;

#[cfg(test)]
mod concurrency_tests;
