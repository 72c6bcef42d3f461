//! Position numbering convention.
//!
//! In-memory sequences are indexed from zero.  Persisted positions are that
//! index plus a single [`PositionBase`], applied by the engine whenever it
//! renumbers a container.  The position store writes the values it receives
//! verbatim and never adds an offset of its own.

use serde::{Deserialize, Serialize};

/// Offset between a zero-based sequence index and a persisted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionBase(i32);

/// Persisted positions are 1-based.
pub const DEFAULT_POSITION_BASE: PositionBase = PositionBase(1);

impl PositionBase {
    pub const fn new(base: i32) -> Self {
        Self(base)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Persisted position for the item at `index`.
    pub fn at(self, index: usize) -> i32 {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        self.0.saturating_add(index)
    }

    /// Position for an item appended after `max_existing`.
    ///
    /// An empty container starts at the base.
    pub fn next_after(self, max_existing: Option<i32>) -> i32 {
        match max_existing {
            Some(max) => max.saturating_add(1),
            None => self.0,
        }
    }
}

impl Default for PositionBase {
    fn default() -> Self {
        DEFAULT_POSITION_BASE
    }
}

impl std::fmt::Display for PositionBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_is_one() {
        assert_eq!(PositionBase::default().get(), 1);
        assert_eq!(PositionBase::default().at(0), 1);
        assert_eq!(PositionBase::default().at(2), 3);
    }

    #[test]
    fn zero_base_matches_index() {
        let base = PositionBase::new(0);
        assert_eq!(base.at(0), 0);
        assert_eq!(base.at(4), 4);
    }

    #[test]
    fn next_after_appends_past_max() {
        let base = PositionBase::default();
        assert_eq!(base.next_after(None), 1);
        assert_eq!(base.next_after(Some(1)), 2);
        // Gaps left by deletes are not filled.
        assert_eq!(base.next_after(Some(9)), 10);
    }
}
