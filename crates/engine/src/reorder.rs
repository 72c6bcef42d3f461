//! Drag-and-drop reordering: run this on every drag-end event.
//!
//! Rules enforced:
//! 1. A cancelled drag, or a drop back onto its own slot, is a no-op.
//! 2. A list move stays within its board; every list is renumbered and only
//!    the lists whose position changed are reported.
//! 3. A card move renumbers every card of each affected list and reports all
//!    of them.  A cross-list move also reassigns the card's `list_id`.
//! 4. A stale source index aborts the move without touching anything.
//!
//! [`reorder`] is a pure function: the caller's lists are never mutated and
//! nothing is persisted here.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    EngineError,
    models::{
        CardPositionUpdate, DragEnd, DropLocation, ItemKind, ListPositionUpdate, ListWithCards,
        PositionUpdates,
    },
    position::PositionBase,
};

/// Result of applying one drag to a board's lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOutcome {
    /// The new ordered lists, ready for an optimistic re-render.
    pub lists: Vec<ListWithCards>,
    /// Position updates to hand to the position store.
    pub updates: PositionUpdates,
}

impl ReorderOutcome {
    fn unchanged(lists: &[ListWithCards]) -> Self {
        Self { lists: lists.to_vec(), updates: PositionUpdates::None }
    }

    /// `true` when the drag produced nothing to persist.
    pub fn is_noop(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Apply `drag` to the ordered `lists` of board `board_id`.
///
/// # Errors
/// - [`EngineError::Validation`] if a list drag references a container other
///   than the board.
/// - [`EngineError::NotFound`] if a card drag references an unknown list.
pub fn reorder(
    board_id: Uuid,
    lists: &[ListWithCards],
    drag: &DragEnd,
    base: PositionBase,
) -> Result<ReorderOutcome, EngineError> {
    // -----------------------------------------------------------------------
    // 1. No-op guards
    // -----------------------------------------------------------------------
    let Some(destination) = drag.destination else {
        debug!("{} drag cancelled", drag.kind);
        return Ok(ReorderOutcome::unchanged(lists));
    };

    if destination == drag.source {
        debug!("{} dropped back at index {}", drag.kind, destination.index);
        return Ok(ReorderOutcome::unchanged(lists));
    }

    // -----------------------------------------------------------------------
    // 2. Dispatch on the dragged item
    // -----------------------------------------------------------------------
    match drag.kind {
        ItemKind::List => move_list(board_id, lists, drag.source, destination, base),
        ItemKind::Card => move_card(board_id, lists, drag.source, destination, base),
    }
}

fn move_list(
    board_id: Uuid,
    lists: &[ListWithCards],
    source: DropLocation,
    destination: DropLocation,
    base: PositionBase,
) -> Result<ReorderOutcome, EngineError> {
    if source.container_id != board_id || destination.container_id != board_id {
        return Err(EngineError::Validation(format!(
            "list moves must stay within board '{board_id}'"
        )));
    }

    if source.index >= lists.len() {
        warn!(
            "list source index {} out of range ({} lists), ignoring move",
            source.index,
            lists.len()
        );
        return Ok(ReorderOutcome::unchanged(lists));
    }

    let mut ordered = lists.to_vec();
    let moved = ordered.remove(source.index);
    let at = destination.index.min(ordered.len());
    ordered.insert(at, moved);

    // Renumber everything, report only what changed.
    let mut updates = Vec::new();
    for (index, entry) in ordered.iter_mut().enumerate() {
        let position = base.at(index);
        if entry.list.position != position {
            entry.list.position = position;
            updates.push(ListPositionUpdate { id: entry.list.id, position, board_id });
        }
    }

    debug!("list moved {} -> {}, {} positions changed", source.index, at, updates.len());

    Ok(ReorderOutcome { lists: ordered, updates: PositionUpdates::lists(updates) })
}

fn move_card(
    board_id: Uuid,
    lists: &[ListWithCards],
    source: DropLocation,
    destination: DropLocation,
    base: PositionBase,
) -> Result<ReorderOutcome, EngineError> {
    let from = index_of(lists, source.container_id)?;
    let to = index_of(lists, destination.container_id)?;

    if source.index >= lists[from].cards.len() {
        warn!(
            "card source index {} out of range for list '{}', ignoring move",
            source.index, source.container_id
        );
        return Ok(ReorderOutcome::unchanged(lists));
    }

    let mut ordered = lists.to_vec();
    let mut moved = ordered[from].cards.remove(source.index);

    if from == to {
        // -------------------------------------------------------------------
        // Same list: splice and renumber the one list.
        // -------------------------------------------------------------------
        let cards = &mut ordered[from].cards;
        let at = destination.index.min(cards.len());
        cards.insert(at, moved);
        renumber_cards(&mut ordered[from], base);

        debug!("card moved {} -> {} within list '{}'", source.index, at, source.container_id);

        let updates = card_updates(&ordered[from], board_id);
        return Ok(ReorderOutcome { lists: ordered, updates: PositionUpdates::cards(updates) });
    }

    // -----------------------------------------------------------------------
    // Cross list: reassign ownership, insert, renumber both lists.
    // -----------------------------------------------------------------------
    moved.list_id = destination.container_id;
    let cards = &mut ordered[to].cards;
    let at = destination.index.min(cards.len());
    cards.insert(at, moved);

    renumber_cards(&mut ordered[from], base);
    renumber_cards(&mut ordered[to], base);

    debug!(
        "card moved from list '{}'[{}] to list '{}'[{}]",
        source.container_id, source.index, destination.container_id, at
    );

    let mut updates = card_updates(&ordered[from], board_id);
    updates.extend(card_updates(&ordered[to], board_id));

    Ok(ReorderOutcome { lists: ordered, updates: PositionUpdates::cards(updates) })
}

fn index_of(lists: &[ListWithCards], list_id: Uuid) -> Result<usize, EngineError> {
    lists
        .iter()
        .position(|l| l.list.id == list_id)
        .ok_or_else(|| EngineError::list_not_found(list_id))
}

fn renumber_cards(entry: &mut ListWithCards, base: PositionBase) {
    for (index, card) in entry.cards.iter_mut().enumerate() {
        card.position = base.at(index);
    }
}

fn card_updates(entry: &ListWithCards, board_id: Uuid) -> Vec<CardPositionUpdate> {
    entry
        .cards
        .iter()
        .map(|card| CardPositionUpdate {
            id: card.id,
            position: card.position,
            list_id: entry.list.id,
            board_id,
        })
        .collect()
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, List};

    fn make_board(base: PositionBase, layout: &[(&str, &[&str])]) -> (Uuid, Vec<ListWithCards>) {
        let board_id = Uuid::new_v4();
        let lists = layout
            .iter()
            .enumerate()
            .map(|(i, (title, cards))| {
                let list = List::new(board_id, *title, base.at(i));
                let cards = cards
                    .iter()
                    .enumerate()
                    .map(|(j, c)| Card::new(list.id, *c, base.at(j)))
                    .collect();
                ListWithCards::new(list, cards)
            })
            .collect();
        (board_id, lists)
    }

    fn titles(entry: &ListWithCards) -> Vec<&str> {
        entry.cards.iter().map(|c| c.title.as_str()).collect()
    }

    fn positions(entry: &ListWithCards) -> Vec<i32> {
        entry.cards.iter().map(|c| c.position).collect()
    }

    #[test]
    fn moving_last_list_to_front_renumbers_one_based() {
        // L1(1), L2(2), L3(3); move L3 to index 0.
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("L1", &[]), ("L2", &[]), ("L3", &[])]);

        let outcome = reorder(board_id, &lists, &DragEnd::list(board_id, 2, 0), base)
            .expect("valid move");

        let order: Vec<&str> = outcome.lists.iter().map(|l| l.list.title.as_str()).collect();
        assert_eq!(order, vec!["L3", "L1", "L2"]);
        let pos: Vec<i32> = outcome.lists.iter().map(|l| l.list.position).collect();
        assert_eq!(pos, vec![1, 2, 3]);

        // Every list moved, so every list is reported.
        match outcome.updates {
            PositionUpdates::Lists(updates) => {
                assert_eq!(updates.len(), 3);
                assert_eq!(updates[0].id, lists[2].list.id);
                assert_eq!(updates[0].position, 1);
                assert!(updates.iter().all(|u| u.board_id == board_id));
            }
            other => panic!("expected list updates, got {other:?}"),
        }
    }

    #[test]
    fn moving_last_list_to_front_renumbers_zero_based() {
        let base = PositionBase::new(0);
        let (board_id, lists) = make_board(base, &[("L1", &[]), ("L2", &[]), ("L3", &[])]);

        let outcome = reorder(board_id, &lists, &DragEnd::list(board_id, 2, 0), base).unwrap();
        let pos: Vec<i32> = outcome.lists.iter().map(|l| l.list.position).collect();
        assert_eq!(pos, vec![0, 1, 2]);
    }

    #[test]
    fn swapping_adjacent_lists_reports_only_changed_positions() {
        let base = PositionBase::default();
        let (board_id, lists) =
            make_board(base, &[("A", &[]), ("B", &[]), ("C", &[]), ("D", &[])]);

        let outcome = reorder(board_id, &lists, &DragEnd::list(board_id, 1, 2), base).unwrap();

        match outcome.updates {
            PositionUpdates::Lists(updates) => {
                let ids: Vec<Uuid> = updates.iter().map(|u| u.id).collect();
                assert_eq!(ids, vec![lists[2].list.id, lists[1].list.id]);
            }
            other => panic!("expected list updates, got {other:?}"),
        }
    }

    #[test]
    fn cross_list_card_move_scenario() {
        // ListA=[C1,C2,C3], ListB=[C4]; move C2 to ListB index 0.
        let base = PositionBase::new(0);
        let (board_id, lists) =
            make_board(base, &[("A", &["C1", "C2", "C3"]), ("B", &["C4"])]);
        let (a, b) = (lists[0].list.id, lists[1].list.id);

        let outcome = reorder(board_id, &lists, &DragEnd::card(a, 1, b, 0), base).unwrap();

        assert_eq!(titles(&outcome.lists[0]), vec!["C1", "C3"]);
        assert_eq!(positions(&outcome.lists[0]), vec![0, 1]);
        assert_eq!(titles(&outcome.lists[1]), vec!["C2", "C4"]);
        assert_eq!(positions(&outcome.lists[1]), vec![0, 1]);
        assert_eq!(outcome.lists[1].cards[0].list_id, b);

        match outcome.updates {
            PositionUpdates::Cards(updates) => {
                // Both lists are reported in full.
                assert_eq!(updates.len(), 4);
                let moved = updates.iter().find(|u| u.id == lists[0].cards[1].id).unwrap();
                assert_eq!(moved.list_id, b);
                assert_eq!(moved.position, 0);
            }
            other => panic!("expected card updates, got {other:?}"),
        }
    }

    #[test]
    fn same_list_card_move_reports_whole_list() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &["C1", "C2", "C3"])]);
        let a = lists[0].list.id;

        let outcome = reorder(board_id, &lists, &DragEnd::card(a, 0, a, 2), base).unwrap();

        assert_eq!(titles(&outcome.lists[0]), vec!["C2", "C3", "C1"]);
        assert_eq!(positions(&outcome.lists[0]), vec![1, 2, 3]);
        assert_eq!(outcome.updates.len(), 3);
    }

    #[test]
    fn dropping_in_place_is_noop() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &["C1", "C2"])]);
        let a = lists[0].list.id;

        let outcome = reorder(board_id, &lists, &DragEnd::card(a, 1, a, 1), base).unwrap();
        assert!(outcome.is_noop());
        assert_eq!(outcome.lists, lists);
    }

    #[test]
    fn cancelled_drag_is_noop() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &[]), ("B", &[])]);
        let drag = DragEnd::cancelled(
            ItemKind::List,
            DropLocation { container_id: board_id, index: 0 },
        );

        let outcome = reorder(board_id, &lists, &drag, base).unwrap();
        assert!(outcome.is_noop());
        assert_eq!(outcome.lists, lists);
    }

    #[test]
    fn stale_source_index_aborts_without_changes() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &["C1"]), ("B", &[])]);
        let (a, b) = (lists[0].list.id, lists[1].list.id);

        let outcome = reorder(board_id, &lists, &DragEnd::card(a, 5, b, 0), base).unwrap();
        assert!(outcome.is_noop());
        assert_eq!(outcome.lists, lists);
    }

    #[test]
    fn destination_past_end_appends() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &["C1", "C2"]), ("B", &["C3"])]);
        let (a, b) = (lists[0].list.id, lists[1].list.id);

        let outcome = reorder(board_id, &lists, &DragEnd::card(a, 0, b, 99), base).unwrap();
        assert_eq!(titles(&outcome.lists[1]), vec!["C3", "C1"]);
        assert_eq!(positions(&outcome.lists[1]), vec![1, 2]);
    }

    #[test]
    fn unknown_list_is_not_found() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &["C1"])]);
        let ghost = Uuid::new_v4();

        let result = reorder(board_id, &lists, &DragEnd::card(lists[0].list.id, 0, ghost, 0), base);
        assert!(matches!(
            result,
            Err(EngineError::NotFound { entity: "list", id }) if id == ghost
        ));
    }

    #[test]
    fn list_move_outside_board_is_rejected() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &[]), ("B", &[])]);
        let mut drag = DragEnd::list(board_id, 0, 1);
        drag.destination = Some(DropLocation { container_id: Uuid::new_v4(), index: 1 });

        assert!(matches!(
            reorder(board_id, &lists, &drag, base),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn input_lists_are_not_mutated() {
        let base = PositionBase::default();
        let (board_id, lists) = make_board(base, &[("A", &["C1", "C2"]), ("B", &[])]);
        let before = lists.clone();

        let _ = reorder(
            board_id,
            &lists,
            &DragEnd::card(lists[0].list.id, 0, lists[1].list.id, 0),
            base,
        )
        .unwrap();

        assert_eq!(lists, before);
    }
}
