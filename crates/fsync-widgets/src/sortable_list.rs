#![forbid(unsafe_code)]

//! Reorderable-list widget: moves apply optimistically, the whole order
//! persists as one operation.
//!
//! The entire list is one logical target and moves are single-flight: a
//! second move while one is saving is refused, which is also what keeps
//! the persisted snapshot authoritative. `order` fields are renumbered on
//! every move so they stay contiguous, zero-based, and equal to array
//! position.

use fsync_backend::{ServerCall, ServerReply, SortableItem};
use fsync_runtime::{Reconcile, RecordMeta, Target};

/// Splice an item from `from` to `to` and renumber every `order` field.
pub fn reorder(items: &[SortableItem], from: usize, to: usize) -> Vec<SortableItem> {
    let mut next: Vec<SortableItem> = items.to_vec();
    if from >= next.len() {
        return next;
    }
    let moved = next.remove(from);
    let to = to.min(next.len());
    next.insert(to, moved);
    for (position, item) in next.iter_mut().enumerate() {
        item.order = position as u32;
    }
    next
}

/// Actions against the sortable list.
///
/// `items` is the reordered snapshot of the display the user acted on;
/// it is what gets persisted. The reducer reapplies the move positionally
/// so the overlay stays a pure fold.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortAction {
    Move {
        from: usize,
        to: usize,
        items: Vec<SortableItem>,
    },
}

/// The reorderable-list configuration of the engine.
pub struct SortableList;

impl Reconcile for SortableList {
    type State = Vec<SortableItem>;
    type Action = SortAction;
    type Reply = Vec<SortableItem>;

    fn target(_action: &SortAction) -> Target {
        Target::from("order")
    }

    fn apply(state: &mut Vec<SortableItem>, action: &SortAction, _meta: &RecordMeta) {
        let SortAction::Move { from, to, .. } = action;
        *state = reorder(state, *from, *to);
    }

    fn commit(state: &mut Vec<SortableItem>, reply: Vec<SortableItem>) {
        *state = reply;
    }

    fn call(action: &SortAction) -> ServerCall {
        let SortAction::Move { items, .. } = action;
        ServerCall::PersistOrder {
            items: items.clone(),
        }
    }

    fn decode(reply: ServerReply) -> Option<Vec<SortableItem>> {
        match reply {
            ServerReply::Order(items) => Some(items),
            _ => None,
        }
    }
}

/// Move the item at `index` one slot up, if it has somewhere to go.
pub fn move_up(display: &[SortableItem], index: usize) -> Option<SortAction> {
    if index == 0 || index >= display.len() {
        return None;
    }
    Some(SortAction::Move {
        from: index,
        to: index - 1,
        items: reorder(display, index, index - 1),
    })
}

/// Move the item at `index` one slot down, if it has somewhere to go.
pub fn move_down(display: &[SortableItem], index: usize) -> Option<SortAction> {
    if index + 1 >= display.len() {
        return None;
    }
    Some(SortAction::Move {
        from: index,
        to: index + 1,
        items: reorder(display, index, index + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsync_backend::{ItemId, SimServer};
    use fsync_runtime::{DispatchError, Dispatcher, ResolveOutcome};

    fn items() -> Vec<SortableItem> {
        ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, text)| SortableItem {
                id: ItemId(i as u32 + 1),
                text: text.to_string(),
                order: i as u32,
            })
            .collect()
    }

    fn texts(items: &[SortableItem]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    fn orders_are_contiguous(items: &[SortableItem]) -> bool {
        items
            .iter()
            .enumerate()
            .all(|(position, item)| item.order == position as u32)
    }

    #[test]
    fn reorder_moves_and_renumbers() {
        let next = reorder(&items(), 0, 1);
        assert_eq!(texts(&next), vec!["b", "a", "c", "d"]);
        assert!(orders_are_contiguous(&next));
    }

    #[test]
    fn reorder_out_of_range_from_is_identity() {
        let next = reorder(&items(), 9, 0);
        assert_eq!(texts(&next), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn move_helpers_respect_the_edges() {
        let state = items();
        assert!(move_up(&state, 0).is_none());
        assert!(move_down(&state, 3).is_none());
        assert!(move_up(&state, 4).is_none());
        assert!(move_up(&state, 1).is_some());
        assert!(move_down(&state, 2).is_some());
    }

    #[test]
    fn moving_first_down_then_third_up_is_deterministic() {
        // Fully settled between moves: [a,b,c,d] -> [b,a,c,d] -> [b,c,a,d].
        let after_first = reorder(&items(), 0, 1);
        let after_second = reorder(&after_first, 2, 1);
        assert_eq!(texts(&after_second), vec!["b", "c", "a", "d"]);
        assert!(orders_are_contiguous(&after_second));
    }

    #[test]
    fn optimistic_move_persists_and_matches_the_display() {
        let state = items();
        let mut server = SimServer::default().with_items(state.clone());
        let mut d = Dispatcher::<SortableList>::new(state);

        let action = move_down(&d.display(), 0).unwrap();
        d.dispatch(&mut server, action).unwrap();
        assert_eq!(texts(&d.display()), vec!["b", "a", "c", "d"]);

        for c in server.advance_until_idle() {
            assert_eq!(d.resolve(c).unwrap().outcome, ResolveOutcome::Committed);
        }
        assert_eq!(texts(d.confirmed()), vec!["b", "a", "c", "d"]);
        assert!(orders_are_contiguous(d.confirmed()));
        assert_eq!(server.items(), d.confirmed().as_slice());
    }

    #[test]
    fn a_second_move_while_saving_is_refused() {
        let state = items();
        let mut server = SimServer::default().with_items(state.clone());
        let mut d = Dispatcher::<SortableList>::new(state);

        d.dispatch(&mut server, move_down(&d.display(), 0).unwrap())
            .unwrap();
        let second = d.dispatch(&mut server, move_up(&d.display(), 2).unwrap());
        assert!(matches!(second, Err(DispatchError::InFlight(_))));

        // Once settled, the next move applies on the committed order.
        for c in server.advance_until_idle() {
            d.resolve(c).unwrap();
        }
        d.dispatch(&mut server, move_up(&d.display(), 2).unwrap())
            .unwrap();
        for c in server.advance_until_idle() {
            d.resolve(c).unwrap();
        }
        assert_eq!(texts(d.confirmed()), vec!["b", "c", "a", "d"]);
        assert!(orders_are_contiguous(d.confirmed()));
    }

    #[test]
    fn failed_move_reverts_to_the_confirmed_order() {
        let state = items();
        let mut server = SimServer::default().with_items(state.clone());
        let mut d = Dispatcher::<SortableList>::new(state);
        server.set_fail_mode(true);

        d.dispatch(&mut server, move_down(&d.display(), 0).unwrap())
            .unwrap();
        assert_eq!(texts(&d.display()), vec!["b", "a", "c", "d"]);

        for c in server.advance_until_idle() {
            assert_eq!(d.resolve(c).unwrap().outcome, ResolveOutcome::RolledBack);
        }
        assert_eq!(texts(&d.display()), vec!["a", "b", "c", "d"]);
        assert_eq!(d.take_notices().len(), 1);
    }
}
