#![forbid(unsafe_code)]

//! Toggle-list widget: a todo list whose done flags save optimistically.
//!
//! Single-flight per todo id (a checkbox mid-save refuses another click on
//! the same item), auto-revert on failure with a transient notice.

use fsync_backend::{ServerCall, ServerReply, TodoId, TodoItem};
use fsync_runtime::{Reconcile, RecordMeta, Target};

/// Actions against the todo list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TodoAction {
    Toggle { id: TodoId, done: bool },
}

/// The toggle-list configuration of the engine.
pub struct TodoList;

impl Reconcile for TodoList {
    type State = Vec<TodoItem>;
    type Action = TodoAction;
    type Reply = (TodoId, bool);

    fn target(action: &TodoAction) -> Target {
        let TodoAction::Toggle { id, .. } = action;
        Target::new(id.to_string())
    }

    fn apply(state: &mut Vec<TodoItem>, action: &TodoAction, _meta: &RecordMeta) {
        let TodoAction::Toggle { id, done } = action;
        if let Some(todo) = state.iter_mut().find(|t| t.id == *id) {
            todo.done = *done;
        }
    }

    fn commit(state: &mut Vec<TodoItem>, (id, done): (TodoId, bool)) {
        if let Some(todo) = state.iter_mut().find(|t| t.id == id) {
            todo.done = done;
        }
    }

    fn call(action: &TodoAction) -> ServerCall {
        let TodoAction::Toggle { id, done } = action;
        ServerCall::Toggle {
            id: *id,
            done: *done,
        }
    }

    fn decode(reply: ServerReply) -> Option<(TodoId, bool)> {
        match reply {
            ServerReply::ToggleAck { id, done } => Some((id, done)),
            _ => None,
        }
    }
}

/// The click intent: flip the flag the user currently sees.
pub fn toggle_intent(display: &[TodoItem], id: TodoId) -> Option<TodoAction> {
    let todo = display.iter().find(|t| t.id == id)?;
    Some(TodoAction::Toggle {
        id,
        done: !todo.done,
    })
}
