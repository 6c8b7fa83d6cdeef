#![forbid(unsafe_code)]

//! FrankenSync Widgets
//!
//! The five demo widgets, each a thin configuration of the engine: a
//! confirmed-state shape, a tagged action type, a pure reducer, an
//! authoritative-merge function, and its policies. None of them contains
//! reconciliation logic; they differ only in shape and policy choice.
//!
//! | Widget | State | Flight | Failure |
//! |--------|-------|--------|---------|
//! | [`todo_list::TodoList`] | todo list | single per id | auto-revert |
//! | [`comment_feed::CommentFeed`] | comment entries | per-post | keep visible |
//! | [`sortable_list::SortableList`] | ordered items | single | auto-revert |
//! | [`rapid_toggle::RapidToggle`] | scalar bool | multi | auto-revert |
//! | [`chat_turn::ChatTurn`] | chat entries | single | keep visible |

use std::fmt;

pub mod chat_turn;
pub mod comment_feed;
pub mod rapid_toggle;
pub mod sortable_list;
pub mod todo_list;

pub use chat_turn::{ChatAction, ChatEntry, ChatTurn};
pub use comment_feed::{CommentAction, CommentEntry, CommentFeed};
pub use rapid_toggle::{AttemptStatus, ClickAttempt, ClickMonitor, RapidAction, RapidToggle};
pub use sortable_list::{SortAction, SortableList, reorder};
pub use todo_list::{TodoAction, TodoList};

/// Client-side identity for an optimistic entry, stable across retries.
///
/// The server knows nothing about it; it exists so a retried post renders
/// as the same on-screen item rather than a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClientTag(pub u64);

impl fmt::Display for ClientTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "temp-{}", self.0)
    }
}

/// Allocator for [`ClientTag`]s, one per composer.
#[derive(Debug, Clone, Default)]
pub struct TagSource {
    next: u64,
}

impl TagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> ClientTag {
        self.next += 1;
        ClientTag(self.next)
    }
}

/// Delivery state of an optimistic list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delivery {
    /// Acknowledged by the server.
    Confirmed,
    /// Shown optimistically, confirmation outstanding.
    Pending,
    /// Rejected; rendered with a failure indicator and retry/discard.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique_and_display_like_temp_ids() {
        let mut tags = TagSource::new();
        let a = tags.next();
        let b = tags.next();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "temp-1");
    }
}
