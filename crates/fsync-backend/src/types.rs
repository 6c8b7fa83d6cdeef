#![forbid(unsafe_code)]

//! Domain types shared by the simulated server and the widgets.
//!
//! These are the shapes the demos reconcile: todos with a done flag,
//! posted comments, an ordered item list, chat messages, and the
//! artificial-delay analysis report.

use fsync_core::SimTime;
use std::fmt;

/// Identity of a todo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TodoId(pub u32);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "todo-{}", self.0)
    }
}

/// A todo entry with its completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TodoItem {
    pub id: TodoId,
    pub text: String,
    pub done: bool,
}

impl TodoItem {
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            done: false,
        }
    }
}

/// Server-assigned identity of a posted comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comment-{}", self.0)
    }
}

/// A comment acknowledged by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub posted_at: SimTime,
}

/// Identity of a reorderable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// An entry of the reorderable list.
///
/// `order` always equals the item's position in the list; the reducers
/// renumber on every move so the field stays contiguous and zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortableItem {
    pub id: ItemId,
    pub text: String,
    pub order: u32,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChatRole {
    User,
    Assistant,
}

/// Server-assigned identity of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// One message of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub text: String,
}

/// A confirmed chat turn: the user's message plus the canned reply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatExchange {
    pub user: ChatMessage,
    pub assistant: ChatMessage,
}

/// Result of the deliberately-slowed analysis operation.
///
/// The content is demo filler; nothing in the engine depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisReport {
    pub score: u8,
    pub summary: String,
    pub details: Vec<String>,
}
