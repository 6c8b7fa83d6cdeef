#![forbid(unsafe_code)]

//! The asynchronous operation surface.
//!
//! A widget encodes its intent as a [`ServerCall`] and submits it; the
//! server answers with a [`Ticket`] immediately and a [`Completion`]
//! once the operation's latency has elapsed. There is no wire format:
//! these are pure in-process contracts.

use crate::types::{AnalysisReport, ChatExchange, Comment, SortableItem, TodoId};
use fsync_core::{ServerError, SimTime};
use std::fmt;
use std::time::Duration;

/// Handle to one in-flight server call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    /// Raw value, for logs and transcripts.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// One abstract operation against the simulated server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerCall {
    /// Set a todo's done flag.
    Toggle { id: TodoId, done: bool },
    /// Post a comment.
    PostComment { text: String },
    /// Persist a full reordering of the sortable list.
    PersistOrder { items: Vec<SortableItem> },
    /// Send a chat message and receive the canned reply.
    ChatSend { text: String },
    /// Run the deliberately-slowed analysis.
    Analyze { delay: Duration },
}

impl ServerCall {
    pub fn kind(&self) -> OpKind {
        match self {
            ServerCall::Toggle { .. } => OpKind::Toggle,
            ServerCall::PostComment { .. } => OpKind::PostComment,
            ServerCall::PersistOrder { .. } => OpKind::PersistOrder,
            ServerCall::ChatSend { .. } => OpKind::ChatSend,
            ServerCall::Analyze { .. } => OpKind::Analyze,
        }
    }
}

/// Operation kind, used for latency lookup and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    Toggle,
    PostComment,
    PersistOrder,
    ChatSend,
    Analyze,
}

impl OpKind {
    /// Whether the fault switch applies to this operation.
    ///
    /// `Analyze` never fails and never consumes the switch.
    pub fn faultable(self) -> bool {
        !matches!(self, OpKind::Analyze)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Toggle => "toggle",
            OpKind::PostComment => "post_comment",
            OpKind::PersistOrder => "persist_order",
            OpKind::ChatSend => "chat_send",
            OpKind::Analyze => "analyze",
        };
        f.write_str(name)
    }
}

/// Authoritative result of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerReply {
    ToggleAck { id: TodoId, done: bool },
    Comment(Comment),
    Order(Vec<SortableItem>),
    Chat(ChatExchange),
    Analysis(AnalysisReport),
}

/// A resolved server call, delivered once per ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Completion {
    pub ticket: Ticket,
    pub finished_at: SimTime,
    pub reply: Result<ServerReply, ServerError>,
}
