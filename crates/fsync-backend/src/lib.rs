#![forbid(unsafe_code)]

//! FrankenSync Backend
//!
//! The simulated server: an in-process, single-client stand-in with
//! artificial per-operation latency, one-shot fault injection, and
//! authoritative stores. Its only contract is the asynchronous
//! submit/completion surface in [`call`]; there is no persistence, no
//! network protocol, and no multi-user concurrency.
//!
//! # Key Components
//!
//! - [`SimServer`] - the server: submit, advance, force-complete
//! - [`ServerConfig`] - latency table and validation settings
//! - [`ServerCall`] / [`ServerReply`] / [`Completion`] - the operation surface
//! - [`types`] - the domain shapes the demos reconcile
//!
//! # Role in FrankenSync
//! The backend is the only suspension point in the system: time passes
//! exclusively through [`SimServer::advance`], and every asynchronous
//! effect the dispatcher observes is a [`Completion`] returned from it.

pub mod call;
pub mod server;
pub mod types;

pub use call::{Completion, OpKind, ServerCall, ServerReply, Ticket};
pub use server::{ServerConfig, SimServer};
pub use types::{
    AnalysisReport, ChatExchange, ChatMessage, ChatRole, Comment, CommentId, ItemId, MessageId,
    SortableItem, TodoId, TodoItem,
};
