#![forbid(unsafe_code)]

//! FrankenSync public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from internal crates and offers a lightweight
//! prelude for day-to-day usage.

// --- Core re-exports -------------------------------------------------------

pub use fsync_core::{
    ActionRecord, FaultInjector, RecordId, RecordStatus, Seq, ServerError, ServerResult, SimClock,
    SimTime,
};

// --- Backend re-exports ----------------------------------------------------

pub use fsync_backend::{
    AnalysisReport, ChatExchange, ChatMessage, ChatRole, Comment, CommentId, Completion, ItemId,
    MessageId, OpKind, ServerCall, ServerConfig, ServerReply, SimServer, SortableItem, Ticket,
    TodoId, TodoItem,
};

// --- Runtime re-exports ----------------------------------------------------

pub use fsync_runtime::{
    DispatchError, Dispatcher, FailurePolicy, FlightPolicy, Notice, Reconcile, RecordMeta,
    Resolution, ResolveOutcome, Target, UpdateMode, overlay,
};

// --- Widget re-exports -----------------------------------------------------

pub use fsync_widgets::{
    AttemptStatus, ChatAction, ChatEntry, ChatTurn, ClickAttempt, ClickMonitor, ClientTag,
    CommentAction, CommentEntry, CommentFeed, Delivery, RapidAction, RapidToggle, SortAction,
    SortableList, TagSource, TodoAction, TodoList, reorder,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Completion, DispatchError, Dispatcher, FailurePolicy, FlightPolicy, Reconcile, RecordMeta,
        ResolveOutcome, ServerCall, ServerConfig, ServerError, ServerReply, SimServer, Target,
        Ticket, UpdateMode,
    };
}
