#![forbid(unsafe_code)]

//! The simulated server.
//!
//! [`SimServer`] is an in-process, single-client stand-in for a backend.
//! Submitting a call returns a [`Ticket`] at once; the result arrives as a
//! [`Completion`] only after the operation's artificial latency has
//! elapsed on the simulated clock. The server owns the authoritative
//! stores (todos, comments, item order, chat transcript) and mutates them
//! at completion time, never at submit time.
//!
//! # How it works
//!
//! 1. `submit` validates the call, consumes the fault switch if armed,
//!    and queues an in-flight entry with a due instant.
//! 2. `advance(dt)` moves the clock and returns every completion that
//!    fell due, ordered by (due instant, ticket).
//! 3. `force_complete(ticket)` resolves one specific call immediately,
//!    which is how tests and demos script out-of-order resolution.
//!
//! Validation failures are returned synchronously from `submit`, before
//! any latency. An armed fault dooms the submission itself; the failure
//! is still delivered after the operation's normal latency.

use crate::call::{Completion, OpKind, ServerCall, ServerReply, Ticket};
use crate::types::{
    AnalysisReport, ChatExchange, ChatMessage, ChatRole, Comment, CommentId, MessageId,
    SortableItem, TodoItem,
};
use fsync_core::{FaultInjector, ServerError, ServerResult, SimClock, SimTime};
use std::time::Duration;
use tracing::{debug, trace};

/// Canned analysis scores, cycled per run.
const ANALYSIS_SCORES: [u8; 8] = [87, 92, 78, 95, 88, 91, 84, 89];

const ANALYSIS_SUMMARIES: [&str; 4] = [
    "Trends look healthy, with steady improvement over the period.",
    "Performance is stable across the board.",
    "A few areas need attention, but results are broadly positive.",
    "Excellent results; keep the current course.",
];

const ANALYSIS_DETAILS: [&str; 6] = [
    "User engagement up 15%",
    "Average session length trending up",
    "Conversion rate holding steady",
    "Bounce rate down 5%",
    "Returning-visitor share improved",
    "New-user acquisition on track",
];

/// Canned assistant replies, cycled per chat turn.
const CHAT_REPLIES: [&str; 4] = [
    "Optimistic UI is a powerful technique: reflecting a change immediately \
     makes an application feel far more responsive than waiting on the server.",
    "Streaming reveals are everywhere in chat interfaces; pacing the text \
     softens the perceived wait while the real work completes.",
    "An optimistic update shows the intended state right away and rolls back \
     automatically if the confirming operation fails.",
    "Combining optimistic updates with a deliberate delay on heavyweight \
     operations is a classic trick for balancing speed and trust.",
];

/// Per-operation artificial latencies and validation settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub toggle_latency: Duration,
    pub comment_latency: Duration,
    pub reorder_latency: Duration,
    pub chat_latency: Duration,
    /// Comment or chat text containing this substring is rejected.
    pub banned_substring: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            toggle_latency: Duration::from_millis(800),
            comment_latency: Duration::from_millis(1000),
            reorder_latency: Duration::from_millis(800),
            chat_latency: Duration::from_millis(1000),
            banned_substring: "error".to_string(),
        }
    }
}

impl ServerConfig {
    fn latency(&self, call: &ServerCall) -> Duration {
        match call {
            ServerCall::Toggle { .. } => self.toggle_latency,
            ServerCall::PostComment { .. } => self.comment_latency,
            ServerCall::PersistOrder { .. } => self.reorder_latency,
            ServerCall::ChatSend { .. } => self.chat_latency,
            ServerCall::Analyze { delay } => *delay,
        }
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: Ticket,
    call: ServerCall,
    due: SimTime,
    doomed: bool,
}

/// In-process simulated backend with artificial latency and fault injection.
#[derive(Debug)]
pub struct SimServer {
    config: ServerConfig,
    clock: SimClock,
    fault: FaultInjector,
    in_flight: Vec<InFlight>,
    next_ticket: u64,

    todos: Vec<TodoItem>,
    comments: Vec<Comment>,
    items: Vec<SortableItem>,
    transcript: Vec<ChatMessage>,

    next_comment_id: u64,
    next_message_id: u64,
    reply_cursor: usize,
    analysis_cursor: usize,
}

impl Default for SimServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl SimServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clock: SimClock::new(),
            fault: FaultInjector::new(),
            in_flight: Vec::new(),
            next_ticket: 1,
            todos: Vec::new(),
            comments: Vec::new(),
            items: Vec::new(),
            transcript: Vec::new(),
            next_comment_id: 1,
            next_message_id: 1,
            reply_cursor: 0,
            analysis_cursor: 0,
        }
    }

    /// Seed the authoritative todo store.
    #[must_use]
    pub fn with_todos(mut self, todos: Vec<TodoItem>) -> Self {
        self.todos = todos;
        self
    }

    /// Seed the authoritative sortable-item store.
    #[must_use]
    pub fn with_items(mut self, items: Vec<SortableItem>) -> Self {
        self.items = items;
        self
    }

    /// The current simulated instant.
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Arm or disarm the one-shot fault switch.
    pub fn set_fail_mode(&mut self, fail: bool) {
        if fail {
            self.fault.arm_once();
        } else {
            self.fault.disarm();
        }
    }

    /// Whether the fault switch is currently armed.
    pub fn fail_mode(&self) -> bool {
        self.fault.is_armed()
    }

    /// Submit a call. Validation happens here, before any latency.
    ///
    /// An armed fault switch dooms this submission (and disarms); the
    /// resulting [`ServerError::Simulated`] is delivered with the
    /// operation's normal latency, not synchronously.
    pub fn submit(&mut self, call: ServerCall) -> ServerResult<Ticket> {
        self.validate(&call)?;

        let kind = call.kind();
        let doomed = kind.faultable() && self.fault.consume();
        let latency = self.config.latency(&call);
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        let due = self.clock.now().after(latency);

        debug!(
            ticket = %ticket,
            op = %kind,
            latency_ms = latency.as_millis() as u64,
            doomed,
            "call submitted"
        );

        self.in_flight.push(InFlight {
            ticket,
            call,
            due,
            doomed,
        });
        Ok(ticket)
    }

    /// Advance the clock by `dt` and return the completions that fell due,
    /// ordered by (due instant, ticket).
    pub fn advance(&mut self, dt: Duration) -> Vec<Completion> {
        let now = self.clock.advance(dt);
        self.drain_due(now)
    }

    /// Run the clock forward until no call is in flight.
    pub fn advance_until_idle(&mut self) -> Vec<Completion> {
        let mut out = Vec::new();
        while let Some(next_due) = self.in_flight.iter().map(|i| i.due).min() {
            let dt = next_due.since(self.clock.now());
            out.extend(self.advance(dt));
        }
        out
    }

    /// Resolve one in-flight call immediately, without advancing the clock.
    ///
    /// This is the out-of-order hook: a later submission can be forced to
    /// complete before an earlier one.
    pub fn force_complete(&mut self, ticket: Ticket) -> Option<Completion> {
        let idx = self.in_flight.iter().position(|i| i.ticket == ticket)?;
        let infl = self.in_flight.remove(idx);
        trace!(ticket = %ticket, "forced completion");
        let at = self.clock.now();
        Some(self.complete(infl, at))
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Tickets currently in flight, in submission order.
    pub fn in_flight_tickets(&self) -> Vec<Ticket> {
        self.in_flight.iter().map(|i| i.ticket).collect()
    }

    /// Authoritative todo store.
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    /// Authoritative comment store, in post order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Authoritative sortable-item order.
    pub fn items(&self) -> &[SortableItem] {
        &self.items
    }

    /// Authoritative chat transcript.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    fn validate(&self, call: &ServerCall) -> ServerResult<()> {
        let (text, what) = match call {
            ServerCall::PostComment { text } => (text, "comment"),
            ServerCall::ChatSend { text } => (text, "message"),
            _ => return Ok(()),
        };
        if text.trim().is_empty() {
            return Err(ServerError::Validation(format!("{what} text is empty")));
        }
        if text.contains(&self.config.banned_substring) {
            return Err(ServerError::Validation(format!(
                "{what} text contains \"{}\"",
                self.config.banned_substring
            )));
        }
        Ok(())
    }

    fn drain_due(&mut self, now: SimTime) -> Vec<Completion> {
        let mut due = Vec::new();
        let mut keep = Vec::new();
        for infl in self.in_flight.drain(..) {
            if infl.due <= now {
                due.push(infl);
            } else {
                keep.push(infl);
            }
        }
        self.in_flight = keep;
        due.sort_by_key(|i| (i.due, i.ticket.0));
        due.into_iter()
            .map(|i| {
                let at = i.due;
                self.complete(i, at)
            })
            .collect()
    }

    /// Resolve one call at instant `at` (its due time, or "now" when forced).
    fn complete(&mut self, infl: InFlight, at: SimTime) -> Completion {
        let kind = infl.call.kind();
        let reply = if infl.doomed {
            Err(ServerError::Simulated(fault_message(kind).to_string()))
        } else {
            Ok(self.apply(infl.call, at))
        };
        debug!(
            ticket = %infl.ticket,
            op = %kind,
            ok = reply.is_ok(),
            at = %at,
            "call completed"
        );
        Completion {
            ticket: infl.ticket,
            finished_at: at,
            reply,
        }
    }

    /// Apply the authoritative mutation for a successful call.
    fn apply(&mut self, call: ServerCall, now: SimTime) -> ServerReply {
        match call {
            ServerCall::Toggle { id, done } => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
                    todo.done = done;
                }
                ServerReply::ToggleAck { id, done }
            }
            ServerCall::PostComment { text } => {
                let comment = Comment {
                    id: CommentId(self.next_comment_id),
                    text: text.trim().to_string(),
                    posted_at: now,
                };
                self.next_comment_id += 1;
                self.comments.push(comment.clone());
                ServerReply::Comment(comment)
            }
            ServerCall::PersistOrder { items } => {
                self.items = items.clone();
                ServerReply::Order(items)
            }
            ServerCall::ChatSend { text } => {
                let user = ChatMessage {
                    id: MessageId(self.next_message_id),
                    role: ChatRole::User,
                    text: text.trim().to_string(),
                };
                let assistant = ChatMessage {
                    id: MessageId(self.next_message_id + 1),
                    role: ChatRole::Assistant,
                    text: CHAT_REPLIES[self.reply_cursor % CHAT_REPLIES.len()].to_string(),
                };
                self.next_message_id += 2;
                self.reply_cursor += 1;
                self.transcript.push(user.clone());
                self.transcript.push(assistant.clone());
                ServerReply::Chat(ChatExchange { user, assistant })
            }
            ServerCall::Analyze { .. } => {
                let cursor = self.analysis_cursor;
                self.analysis_cursor += 1;
                let count = 3 + cursor % 2;
                let details = (0..count)
                    .map(|i| ANALYSIS_DETAILS[(cursor + i) % ANALYSIS_DETAILS.len()].to_string())
                    .collect();
                ServerReply::Analysis(AnalysisReport {
                    score: ANALYSIS_SCORES[cursor % ANALYSIS_SCORES.len()],
                    summary: ANALYSIS_SUMMARIES[cursor % ANALYSIS_SUMMARIES.len()].to_string(),
                    details,
                })
            }
        }
    }
}

fn fault_message(kind: OpKind) -> &'static str {
    match kind {
        OpKind::Toggle => "update failed",
        OpKind::PostComment => "comment post failed",
        OpKind::PersistOrder => "order save failed",
        OpKind::ChatSend => "reply failed",
        OpKind::Analyze => "analysis failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoId;

    fn server() -> SimServer {
        SimServer::default().with_todos(vec![
            TodoItem::new(TodoId(1), "write slides"),
            TodoItem::new(TodoId(2), "rehearse demo"),
        ])
    }

    #[test]
    fn toggle_completes_after_its_latency_not_before() {
        let mut server = server();
        server
            .submit(ServerCall::Toggle {
                id: TodoId(1),
                done: true,
            })
            .unwrap();

        assert!(server.advance(Duration::from_millis(799)).is_empty());
        let done = server.advance(Duration::from_millis(1));
        assert_eq!(done.len(), 1);
        assert!(matches!(
            done[0].reply,
            Ok(ServerReply::ToggleAck { done: true, .. })
        ));
        assert!(server.todos()[0].done);
    }

    #[test]
    fn validation_rejects_before_any_latency() {
        let mut server = server();
        let before = server.now();

        let empty = server.submit(ServerCall::PostComment {
            text: "   ".into(),
        });
        assert!(matches!(empty, Err(ServerError::Validation(_))));

        let banned = server.submit(ServerCall::PostComment {
            text: "this has error in it".into(),
        });
        assert!(matches!(banned, Err(ServerError::Validation(_))));

        assert_eq!(server.now(), before);
        assert_eq!(server.in_flight_count(), 0);
    }

    #[test]
    fn fault_switch_dooms_exactly_one_call() {
        let mut server = server();
        server.set_fail_mode(true);

        server
            .submit(ServerCall::Toggle {
                id: TodoId(1),
                done: true,
            })
            .unwrap();
        // Consumed at submit: a second call in flight at the same time is safe.
        assert!(!server.fail_mode());
        server
            .submit(ServerCall::Toggle {
                id: TodoId(2),
                done: true,
            })
            .unwrap();

        let done = server.advance_until_idle();
        assert_eq!(done.len(), 2);
        assert!(matches!(done[0].reply, Err(ServerError::Simulated(_))));
        assert!(matches!(done[1].reply, Ok(_)));

        // The doomed call made no authoritative mutation.
        assert!(!server.todos()[0].done);
        assert!(server.todos()[1].done);
    }

    #[test]
    fn fault_failure_is_delivered_with_latency() {
        let mut server = server();
        server.set_fail_mode(true);
        server
            .submit(ServerCall::Toggle {
                id: TodoId(1),
                done: true,
            })
            .unwrap();
        assert!(server.advance(Duration::from_millis(400)).is_empty());
        let done = server.advance(Duration::from_millis(400));
        assert!(matches!(done[0].reply, Err(ServerError::Simulated(_))));
    }

    #[test]
    fn analyze_never_fails_and_never_consumes_the_switch() {
        let mut server = server();
        server.set_fail_mode(true);

        server
            .submit(ServerCall::Analyze {
                delay: Duration::from_millis(50),
            })
            .unwrap();
        let done = server.advance(Duration::from_millis(50));
        assert!(matches!(done[0].reply, Ok(ServerReply::Analysis(_))));
        assert!(server.fail_mode(), "analyze must leave the switch armed");
    }

    #[test]
    fn analyze_latency_is_caller_supplied() {
        let mut server = server();
        server
            .submit(ServerCall::Analyze {
                delay: Duration::from_millis(3000),
            })
            .unwrap();
        assert!(server.advance(Duration::from_millis(2999)).is_empty());
        assert_eq!(server.advance(Duration::from_millis(1)).len(), 1);
    }

    #[test]
    fn force_complete_resolves_out_of_order() {
        let mut server = server();
        let first = server
            .submit(ServerCall::Toggle {
                id: TodoId(1),
                done: true,
            })
            .unwrap();
        let second = server
            .submit(ServerCall::Toggle {
                id: TodoId(1),
                done: false,
            })
            .unwrap();

        let done = server.force_complete(second).unwrap();
        assert_eq!(done.ticket, second);
        assert_eq!(server.in_flight_tickets(), vec![first]);
        // Clock did not move.
        assert_eq!(server.now(), SimTime::ZERO);
    }

    #[test]
    fn comment_ids_are_sequential_and_store_grows_at_completion() {
        let mut server = server();
        server
            .submit(ServerCall::PostComment {
                text: "first".into(),
            })
            .unwrap();
        assert!(server.comments().is_empty(), "mutation waits for latency");

        server.advance_until_idle();
        server
            .submit(ServerCall::PostComment {
                text: "  second  ".into(),
            })
            .unwrap();
        server.advance_until_idle();

        let comments = server.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, CommentId(1));
        assert_eq!(comments[1].id, CommentId(2));
        assert_eq!(comments[1].text, "second");
        assert_eq!(comments[1].posted_at, SimTime::from_millis(2000));
    }

    #[test]
    fn doomed_comment_is_never_stored() {
        let mut server = server();
        server.set_fail_mode(true);
        server
            .submit(ServerCall::PostComment {
                text: "hello".into(),
            })
            .unwrap();
        server.advance_until_idle();
        assert!(server.comments().is_empty());
    }

    #[test]
    fn chat_replies_cycle_deterministically() {
        let mut server = server();
        for text in ["hi", "tell me more"] {
            server
                .submit(ServerCall::ChatSend { text: text.into() })
                .unwrap();
            server.advance_until_idle();
        }
        let transcript = server.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[1].role, ChatRole::Assistant);
        assert_eq!(transcript[1].text, CHAT_REPLIES[0]);
        assert_eq!(transcript[3].text, CHAT_REPLIES[1]);
    }

    #[test]
    fn completions_are_ordered_by_due_then_ticket() {
        let mut server = server();
        // 1000ms comment submitted first, 800ms toggle second: the toggle
        // falls due first and must come back first.
        server
            .submit(ServerCall::PostComment {
                text: "slow".into(),
            })
            .unwrap();
        server
            .submit(ServerCall::Toggle {
                id: TodoId(1),
                done: true,
            })
            .unwrap();

        let done = server.advance(Duration::from_millis(1000));
        assert_eq!(done.len(), 2);
        assert!(matches!(done[0].reply, Ok(ServerReply::ToggleAck { .. })));
        assert!(matches!(done[1].reply, Ok(ServerReply::Comment(_))));
        // Stamped at their due instants, not at the observation instant.
        assert_eq!(done[0].finished_at, SimTime::from_millis(800));
        assert_eq!(done[1].finished_at, SimTime::from_millis(1000));
    }

    #[test]
    fn persist_order_replaces_the_item_store() {
        let mut server = SimServer::default().with_items(vec![
            SortableItem {
                id: crate::types::ItemId(1),
                text: "a".into(),
                order: 0,
            },
            SortableItem {
                id: crate::types::ItemId(2),
                text: "b".into(),
                order: 1,
            },
        ]);
        let reordered = vec![
            SortableItem {
                id: crate::types::ItemId(2),
                text: "b".into(),
                order: 0,
            },
            SortableItem {
                id: crate::types::ItemId(1),
                text: "a".into(),
                order: 1,
            },
        ];
        server
            .submit(ServerCall::PersistOrder {
                items: reordered.clone(),
            })
            .unwrap();
        server.advance_until_idle();
        assert_eq!(server.items(), reordered.as_slice());
    }
}
