#![forbid(unsafe_code)]

//! Chat-turn widget: the user's message appears in the transcript
//! immediately; the canned assistant reply arrives with the confirmation.
//!
//! One turn at a time (the composer is disabled while a reply is being
//! produced), and a failed send stays visible in the transcript with a
//! retry affordance, exactly like the comment feed. How the reply text is
//! revealed on screen is presentation and lives in the harness.

use crate::{ClientTag, Delivery};
use fsync_backend::{ChatExchange, ChatMessage, ChatRole, MessageId, ServerCall, ServerReply};
use fsync_core::RecordStatus;
use fsync_runtime::{FailurePolicy, Reconcile, RecordMeta, Target};

/// One displayed transcript entry, confirmed or optimistic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatEntry {
    /// Server identity, present once confirmed.
    pub id: Option<MessageId>,
    /// Client identity, present on optimistic entries.
    pub tag: Option<ClientTag>,
    pub role: ChatRole,
    pub text: String,
    pub delivery: Delivery,
}

impl ChatEntry {
    fn confirmed(message: ChatMessage) -> Self {
        Self {
            id: Some(message.id),
            tag: None,
            role: message.role,
            text: message.text,
            delivery: Delivery::Confirmed,
        }
    }
}

/// Actions against the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChatAction {
    Send { tag: ClientTag, text: String },
}

/// The chat-turn configuration of the engine.
pub struct ChatTurn;

impl Reconcile for ChatTurn {
    type State = Vec<ChatEntry>;
    type Action = ChatAction;
    type Reply = ChatExchange;

    fn failure() -> FailurePolicy {
        FailurePolicy::KeepVisible
    }

    fn target(_action: &ChatAction) -> Target {
        Target::from("chat")
    }

    fn apply(state: &mut Vec<ChatEntry>, action: &ChatAction, meta: &RecordMeta) {
        let ChatAction::Send { tag, text } = action;
        let delivery = match meta.status {
            RecordStatus::Failed => Delivery::Failed,
            _ => Delivery::Pending,
        };
        state.push(ChatEntry {
            id: None,
            tag: Some(*tag),
            role: ChatRole::User,
            text: text.clone(),
            delivery,
        });
    }

    fn commit(state: &mut Vec<ChatEntry>, exchange: ChatExchange) {
        state.push(ChatEntry::confirmed(exchange.user));
        state.push(ChatEntry::confirmed(exchange.assistant));
    }

    fn call(action: &ChatAction) -> ServerCall {
        let ChatAction::Send { text, .. } = action;
        ServerCall::ChatSend { text: text.clone() }
    }

    fn decode(reply: ServerReply) -> Option<ChatExchange> {
        match reply {
            ServerReply::Chat(exchange) => Some(exchange),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagSource;
    use fsync_backend::SimServer;
    use fsync_runtime::{DispatchError, Dispatcher, ResolveOutcome};

    fn setup() -> (SimServer, Dispatcher<ChatTurn>, TagSource) {
        (
            SimServer::default(),
            Dispatcher::new(Vec::new()),
            TagSource::new(),
        )
    }

    fn send(tags: &mut TagSource, text: &str) -> ChatAction {
        ChatAction::Send {
            tag: tags.next(),
            text: text.to_string(),
        }
    }

    #[test]
    fn user_message_appears_pending_then_turn_confirms_with_reply() {
        let (mut server, mut d, mut tags) = setup();
        d.dispatch(&mut server, send(&mut tags, "hi there")).unwrap();

        let transcript = d.display();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[0].delivery, Delivery::Pending);

        for c in server.advance_until_idle() {
            assert_eq!(d.resolve(c).unwrap().outcome, ResolveOutcome::Committed);
        }
        let transcript = d.display();
        assert_eq!(transcript.len(), 2, "user message exactly once, plus reply");
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[0].delivery, Delivery::Confirmed);
        assert_eq!(transcript[1].role, ChatRole::Assistant);
        assert!(!transcript[1].text.is_empty());
    }

    #[test]
    fn one_turn_at_a_time() {
        let (mut server, mut d, mut tags) = setup();
        d.dispatch(&mut server, send(&mut tags, "first")).unwrap();
        let second = d.dispatch(&mut server, send(&mut tags, "second"));
        assert!(matches!(second, Err(DispatchError::InFlight(_))));
    }

    #[test]
    fn failed_send_stays_visible_and_retries_cleanly() {
        let (mut server, mut d, mut tags) = setup();
        server.set_fail_mode(true);
        let id = d.dispatch(&mut server, send(&mut tags, "hello")).unwrap();
        for c in server.advance_until_idle() {
            assert_eq!(d.resolve(c).unwrap().outcome, ResolveOutcome::MarkedFailed);
        }
        let transcript = d.display();
        assert_eq!(transcript[0].delivery, Delivery::Failed);

        d.retry(&mut server, id).unwrap();
        for c in server.advance_until_idle() {
            assert_eq!(d.resolve(c).unwrap().outcome, ResolveOutcome::Committed);
        }
        let transcript = d.display();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text, "hello");
        assert_eq!(transcript[1].role, ChatRole::Assistant);
        assert_eq!(server.transcript().len(), 2);
    }

    #[test]
    fn empty_message_is_rejected_without_latency() {
        let (mut server, mut d, mut tags) = setup();
        d.dispatch(&mut server, send(&mut tags, "  ")).unwrap();
        assert_eq!(server.in_flight_count(), 0);
        let transcript = d.display();
        assert_eq!(transcript[0].delivery, Delivery::Failed);
        assert_eq!(d.take_notices().len(), 1);
    }
}
