#![forbid(unsafe_code)]

//! Comment-feed widget: posts appear optimistically and failures stay
//! visible.
//!
//! Each post is its own logical target, so several posts may be in flight
//! at once. A rejected post is not rolled back: it stays in the feed,
//! tagged failed, until the user retries it or discards it. The client
//! tag carried in the action keeps a retried post rendering as the same
//! on-screen entry.

use crate::{ClientTag, Delivery};
use fsync_backend::{Comment, CommentId, ServerCall, ServerReply};
use fsync_core::{RecordStatus, SimTime};
use fsync_runtime::{Reconcile, RecordMeta, Target};

/// One displayed feed entry, confirmed or optimistic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommentEntry {
    /// Server identity, present once confirmed.
    pub id: Option<CommentId>,
    /// Client identity, present on optimistic entries.
    pub tag: Option<ClientTag>,
    pub text: String,
    pub delivery: Delivery,
    /// Server post time, present once confirmed.
    pub posted_at: Option<SimTime>,
}

impl CommentEntry {
    fn confirmed(comment: Comment) -> Self {
        Self {
            id: Some(comment.id),
            tag: None,
            text: comment.text,
            delivery: Delivery::Confirmed,
            posted_at: Some(comment.posted_at),
        }
    }
}

/// Actions against the comment feed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommentAction {
    Post { tag: ClientTag, text: String },
}

/// The comment-feed configuration of the engine.
pub struct CommentFeed;

impl Reconcile for CommentFeed {
    type State = Vec<CommentEntry>;
    type Action = CommentAction;
    type Reply = Comment;

    fn flight() -> fsync_runtime::FlightPolicy {
        fsync_runtime::FlightPolicy::Multi
    }

    fn failure() -> fsync_runtime::FailurePolicy {
        fsync_runtime::FailurePolicy::KeepVisible
    }

    fn target(action: &CommentAction) -> Target {
        let CommentAction::Post { tag, .. } = action;
        Target::new(tag.to_string())
    }

    fn apply(state: &mut Vec<CommentEntry>, action: &CommentAction, meta: &RecordMeta) {
        let CommentAction::Post { tag, text } = action;
        let delivery = match meta.status {
            RecordStatus::Failed => Delivery::Failed,
            _ => Delivery::Pending,
        };
        state.push(CommentEntry {
            id: None,
            tag: Some(*tag),
            text: text.clone(),
            delivery,
            posted_at: None,
        });
    }

    fn commit(state: &mut Vec<CommentEntry>, comment: Comment) {
        state.push(CommentEntry::confirmed(comment));
    }

    fn call(action: &CommentAction) -> ServerCall {
        let CommentAction::Post { text, .. } = action;
        ServerCall::PostComment { text: text.clone() }
    }

    fn decode(reply: ServerReply) -> Option<Comment> {
        match reply {
            ServerReply::Comment(comment) => Some(comment),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsync_backend::SimServer;
    use fsync_core::{ServerError, SimTime};
    use fsync_runtime::{Dispatcher, ResolveOutcome};

    use crate::TagSource;

    fn setup() -> (SimServer, Dispatcher<CommentFeed>, TagSource) {
        (
            SimServer::default(),
            Dispatcher::new(Vec::new()),
            TagSource::new(),
        )
    }

    fn post(tags: &mut TagSource, text: &str) -> CommentAction {
        CommentAction::Post {
            tag: tags.next(),
            text: text.to_string(),
        }
    }

    #[test]
    fn optimistic_post_is_tagged_pending_then_confirmed() {
        let (mut server, mut d, mut tags) = setup();
        d.dispatch(&mut server, post(&mut tags, "hello")).unwrap();

        let feed = d.display();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].delivery, Delivery::Pending);
        assert_eq!(feed[0].tag, Some(ClientTag(1)));
        assert!(feed[0].id.is_none());

        for c in server.advance_until_idle() {
            d.resolve(c).unwrap();
        }
        let feed = d.display();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].delivery, Delivery::Confirmed);
        assert_eq!(feed[0].id, Some(CommentId(1)));
        assert_eq!(feed[0].posted_at, Some(SimTime::from_millis(1000)));
    }

    #[test]
    fn failed_post_stays_visible_and_retry_appends_exactly_once() {
        let (mut server, mut d, mut tags) = setup();
        server.set_fail_mode(true);
        let id = d.dispatch(&mut server, post(&mut tags, "hello")).unwrap();

        for c in server.advance_until_idle() {
            assert_eq!(d.resolve(c).unwrap().outcome, ResolveOutcome::MarkedFailed);
        }
        let feed = d.display();
        assert_eq!(feed[0].delivery, Delivery::Failed);
        assert_eq!(feed[0].text, "hello");

        // Fault spent; retry keeps the same client tag for continuity.
        let retry_id = d.retry(&mut server, id).unwrap();
        assert_ne!(retry_id, id);
        let feed = d.display();
        assert_eq!(feed[0].delivery, Delivery::Pending);
        assert_eq!(feed[0].tag, Some(ClientTag(1)));

        for c in server.advance_until_idle() {
            assert_eq!(d.resolve(c).unwrap().outcome, ResolveOutcome::Committed);
        }
        let feed = d.display();
        assert_eq!(feed.len(), 1, "no duplicate after retry success");
        assert_eq!(feed[0].delivery, Delivery::Confirmed);
        assert_eq!(feed[0].text, "hello");
        assert_eq!(server.comments().len(), 1);
    }

    #[test]
    fn discarded_failure_disappears() {
        let (mut server, mut d, mut tags) = setup();
        server.set_fail_mode(true);
        let id = d.dispatch(&mut server, post(&mut tags, "hello")).unwrap();
        for c in server.advance_until_idle() {
            d.resolve(c);
        }
        assert!(d.discard(id));
        assert!(d.display().is_empty());
    }

    #[test]
    fn validation_rejects_without_latency_and_keeps_the_entry_failed() {
        let (mut server, mut d, mut tags) = setup();
        let before = server.now();

        d.dispatch(&mut server, post(&mut tags, "")).unwrap();
        d.dispatch(&mut server, post(&mut tags, "this has error in it"))
            .unwrap();

        assert_eq!(server.now(), before, "rejection incurred no latency");
        assert_eq!(server.in_flight_count(), 0);

        let feed = d.display();
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|e| e.delivery == Delivery::Failed));

        let notices = d.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(
            notices
                .iter()
                .all(|n| matches!(n.error, ServerError::Validation(_)))
        );
    }

    #[test]
    fn several_posts_fly_concurrently_in_dispatch_order() {
        let (mut server, mut d, mut tags) = setup();
        d.dispatch(&mut server, post(&mut tags, "first")).unwrap();
        d.dispatch(&mut server, post(&mut tags, "second")).unwrap();
        assert_eq!(d.pending_count(), 2);

        let feed = d.display();
        assert_eq!(feed[0].text, "first");
        assert_eq!(feed[1].text, "second");

        for c in server.advance_until_idle() {
            d.resolve(c).unwrap();
        }
        let feed = d.display();
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|e| e.delivery == Delivery::Confirmed));
        assert_eq!(server.comments().len(), 2);
    }
}
