#![forbid(unsafe_code)]

//! Identical scenario scripts must produce byte-identical transcripts.

use std::time::Duration;

use fsync_backend::{SimServer, TodoId, TodoItem};
use fsync_harness::{Scenario, TranscriptEvent};
use fsync_widgets::comment_feed::{CommentAction, CommentFeed};
use fsync_widgets::rapid_toggle::{RapidToggle, flip_intent};
use fsync_widgets::todo_list::{TodoAction, TodoList};
use fsync_widgets::{ClientTag, TagSource};

fn todo_script() -> fsync_harness::Transcript {
    let server = SimServer::default().with_todos(vec![TodoItem::new(TodoId(1), "pack")]);
    let mut scenario =
        Scenario::<TodoList>::with_server("todo_rollback", server, vec![TodoItem::new(
            TodoId(1),
            "pack",
        )]);
    scenario.set_fail_mode(true);
    scenario
        .dispatch(TodoAction::Toggle {
            id: TodoId(1),
            done: true,
        })
        .unwrap();
    scenario.advance(Duration::from_millis(800));
    scenario.finish()
}

#[test]
fn identical_scripts_yield_identical_jsonl_and_checksums() {
    let a = todo_script();
    let b = todo_script();
    assert_eq!(a.to_jsonl(), b.to_jsonl());
    assert_eq!(a.checksum(), b.checksum());
}

#[test]
fn transcript_records_the_rollback_sequence() {
    let transcript = todo_script();
    let kinds: Vec<&str> = transcript
        .events()
        .iter()
        .map(|e| match e {
            TranscriptEvent::Start { .. } => "start",
            TranscriptEvent::Dispatch { .. } => "dispatch",
            TranscriptEvent::Refused { .. } => "refused",
            TranscriptEvent::Frame { .. } => "frame",
            TranscriptEvent::Resolve { .. } => "resolve",
            TranscriptEvent::Notice { .. } => "notice",
            TranscriptEvent::Complete { .. } => "complete",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "start", "frame", // initial capture
            "dispatch", "frame", // optimistic frame
            "resolve", "notice", "frame", // rollback
            "complete",
        ]
    );
}

#[test]
fn out_of_order_script_is_reproducible_and_converges() {
    let run = || {
        let mut scenario = Scenario::<RapidToggle>::new("rapid_reverse", false);
        for _ in 0..3 {
            let action = flip_intent(scenario.display());
            scenario.dispatch(action).unwrap();
        }
        for ticket in scenario.in_flight_tickets().into_iter().rev() {
            scenario.force_complete(ticket).unwrap();
            assert!(scenario.display(), "never regresses behind the last click");
        }
        assert!(*scenario.dispatcher().confirmed());
        scenario.finish()
    };
    assert_eq!(run().to_jsonl(), run().to_jsonl());
}

#[test]
fn keep_visible_retry_appears_in_the_transcript_exactly_once() {
    let mut scenario = Scenario::<CommentFeed>::new("comment_retry", Vec::new());
    let mut tags = TagSource::new();
    scenario.set_fail_mode(true);
    let id = scenario
        .dispatch(CommentAction::Post {
            tag: tags.next(),
            text: "hello".to_string(),
        })
        .unwrap();
    scenario.advance(Duration::from_millis(1000));
    scenario.retry(id).unwrap();
    scenario.advance(Duration::from_millis(1000));

    let display = scenario.display();
    assert_eq!(display.len(), 1);
    assert_eq!(display[0].tag, None, "confirmed entry, not the temp one");
    assert_ne!(display[0].tag, Some(ClientTag(1)));

    let transcript = scenario.finish();
    let resolves = transcript
        .events()
        .iter()
        .filter(|e| matches!(e, TranscriptEvent::Resolve { .. }))
        .count();
    assert_eq!(resolves, 2, "one failure, one commit");
}
