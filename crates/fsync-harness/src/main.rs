#![forbid(unsafe_code)]

//! FrankenSync Showcase
//!
//! Runs every demo against the wall clock at a compressed time scale,
//! logging each observable step. This binary is presentation only: all
//! correctness lives in the engine crates and their tests.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=info cargo run -p fsync-harness
//! ```

use std::thread;
use std::time::Duration;

use fsync_backend::{
    ItemId, ServerCall, ServerReply, SimServer, SortableItem, TodoId, TodoItem,
};
use fsync_harness::typewriter;
use fsync_runtime::{Dispatcher, Reconcile, Resolution, UpdateMode};
use fsync_widgets::chat_turn::{ChatAction, ChatTurn};
use fsync_widgets::comment_feed::{CommentAction, CommentFeed};
use fsync_widgets::rapid_toggle::{ClickMonitor, RapidToggle, flip_intent};
use fsync_widgets::sortable_list::{SortableList, move_down, move_up};
use fsync_widgets::todo_list::{TodoList, toggle_intent};
use fsync_widgets::{Delivery, TagSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulated milliseconds per real millisecond.
const TIME_SCALE: u32 = 8;

/// Clock tick used while waiting on in-flight calls.
const TICK: Duration = Duration::from_millis(100);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("FrankenSync showcase: optimistic vs wait-for-confirmation");
    demo_toggle_comparison();
    demo_comment_feed();
    demo_sortable_list();
    demo_rapid_fire();
    demo_chat_turn();
    demo_analysis();
    info!("showcase complete");
}

/// Advance simulated time in ticks, pacing against the wall clock, and
/// resolve completions as they fall due. Returns once the server idles.
fn settle<R: Reconcile>(
    server: &mut SimServer,
    dispatcher: &mut Dispatcher<R>,
) -> Vec<Resolution<R::Action>> {
    let mut resolutions = Vec::new();
    while server.in_flight_count() > 0 {
        thread::sleep(TICK / TIME_SCALE);
        for completion in server.advance(TICK) {
            if let Some(res) = dispatcher.resolve(completion) {
                resolutions.push(res);
            }
        }
    }
    for notice in dispatcher.take_notices() {
        info!(notice = %notice.text, "transient notice");
    }
    resolutions
}

fn seed_todos() -> Vec<TodoItem> {
    vec![
        TodoItem::new(TodoId(1), "prepare slides"),
        TodoItem::new(TodoId(2), "rehearse the demo"),
        TodoItem::new(TodoId(3), "pack the adapter"),
    ]
}

fn demo_toggle_comparison() {
    info!("--- todo list: wait-for-confirmation, then optimistic ---");
    let todos = seed_todos();

    // Classic mode: the checkbox does nothing visible until the server acks.
    let mut server = SimServer::default().with_todos(todos.clone());
    let mut d = Dispatcher::<TodoList>::new(todos.clone()).with_mode(UpdateMode::Confirm);
    let action = toggle_intent(&d.display(), TodoId(1)).expect("seeded todo");
    d.dispatch(&mut server, action).expect("first dispatch");
    info!(done = d.display()[0].done, "confirm mode: right after the click");
    settle(&mut server, &mut d);
    info!(done = d.display()[0].done, "confirm mode: after the ack");

    // Optimistic mode with a doomed call: instant flip, then rollback.
    let mut server = SimServer::default().with_todos(todos.clone());
    let mut d = Dispatcher::<TodoList>::new(todos);
    server.set_fail_mode(true);
    let action = toggle_intent(&d.display(), TodoId(1)).expect("seeded todo");
    d.dispatch(&mut server, action).expect("first dispatch");
    info!(done = d.display()[0].done, "optimistic mode: right after the click");
    settle(&mut server, &mut d);
    info!(done = d.display()[0].done, "optimistic mode: after the rollback");
}

fn demo_comment_feed() {
    info!("--- comment feed: visible failure with retry ---");
    let mut server = SimServer::default();
    let mut d = Dispatcher::<CommentFeed>::new(Vec::new());
    let mut tags = TagSource::new();

    d.dispatch(
        &mut server,
        CommentAction::Post {
            tag: tags.next(),
            text: "optimistic updates feel instant".to_string(),
        },
    )
    .expect("post");
    settle(&mut server, &mut d);

    server.set_fail_mode(true);
    let failed = d
        .dispatch(
            &mut server,
            CommentAction::Post {
                tag: tags.next(),
                text: "this one is doomed".to_string(),
            },
        )
        .expect("post");
    settle(&mut server, &mut d);
    let feed = d.display();
    info!(
        entries = feed.len(),
        failed = feed.iter().filter(|e| e.delivery == Delivery::Failed).count(),
        "feed after the doomed post"
    );

    d.retry(&mut server, failed).expect("retry");
    settle(&mut server, &mut d);
    let feed = d.display();
    info!(
        entries = feed.len(),
        confirmed = feed
            .iter()
            .filter(|e| e.delivery == Delivery::Confirmed)
            .count(),
        "feed after the retry"
    );
}

fn demo_sortable_list() {
    info!("--- reorderable list: optimistic moves ---");
    let items: Vec<SortableItem> = ["alpha", "beta", "gamma", "delta"]
        .iter()
        .enumerate()
        .map(|(i, text)| SortableItem {
            id: ItemId(i as u32 + 1),
            text: text.to_string(),
            order: i as u32,
        })
        .collect();
    let mut server = SimServer::default().with_items(items.clone());
    let mut d = Dispatcher::<SortableList>::new(items);

    let action = move_down(&d.display(), 0).expect("movable");
    d.dispatch(&mut server, action).expect("move");
    info!(order = ?texts(&d.display()), "right after the first move");
    settle(&mut server, &mut d);

    let action = move_up(&d.display(), 2).expect("movable");
    d.dispatch(&mut server, action).expect("move");
    settle(&mut server, &mut d);
    info!(order = ?texts(&d.display()), "settled order");
}

fn texts(items: &[SortableItem]) -> Vec<String> {
    items.iter().map(|i| i.text.clone()).collect()
}

fn demo_rapid_fire() {
    info!("--- rapid-fire toggle: convergence under a click burst ---");
    let mut server = SimServer::default();
    let mut d = Dispatcher::<RapidToggle>::new(false);
    let mut monitor = ClickMonitor::new();

    for _ in 0..5 {
        let action = flip_intent(d.display());
        let id = d.dispatch(&mut server, action).expect("multi-flight");
        monitor.on_dispatch(id, action, server.now());
        thread::sleep(Duration::from_millis(15));
    }
    info!(
        displayed = d.display(),
        pending = monitor.pending_count(),
        "after the burst"
    );

    for res in settle(&mut server, &mut d) {
        monitor.on_resolution(&res);
    }
    info!(
        displayed = d.display(),
        confirmed = *d.confirmed(),
        attempts = ?monitor
            .recent(10)
            .iter()
            .map(|a| format!("{}->{}", a.record, if a.target_state { "on" } else { "off" }))
            .collect::<Vec<_>>(),
        "converged"
    );
}

fn demo_chat_turn() {
    info!("--- chat turn: optimistic message, revealed reply ---");
    let mut server = SimServer::default();
    let mut d = Dispatcher::<ChatTurn>::new(Vec::new());
    let mut tags = TagSource::new();

    d.dispatch(
        &mut server,
        ChatAction::Send {
            tag: tags.next(),
            text: "what makes an interface feel fast?".to_string(),
        },
    )
    .expect("send");
    info!(entries = d.display().len(), "user message visible at once");
    settle(&mut server, &mut d);

    let transcript = d.display();
    let reply = &transcript.last().expect("reply").text;
    // Presentation only: reveal the confirmed reply at 40 chars/sec,
    // compressed like everything else in the showcase.
    let mut elapsed = Duration::ZERO;
    while !typewriter::is_complete(reply, elapsed, 40) {
        elapsed += TICK;
        thread::sleep(TICK / TIME_SCALE);
    }
    info!(reply = %reply, "reply fully revealed");
}

fn demo_analysis() {
    info!("--- artificial delay: deliberately slow analysis ---");
    let mut server = SimServer::default();
    let delay = Duration::from_millis(3000);
    server
        .submit(ServerCall::Analyze { delay })
        .expect("analyze never rejects");

    let mut waited = Duration::ZERO;
    loop {
        let completions = server.advance(TICK);
        waited += TICK;
        if let Some(completion) = completions.into_iter().next() {
            if let Ok(ServerReply::Analysis(report)) = completion.reply {
                info!(
                    score = report.score,
                    summary = %report.summary,
                    details = report.details.len(),
                    "analysis complete"
                );
            }
            break;
        }
        let percent = (waited.as_millis() * 100 / delay.as_millis()).min(99) as u64;
        info!(percent, "analyzing");
        thread::sleep(TICK / TIME_SCALE);
    }
}
