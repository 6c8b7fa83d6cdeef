#![forbid(unsafe_code)]

//! Deterministic scenario driver.
//!
//! A [`Scenario`] couples one [`SimServer`] with one dispatcher and runs a
//! scripted sequence of dispatches, clock advances, and forced
//! completions, recording a [`Transcript`] as it goes. No wall clock, no
//! threads: identical scripts produce identical transcripts.

use crate::transcript::{Transcript, TranscriptEvent, content_checksum};
use fsync_backend::{ServerConfig, SimServer, Ticket};
use fsync_core::RecordId;
use fsync_runtime::{
    DispatchError, Dispatcher, Reconcile, Resolution, ResolveOutcome, UpdateMode,
};
use serde::Serialize;
use std::time::Duration;

fn outcome_name(outcome: ResolveOutcome) -> &'static str {
    match outcome {
        ResolveOutcome::Committed => "committed",
        ResolveOutcome::Stale => "stale",
        ResolveOutcome::RolledBack => "rolled_back",
        ResolveOutcome::MarkedFailed => "marked_failed",
    }
}

/// A scripted run of one widget against one simulated server.
pub struct Scenario<R: Reconcile>
where
    R::State: Serialize,
{
    server: SimServer,
    dispatcher: Dispatcher<R>,
    transcript: Transcript,
    frame_checksums: Vec<String>,
}

impl<R: Reconcile> Scenario<R>
where
    R::State: Serialize,
{
    /// A scenario over a default server.
    pub fn new(name: &str, confirmed: R::State) -> Self {
        Self::with_server(name, SimServer::new(ServerConfig::default()), confirmed)
    }

    /// A scenario over a pre-seeded server.
    pub fn with_server(name: &str, server: SimServer, confirmed: R::State) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEvent::Start {
            scenario: name.to_string(),
            at_ms: server.now().as_millis(),
        });
        let mut scenario = Self {
            server,
            dispatcher: Dispatcher::new(confirmed),
            transcript,
            frame_checksums: Vec::new(),
        };
        scenario.capture();
        scenario
    }

    /// Switch the dispatcher's update mode mid-script.
    pub fn set_mode(&mut self, mode: UpdateMode) {
        self.dispatcher.set_mode(mode);
        self.capture();
    }

    pub fn server(&self) -> &SimServer {
        &self.server
    }

    pub fn dispatcher(&self) -> &Dispatcher<R> {
        &self.dispatcher
    }

    pub fn display(&self) -> R::State {
        self.dispatcher.display()
    }

    /// Arm or disarm the server's one-shot fault switch.
    pub fn set_fail_mode(&mut self, fail: bool) {
        self.server.set_fail_mode(fail);
    }

    /// Dispatch one action, logging the attempt and the resulting frame.
    pub fn dispatch(&mut self, action: R::Action) -> Result<RecordId, DispatchError> {
        let at_ms = self.server.now().as_millis();
        let result = self.dispatcher.dispatch(&mut self.server, action);
        match &result {
            Ok(id) => {
                let target = self
                    .dispatcher
                    .records()
                    .iter()
                    .find(|r| r.id == *id)
                    .map(|r| R::target(&r.action).to_string())
                    .unwrap_or_default();
                self.transcript.push(TranscriptEvent::Dispatch {
                    record: id.as_u64(),
                    seq: self.dispatcher.last_issued_seq(),
                    target,
                    at_ms,
                });
            }
            Err(err) => {
                self.transcript.push(TranscriptEvent::Refused {
                    reason: err.to_string(),
                    at_ms,
                });
            }
        }
        self.drain_notices();
        self.capture();
        result
    }

    /// Retry a failed record.
    pub fn retry(&mut self, id: RecordId) -> Result<RecordId, DispatchError> {
        let at_ms = self.server.now().as_millis();
        let result = self.dispatcher.retry(&mut self.server, id);
        match &result {
            Ok(new_id) => self.transcript.push(TranscriptEvent::Dispatch {
                record: new_id.as_u64(),
                seq: self.dispatcher.last_issued_seq(),
                target: "retry".to_string(),
                at_ms,
            }),
            Err(err) => self.transcript.push(TranscriptEvent::Refused {
                reason: err.to_string(),
                at_ms,
            }),
        }
        self.drain_notices();
        self.capture();
        result
    }

    /// Discard a failed record.
    pub fn discard(&mut self, id: RecordId) -> bool {
        let removed = self.dispatcher.discard(id);
        if removed {
            self.capture();
        }
        removed
    }

    /// Advance simulated time, resolving whatever falls due.
    pub fn advance(&mut self, dt: Duration) -> Vec<Resolution<R::Action>> {
        let completions = self.server.advance(dt);
        self.settle(completions)
    }

    /// Advance until no call is in flight.
    pub fn advance_until_idle(&mut self) -> Vec<Resolution<R::Action>> {
        let completions = self.server.advance_until_idle();
        self.settle(completions)
    }

    /// Resolve one specific in-flight call immediately (out-of-order).
    pub fn force_complete(&mut self, ticket: Ticket) -> Option<Resolution<R::Action>> {
        let completion = self.server.force_complete(ticket)?;
        let mut resolutions = self.settle(vec![completion]);
        resolutions.pop()
    }

    /// Tickets currently in flight, in submission order.
    pub fn in_flight_tickets(&self) -> Vec<Ticket> {
        self.server.in_flight_tickets()
    }

    /// Close the scenario and return its transcript.
    pub fn finish(mut self) -> Transcript {
        let at_ms = self.server.now().as_millis();
        let combined = content_checksum(&self.frame_checksums.join("\n"));
        self.transcript.push(TranscriptEvent::Complete {
            frames: self.frame_checksums.len(),
            checksum: combined,
            at_ms,
        });
        self.transcript
    }

    fn settle(
        &mut self,
        completions: Vec<fsync_backend::Completion>,
    ) -> Vec<Resolution<R::Action>> {
        let mut resolutions = Vec::new();
        for completion in completions {
            let at_ms = completion.finished_at.as_millis();
            if let Some(res) = self.dispatcher.resolve(completion) {
                self.transcript.push(TranscriptEvent::Resolve {
                    record: res.record.id.as_u64(),
                    outcome: outcome_name(res.outcome).to_string(),
                    at_ms,
                });
                self.drain_notices();
                self.capture();
                resolutions.push(res);
            }
        }
        resolutions
    }

    fn drain_notices(&mut self) {
        for notice in self.dispatcher.take_notices() {
            self.transcript.push(TranscriptEvent::Notice {
                text: notice.text,
                at_ms: notice.at.as_millis(),
            });
        }
    }

    fn capture(&mut self) {
        let state = self.dispatcher.display();
        let json = serde_json::to_value(&state).unwrap_or(serde_json::Value::Null);
        let checksum = content_checksum(&json.to_string());
        self.frame_checksums.push(checksum.clone());
        self.transcript.push(TranscriptEvent::Frame {
            state: json,
            checksum,
            at_ms: self.server.now().as_millis(),
        });
    }
}
