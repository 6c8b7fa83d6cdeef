#![forbid(unsafe_code)]

//! Scenario transcripts: JSONL with a stable schema and content checksums.
//!
//! Every scripted scenario emits one event per observable step. Because
//! the engine is deterministic under a scripted clock, identical scripts
//! produce byte-identical transcripts; CI compares checksums instead of
//! eyeballing frames.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"start","scenario":"rapid_burst","at_ms":0}
//! {"event":"dispatch","record":1,"seq":1,"target":"rapid-toggle","at_ms":0}
//! {"event":"frame","state":{...},"checksum":"h64:...","at_ms":0}
//! {"event":"resolve","record":1,"outcome":"committed","at_ms":800}
//! {"event":"notice","text":"simulated server error: update failed","at_ms":800}
//! {"event":"complete","frames":7,"checksum":"h64:...","at_ms":2600}
//! ```

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Checksum prefix naming the (non-cryptographic) 64-bit content hash.
const CHECKSUM_PREFIX: &str = "h64:";

/// Deterministic content checksum of a text blob.
pub fn content_checksum(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let hash = hasher.finish();
    format!("{CHECKSUM_PREFIX}{hash:016x}")
}

/// One transcript line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TranscriptEvent {
    Start {
        scenario: String,
        at_ms: u64,
    },
    Dispatch {
        record: u64,
        seq: u64,
        target: String,
        at_ms: u64,
    },
    /// A dispatch the engine refused (single-flight).
    Refused {
        reason: String,
        at_ms: u64,
    },
    Frame {
        state: serde_json::Value,
        checksum: String,
        at_ms: u64,
    },
    Resolve {
        record: u64,
        outcome: String,
        at_ms: u64,
    },
    Notice {
        text: String,
        at_ms: u64,
    },
    Complete {
        frames: usize,
        checksum: String,
        at_ms: u64,
    },
}

/// An ordered event log for one scenario run.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    events: Vec<TranscriptEvent>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TranscriptEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TranscriptEvent] {
        &self.events
    }

    /// Render as JSONL, one event per line.
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            // Serialization of these shapes cannot fail; fall back to an
            // empty object rather than poisoning the transcript.
            let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Checksum of the rendered JSONL.
    pub fn checksum(&self) -> String {
        content_checksum(&self.to_jsonl())
    }
}
