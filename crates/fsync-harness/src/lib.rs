#![forbid(unsafe_code)]

//! FrankenSync Harness
//!
//! Deterministic scenario infrastructure for the demos:
//!
//! - [`Scenario`] - couples a widget dispatcher with a simulated server
//!   and runs scripted steps under the simulated clock
//! - [`Transcript`] - JSONL event log with stable schema and content
//!   checksums, for golden comparisons in CI
//! - [`typewriter`] - presentation-only text reveal for chat replies
//!
//! The `fsync-harness` binary (`src/main.rs`) is the showcase: it runs
//! each demo against the wall clock at a compressed time scale and logs
//! every observable step through `tracing`.

pub mod scenario;
pub mod transcript;
pub mod typewriter;

pub use scenario::Scenario;
pub use transcript::{Transcript, TranscriptEvent, content_checksum};
