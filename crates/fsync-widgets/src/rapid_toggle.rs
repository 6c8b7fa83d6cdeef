#![forbid(unsafe_code)]

//! Rapid-fire toggle: one checkbox, many concurrent in-flight actions.
//!
//! This widget deliberately runs multi-flight against a single logical
//! target to exercise convergence: clicks can outrun responses, responses
//! can land in any order, and the display must still always show the most
//! recently clicked value while the confirmed value converges to the
//! last successful click.
//!
//! [`ClickMonitor`] is the demo's attempt-history panel. It only observes
//! dispatch results and resolutions; nothing it stores ever feeds back
//! into the engine.

use fsync_backend::{ServerCall, ServerReply, TodoId};
use fsync_core::{RecordId, SimTime};
use fsync_runtime::{
    FlightPolicy, Reconcile, RecordMeta, Resolution, ResolveOutcome, Target,
};

/// The todo id the rapid-fire demo toggles against.
pub const RAPID_TODO: TodoId = TodoId(0);

/// Actions against the rapid-fire toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RapidAction {
    Set { done: bool },
}

/// The rapid-fire configuration of the engine.
pub struct RapidToggle;

impl Reconcile for RapidToggle {
    type State = bool;
    type Action = RapidAction;
    type Reply = bool;

    fn flight() -> FlightPolicy {
        FlightPolicy::Multi
    }

    fn target(_action: &RapidAction) -> Target {
        Target::from("rapid-toggle")
    }

    fn apply(state: &mut bool, action: &RapidAction, _meta: &RecordMeta) {
        let RapidAction::Set { done } = action;
        *state = *done;
    }

    fn commit(state: &mut bool, reply: bool) {
        *state = reply;
    }

    fn call(action: &RapidAction) -> ServerCall {
        let RapidAction::Set { done } = action;
        ServerCall::Toggle {
            id: RAPID_TODO,
            done: *done,
        }
    }

    fn decode(reply: ServerReply) -> Option<bool> {
        match reply {
            ServerReply::ToggleAck { done, .. } => Some(done),
            _ => None,
        }
    }
}

/// The click intent: flip whatever the user currently sees.
pub fn flip_intent(display: bool) -> RapidAction {
    RapidAction::Set { done: !display }
}

/// How one recorded click attempt ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttemptStatus {
    Pending,
    /// Confirmed and merged.
    Succeeded,
    /// Confirmed by the server but already superseded by a later click.
    Stale,
    /// Failed and rolled back.
    Failed,
}

/// One entry of the click history.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClickAttempt {
    pub record: RecordId,
    pub target_state: bool,
    pub issued_at: SimTime,
    pub status: AttemptStatus,
}

/// Presentation-only history of rapid-fire attempts.
#[derive(Debug, Clone, Default)]
pub struct ClickMonitor {
    attempts: Vec<ClickAttempt>,
}

impl ClickMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a dispatched click.
    pub fn on_dispatch(&mut self, record: RecordId, action: RapidAction, at: SimTime) {
        let RapidAction::Set { done } = action;
        self.attempts.push(ClickAttempt {
            record,
            target_state: done,
            issued_at: at,
            status: AttemptStatus::Pending,
        });
    }

    /// Note a resolution handed back by the dispatcher.
    pub fn on_resolution(&mut self, resolution: &Resolution<RapidAction>) {
        let status = match resolution.outcome {
            ResolveOutcome::Committed => AttemptStatus::Succeeded,
            ResolveOutcome::Stale => AttemptStatus::Stale,
            ResolveOutcome::RolledBack | ResolveOutcome::MarkedFailed => AttemptStatus::Failed,
        };
        if let Some(attempt) = self
            .attempts
            .iter_mut()
            .find(|a| a.record == resolution.record.id)
        {
            attempt.status = status;
        }
    }

    pub fn attempts(&self) -> &[ClickAttempt] {
        &self.attempts
    }

    /// The most recent `n` attempts, oldest first.
    pub fn recent(&self, n: usize) -> &[ClickAttempt] {
        let start = self.attempts.len().saturating_sub(n);
        &self.attempts[start..]
    }

    pub fn pending_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.status == AttemptStatus::Pending)
            .count()
    }

    pub fn reset(&mut self) {
        self.attempts.clear();
    }
}
