#![forbid(unsafe_code)]

//! The action dispatcher.
//!
//! One [`Dispatcher`] instance drives one widget. It owns the confirmed
//! state and the record store exclusively; nothing else mutates them. The
//! flow is:
//!
//! 1. `dispatch` allocates the next sequence number, inserts a pending
//!    record (synchronously visible to the overlay), then submits the
//!    encoded call to the backend.
//! 2. The caller advances the backend and routes each [`Completion`]
//!    back through `resolve`.
//! 3. On success the authoritative reply merges into the confirmed state
//!    and the record disappears in the same step; on failure the widget's
//!    [`FailurePolicy`] decides between silent rollback and a visible
//!    failed record with retry/discard affordances.
//!
//! # Stale commits
//!
//! Completions may arrive in any order. The dispatcher tracks the highest
//! committed sequence per target; a success whose sequence is at or below
//! that floor is dropped, never merged, so a slow early response cannot
//! overwrite the outcome of a later action. Pending records below the
//! floor are likewise skipped by the overlay (supersession), which keeps
//! the display on the most recently dispatched intent at every frame.

use crate::overlay;
use crate::policy::{FailurePolicy, FlightPolicy, Target, UpdateMode};
use crate::reconcile::Reconcile;
use fsync_backend::{Completion, ServerCall, SimServer, Ticket};
use fsync_core::record::{ActionRecord, RecordId, RecordStatus, RecordStore, Seq};
use fsync_core::{ServerError, SimTime};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// A dispatch-time refusal. Distinct from operation failure: no record is
/// created and nothing needs reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A pending action already exists for this target and the widget
    /// runs single-flight.
    InFlight(Target),
    /// Retry was asked of a record that is missing or not failed.
    NotRetryable(RecordId),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::InFlight(target) => {
                write!(f, "an action for {target} is already in flight")
            }
            DispatchError::NotRetryable(id) => {
                write!(f, "record {id} is not in a retryable state")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// What `resolve` did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveOutcome {
    /// Reply merged into the confirmed state, record removed.
    Committed,
    /// Server succeeded but a later action already committed; reply
    /// dropped, record removed.
    Stale,
    /// Operation failed under auto-revert; record removed, notice raised.
    RolledBack,
    /// Operation failed under keep-visible; record retained as failed.
    MarkedFailed,
}

/// A resolved record, handed back for observers (monitors, transcripts).
#[derive(Debug, Clone)]
pub struct Resolution<A> {
    pub record: ActionRecord<A>,
    pub outcome: ResolveOutcome,
}

/// Transient user-facing failure notice, drained by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notice {
    pub text: String,
    pub at: SimTime,
    pub error: ServerError,
}

/// Reconciliation engine for one widget.
pub struct Dispatcher<R: Reconcile> {
    mode: UpdateMode,
    confirmed: R::State,
    store: RecordStore<R::Action>,
    /// Highest committed sequence per target; the supersession floor.
    committed: HashMap<Target, Seq>,
    tickets: HashMap<Ticket, RecordId>,
    notices: Vec<Notice>,
}

impl<R: Reconcile> Dispatcher<R> {
    /// A dispatcher over the given confirmed state, in optimistic mode.
    pub fn new(confirmed: R::State) -> Self {
        Self {
            mode: UpdateMode::Optimistic,
            confirmed,
            store: RecordStore::new(),
            committed: HashMap::new(),
            tickets: HashMap::new(),
            notices: Vec::new(),
        }
    }

    /// Select the update mode at construction.
    #[must_use]
    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    /// Flip between optimistic and wait-for-confirmation display. The
    /// comparison demos do this at runtime; records in flight keep their
    /// sequence numbers and resolve normally.
    pub fn set_mode(&mut self, mode: UpdateMode) {
        self.mode = mode;
    }

    /// The last state acknowledged by the server.
    pub fn confirmed(&self) -> &R::State {
        &self.confirmed
    }

    /// The state to render right now.
    pub fn display(&self) -> R::State {
        overlay::compute::<R>(
            self.mode,
            self.effective_failure(),
            &self.confirmed,
            self.store.records(),
            &self.committed,
        )
    }

    /// Live records in sequence order.
    pub fn records(&self) -> &[ActionRecord<R::Action>] {
        self.store.records()
    }

    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }

    /// Highest sequence number this dispatcher has issued, 0 if none.
    pub fn last_issued_seq(&self) -> Seq {
        self.store.last_issued_seq()
    }

    /// Whether an action against `target` is pending. Confirm-mode
    /// callers gate input on this.
    pub fn is_busy(&self, target: &Target) -> bool {
        self.store
            .records()
            .iter()
            .any(|r| r.is_pending() && R::target(&r.action) == *target)
    }

    /// Failed records currently retained (keep-visible widgets).
    pub fn failed(&self) -> impl Iterator<Item = &ActionRecord<R::Action>> {
        self.store.records().iter().filter(|r| r.is_failed())
    }

    /// Whether this dispatcher issued the given ticket.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.tickets.contains_key(&ticket)
    }

    /// Drain queued failure notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Issue a new action: record first, then submit.
    ///
    /// A synchronous validation rejection is translated through the
    /// failure policy (the record rolls back or turns failed); it is
    /// still an `Ok` dispatch. `Err` is returned only for single-flight
    /// refusals, where no record was created at all.
    pub fn dispatch(
        &mut self,
        server: &mut SimServer,
        action: R::Action,
    ) -> Result<RecordId, DispatchError> {
        let target = R::target(&action);
        if self.effective_flight() == FlightPolicy::Single && self.is_busy(&target) {
            return Err(DispatchError::InFlight(target));
        }
        let call = R::call(&action);
        let id = self.store.issue(action, server.now());
        Ok(self.submit(server, id, call))
    }

    /// Re-dispatch a failed record's payload as a new attempt.
    pub fn retry(
        &mut self,
        server: &mut SimServer,
        id: RecordId,
    ) -> Result<RecordId, DispatchError> {
        let failed = self
            .store
            .get(id)
            .filter(|r| r.is_failed())
            .ok_or(DispatchError::NotRetryable(id))?;
        let action = failed.action.clone();
        let attempt = failed.attempt + 1;
        let target = R::target(&action);
        if self.effective_flight() == FlightPolicy::Single && self.is_busy(&target) {
            return Err(DispatchError::InFlight(target));
        }
        self.store.take(id);
        let call = R::call(&action);
        let new_id = self.store.issue_attempt(action, server.now(), attempt);
        debug!(old = %id, new = %new_id, attempt, "retrying failed record");
        Ok(self.submit(server, new_id, call))
    }

    /// Drop a failed record. Returns `false` if the record is missing or
    /// not failed (pending records cannot be discarded; the underlying
    /// call is never aborted).
    pub fn discard(&mut self, id: RecordId) -> bool {
        match self.store.get(id) {
            Some(r) if r.is_failed() => self.store.take(id).is_some(),
            _ => false,
        }
    }

    /// Route one backend completion. Returns `None` for tickets this
    /// dispatcher never issued.
    pub fn resolve(&mut self, completion: Completion) -> Option<Resolution<R::Action>> {
        let id = self.tickets.remove(&completion.ticket)?;
        match completion.reply {
            Ok(reply) => {
                let mut record = self.store.take(id)?;
                record.status = RecordStatus::Succeeded;
                let target = R::target(&record.action);
                let floor = self.committed.get(&target).copied().unwrap_or(0);
                if record.seq <= floor {
                    debug!(
                        record = %record.id,
                        seq = record.seq,
                        floor,
                        target = %target,
                        "stale commit dropped"
                    );
                    return Some(Resolution {
                        record,
                        outcome: ResolveOutcome::Stale,
                    });
                }
                match R::decode(reply) {
                    Some(decoded) => R::commit(&mut self.confirmed, decoded),
                    None => warn!(record = %record.id, "reply kind mismatch, nothing merged"),
                }
                debug!(record = %record.id, seq = record.seq, target = %target, "committed");
                self.committed.insert(target, record.seq);
                Some(Resolution {
                    record,
                    outcome: ResolveOutcome::Committed,
                })
            }
            Err(error) => self.reject(id, error, completion.finished_at),
        }
    }

    fn effective_flight(&self) -> FlightPolicy {
        // Wait-for-confirmation demos disable the control while saving.
        if self.mode == UpdateMode::Confirm {
            FlightPolicy::Single
        } else {
            R::flight()
        }
    }

    fn effective_failure(&self) -> FailurePolicy {
        if self.mode == UpdateMode::Confirm {
            FailurePolicy::AutoRevert
        } else {
            R::failure()
        }
    }

    fn submit(&mut self, server: &mut SimServer, id: RecordId, call: ServerCall) -> RecordId {
        match server.submit(call) {
            Ok(ticket) => {
                self.tickets.insert(ticket, id);
                debug!(record = %id, ticket = %ticket, "dispatched");
            }
            Err(error) => {
                // Rejected before any latency; translate immediately.
                self.reject(id, error, server.now());
            }
        }
        id
    }

    fn reject(
        &mut self,
        id: RecordId,
        error: ServerError,
        at: SimTime,
    ) -> Option<Resolution<R::Action>> {
        self.notices.push(Notice {
            text: error.to_string(),
            at,
            error: error.clone(),
        });
        match self.effective_failure() {
            FailurePolicy::AutoRevert => {
                let mut record = self.store.take(id)?;
                record.status = RecordStatus::Failed;
                record.error = Some(error);
                debug!(record = %id, "rolled back");
                Some(Resolution {
                    record,
                    outcome: ResolveOutcome::RolledBack,
                })
            }
            FailurePolicy::KeepVisible => {
                self.store.fail(id, error);
                let record = self.store.get(id)?.clone();
                debug!(record = %id, "marked failed, kept visible");
                Some(Resolution {
                    record,
                    outcome: ResolveOutcome::MarkedFailed,
                })
            }
        }
    }
}
