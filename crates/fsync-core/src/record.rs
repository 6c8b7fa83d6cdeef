#![forbid(unsafe_code)]

//! Action records and the pending-record store.
//!
//! Every user intent becomes an [`ActionRecord`] the moment it is
//! dispatched. The record carries a monotonically increasing sequence
//! number allocated by its [`RecordStore`]; the overlay folds records in
//! sequence order, and the dispatcher compares sequence numbers against
//! the highest committed one per target to reject stale commits.
//!
//! # Design Invariants
//!
//! 1. **Monotonic sequences**: each `issue` allocates `seq` one greater
//!    than the highest issued so far by that store.
//! 2. **Stable ordering**: the store keeps records sorted by `seq`
//!    (insertion order); iteration is overlay order.
//! 3. **Single transition**: a record leaves `Pending` at most once,
//!    either by removal (success or rollback) or by `fail`.

use crate::clock::SimTime;
use crate::error::ServerError;

/// Dispatch sequence number. Allocation order, not completion order.
pub type Seq = u64;

/// Opaque identity of one action attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordId(u64);

impl RecordId {
    /// Raw value, for logs and transcripts.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Where an action attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordStatus {
    /// Dispatched, confirmation outstanding.
    Pending,
    /// Confirmed by the server. Set on the record as it is handed to
    /// observers; succeeded records never stay in the store.
    Succeeded,
    /// Rejected by the server. Kept in the store only under the
    /// visible-failure policy.
    Failed,
}

/// A tracked attempt to change state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRecord<A> {
    pub id: RecordId,
    pub seq: Seq,
    pub action: A,
    pub status: RecordStatus,
    pub issued_at: SimTime,
    /// 1 for a first dispatch, incremented by each retry of the payload.
    pub attempt: u32,
    /// The rejection that moved this record to `Failed`, if any.
    pub error: Option<ServerError>,
}

impl<A> ActionRecord<A> {
    pub fn is_pending(&self) -> bool {
        self.status == RecordStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.status == RecordStatus::Failed
    }
}

/// Ordered collection of in-flight action records.
///
/// Owned exclusively by a dispatcher instance. Records are stored in
/// sequence order; removal keeps the order of the survivors.
#[derive(Debug, Clone)]
pub struct RecordStore<A> {
    records: Vec<ActionRecord<A>>,
    next_seq: Seq,
    next_id: u64,
}

impl<A> Default for RecordStore<A> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_seq: 1,
            next_id: 1,
        }
    }
}

impl<A> RecordStore<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `Pending` record for a first dispatch.
    pub fn issue(&mut self, action: A, now: SimTime) -> RecordId {
        self.issue_attempt(action, now, 1)
    }

    /// Create a `Pending` record for a retry of an earlier payload.
    pub fn issue_attempt(&mut self, action: A, now: SimTime, attempt: u32) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(ActionRecord {
            id,
            seq,
            action,
            status: RecordStatus::Pending,
            issued_at: now,
            attempt,
            error: None,
        });
        id
    }

    /// All live records in sequence order.
    pub fn records(&self) -> &[ActionRecord<A>] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&ActionRecord<A>> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Remove and return a record, preserving the order of the rest.
    pub fn take(&mut self, id: RecordId) -> Option<ActionRecord<A>> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    /// Move a `Pending` record to `Failed`, retaining the rejection.
    ///
    /// Returns `false` if the record is missing or has already left
    /// `Pending`.
    pub fn fail(&mut self, id: RecordId, error: ServerError) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(rec) if rec.status == RecordStatus::Pending => {
                rec.status = RecordStatus::Failed;
                rec.error = Some(error);
                true
            }
            _ => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_pending()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest sequence number issued so far, 0 if none.
    pub fn last_issued_seq(&self) -> Seq {
        self.next_seq - 1
    }
}
