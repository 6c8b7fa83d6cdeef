#![forbid(unsafe_code)]

//! The widget seam.
//!
//! A widget is a thin configuration of the engine: it supplies a
//! confirmed-state shape, a tagged action type, a pure reducer, an
//! authoritative-merge function, a target key, its policies, and the
//! encoding to and from the server's operation surface. All
//! reconciliation logic lives in the dispatcher; a [`Reconcile`]
//! implementation holds none of its own.

use crate::policy::{FailurePolicy, FlightPolicy, Target};
use fsync_backend::{ServerCall, ServerReply};
use fsync_core::record::{ActionRecord, RecordId, RecordStatus, Seq};

/// Record bookkeeping handed to the reducer alongside the action.
///
/// Most reducers ignore it; the comment feed uses the status to tag
/// optimistic entries as pending or failed.
#[derive(Debug, Clone, Copy)]
pub struct RecordMeta {
    pub id: RecordId,
    pub seq: Seq,
    pub status: RecordStatus,
    pub attempt: u32,
}

impl RecordMeta {
    pub fn of<A>(record: &ActionRecord<A>) -> Self {
        Self {
            id: record.id,
            seq: record.seq,
            status: record.status,
            attempt: record.attempt,
        }
    }
}

/// One widget's configuration of the reconciliation engine.
pub trait Reconcile {
    /// The confirmed-state shape.
    type State: Clone;
    /// The tagged action payload.
    type Action: Clone;
    /// The authoritative payload decoded from a successful reply.
    type Reply;

    /// How many actions may be pending per target at once.
    fn flight() -> FlightPolicy {
        FlightPolicy::Single
    }

    /// What happens to a record whose confirming operation fails.
    fn failure() -> FailurePolicy {
        FailurePolicy::AutoRevert
    }

    /// The logical identity this action aims at.
    fn target(action: &Self::Action) -> Target;

    /// Pure optimistic reducer: fold one record into the working state.
    ///
    /// Must be deterministic and side-effect free; the overlay may replay
    /// it any number of times against the same inputs.
    fn apply(state: &mut Self::State, action: &Self::Action, meta: &RecordMeta);

    /// Merge an authoritative reply into the confirmed state.
    fn commit(state: &mut Self::State, reply: Self::Reply);

    /// Encode the action for the simulated server.
    fn call(action: &Self::Action) -> ServerCall;

    /// Decode a successful reply. `None` means the reply belongs to a
    /// different operation kind and cannot be merged.
    fn decode(reply: ServerReply) -> Option<Self::Reply>;
}
