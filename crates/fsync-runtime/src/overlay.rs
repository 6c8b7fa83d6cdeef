#![forbid(unsafe_code)]

//! The optimistic overlay: a pure fold from confirmed state plus pending
//! records to the state actually displayed.
//!
//! # Design Invariants
//!
//! 1. **Pure**: no side effects, no I/O; recomputing with the same inputs
//!    yields the same output.
//! 2. **Dispatch order**: records fold in ascending sequence order, which
//!    is dispatch order, never completion order.
//! 3. **Supersession**: a pending record whose sequence is at or below the
//!    highest committed sequence for its target is skipped, so a stale
//!    in-flight action can never drag the display backwards.
//! 4. **Policy visibility**: failed records fold only under
//!    [`FailurePolicy::KeepVisible`]; in [`UpdateMode::Confirm`] nothing
//!    folds at all.

use crate::policy::{FailurePolicy, Target, UpdateMode};
use crate::reconcile::{Reconcile, RecordMeta};
use fsync_core::record::{ActionRecord, RecordStatus, Seq};
use std::collections::HashMap;

/// Compute the displayed state.
///
/// `committed` maps each target to the highest sequence number already
/// merged into the confirmed state; it is what makes supersession
/// decidable without mutating any record.
pub fn compute<R: Reconcile>(
    mode: UpdateMode,
    failure: FailurePolicy,
    confirmed: &R::State,
    records: &[ActionRecord<R::Action>],
    committed: &HashMap<Target, Seq>,
) -> R::State {
    let mut state = confirmed.clone();
    if mode == UpdateMode::Confirm {
        return state;
    }
    for record in records {
        if !folds::<R>(record, failure, committed) {
            continue;
        }
        R::apply(&mut state, &record.action, &RecordMeta::of(record));
    }
    state
}

/// Whether one record participates in the fold.
pub fn folds<R: Reconcile>(
    record: &ActionRecord<R::Action>,
    failure: FailurePolicy,
    committed: &HashMap<Target, Seq>,
) -> bool {
    match record.status {
        RecordStatus::Pending => {
            let floor = committed.get(&R::target(&record.action)).copied();
            !floor.is_some_and(|seq| record.seq <= seq)
        }
        RecordStatus::Failed => failure == FailurePolicy::KeepVisible,
        RecordStatus::Succeeded => false,
    }
}
