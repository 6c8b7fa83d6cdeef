#![forbid(unsafe_code)]

//! FrankenSync Runtime
//!
//! The reconciliation engine: dispatchers that show a state change
//! immediately while the confirming operation is still in flight, and the
//! pure overlay that makes that display deterministic.
//!
//! # Key Components
//!
//! - [`Reconcile`] - the widget seam: state shape, action type, reducer,
//!   merge, target key, policies, call encoding
//! - [`Dispatcher`] - dispatch/resolve/retry/discard with the
//!   sequence-number discipline and the stale-commit guard
//! - [`overlay`] - the pure fold from confirmed state plus pending
//!   records to displayed state
//! - [`FlightPolicy`] / [`FailurePolicy`] / [`UpdateMode`] - the named
//!   behavioral knobs the demos differ on
//!
//! # How it fits in the system
//! The runtime sits between the widgets (`fsync-widgets`), which are pure
//! configurations, and the backend (`fsync-backend`), which is the only
//! source of asynchrony. Correctness under out-of-order completion comes
//! from sequence comparison, not locks: the dispatcher commits only
//! replies newer than the target's committed floor, and the overlay skips
//! pending records at or below it.

pub mod dispatcher;
pub mod overlay;
pub mod policy;
pub mod reconcile;

pub use dispatcher::{DispatchError, Dispatcher, Notice, Resolution, ResolveOutcome};
pub use policy::{FailurePolicy, FlightPolicy, Target, UpdateMode};
pub use reconcile::{Reconcile, RecordMeta};
