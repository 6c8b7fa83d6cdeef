#![forbid(unsafe_code)]

//! FrankenSync Core
//!
//! Data model shared by the reconciliation engine: action records with
//! their sequence discipline, simulated time, the server error taxonomy,
//! and the one-shot fault-injection policy.
//!
//! # Key Components
//!
//! - [`ActionRecord`] / [`RecordStore`] - tracked action attempts, ordered
//!   by dispatch sequence
//! - [`SimTime`] / [`SimClock`] - simulated time, advanced explicitly
//! - [`ServerError`] - validation vs injected-fault rejection
//! - [`FaultInjector`] - named one-shot fault policy
//!
//! # Role in FrankenSync
//! `fsync-core` holds no behavior beyond bookkeeping. The backend
//! (`fsync-backend`) turns calls into delayed completions, and the
//! dispatcher (`fsync-runtime`) owns every state transition these types
//! record.

pub mod clock;
pub mod error;
pub mod fault;
pub mod record;

pub use clock::{SimClock, SimTime};
pub use error::{ServerError, ServerResult};
pub use fault::FaultInjector;
pub use record::{ActionRecord, RecordId, RecordStatus, RecordStore, Seq};
