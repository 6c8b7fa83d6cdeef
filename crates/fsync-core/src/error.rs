#![forbid(unsafe_code)]

//! Error taxonomy for the simulated server.
//!
//! Two failure kinds exist, and they are handled differently by every
//! widget policy:
//!
//! | Error | When | Retryable |
//! |-------|------|-----------|
//! | [`ServerError::Validation`] | At submit, before any latency | Not as-is; input must change |
//! | [`ServerError::Simulated`] | After the operation's latency | Yes |
//!
//! The dispatcher is the sole handler. It translates both into either a
//! silent rollback or a persisted failed record; neither is ever fatal.

use std::fmt;

/// A rejected simulated-server operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerError {
    /// Caller input rejected before any latency was incurred.
    Validation(String),
    /// Injected transient fault, armed through the fault switch.
    Simulated(String),
}

impl ServerError {
    /// Whether re-submitting the same payload can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServerError::Simulated(_))
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Validation(msg) => write!(f, "validation rejected: {msg}"),
            ServerError::Simulated(msg) => write!(f, "simulated server error: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {}

/// Result type for simulated-server operations.
pub type ServerResult<T> = Result<T, ServerError>;
