#![forbid(unsafe_code)]

//! Named reconciliation policies.
//!
//! The source demos behave differently per widget; those differences are
//! kept as explicit, named policies instead of being unified:
//!
//! - [`FlightPolicy`]: may several actions against one logical target be
//!   pending at once? The rapid-fire demo says yes on purpose; the
//!   toggle-by-id and reorder demos say no.
//! - [`FailurePolicy`]: does a failed action vanish (auto-revert) or stay
//!   visible with retry/discard affordances (comment feed)?
//! - [`UpdateMode`]: optimistic overlay on, or classic
//!   wait-for-confirmation display for the comparison demos.

use std::fmt;

/// How many actions may be pending against one logical target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlightPolicy {
    /// At most one pending action per target; further dispatches are
    /// rejected until the in-flight one resolves.
    #[default]
    Single,
    /// Any number of concurrently pending actions per target; convergence
    /// relies on the sequence discipline.
    Multi,
}

/// What happens to a record when its confirming operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailurePolicy {
    /// Discard the record immediately; the overlay falls back to the
    /// confirmed state and a transient notice is raised.
    #[default]
    AutoRevert,
    /// Keep the record, marked failed, visible in the overlay with retry
    /// and discard affordances.
    KeepVisible,
}

/// Whether the displayed state runs ahead of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateMode {
    /// Update-now, reconcile-later: the overlay folds pending records
    /// onto the confirmed state.
    #[default]
    Optimistic,
    /// Wait-for-confirmation: the display equals the confirmed state and
    /// the caller gates input on per-target busy state.
    Confirm,
}

/// Logical identity an action aims at.
///
/// Sequence comparisons, single-flight gating, and stale-commit rejection
/// are all scoped per target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Target(String);

impl Target {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Target {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for Target {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_conservative_choices() {
        assert_eq!(FlightPolicy::default(), FlightPolicy::Single);
        assert_eq!(FailurePolicy::default(), FailurePolicy::AutoRevert);
        assert_eq!(UpdateMode::default(), UpdateMode::Optimistic);
    }

    #[test]
    fn targets_compare_by_key() {
        assert_eq!(Target::from("todo-1"), Target::new("todo-1"));
        assert_ne!(Target::from("todo-1"), Target::from("todo-2"));
    }
}
