#![forbid(unsafe_code)]

//! Simulated time.
//!
//! The engine runs on a single-threaded cooperative loop where the only
//! thing that makes time pass is an explicit call to [`SimClock::advance`].
//! Tests script the clock directly; the showcase binary paces it against
//! the wall clock. Nothing in the engine reads `std::time::Instant`.

use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// A point in simulated time, in milliseconds since scenario start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SimTime(u64);

impl SimTime {
    /// Scenario start.
    pub const ZERO: SimTime = SimTime(0);

    /// Construct from milliseconds since scenario start.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since scenario start.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// The instant `d` after this one (saturating).
    #[must_use]
    pub fn after(self, d: Duration) -> SimTime {
        SimTime(self.0.saturating_add(d.as_millis() as u64))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    #[must_use]
    pub fn since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, d: Duration) -> SimTime {
        self.after(d)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}

/// Owner of the current simulated instant.
///
/// The backend holds one of these; everything else receives `SimTime`
/// values and never advances time itself.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: SimTime,
}

impl SimClock {
    /// A clock at [`SimTime::ZERO`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The current simulated instant.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Advance by `d` and return the new instant.
    pub fn advance(&mut self, d: Duration) -> SimTime {
        self.now = self.now.after(d);
        self.now
    }
}
