#![forbid(unsafe_code)]

//! One-shot fault injection.
//!
//! Demos and tests arm the injector to force the next faultable server
//! call to fail. The one-shot behavior is a named policy with an explicit
//! `arm_once` / `is_armed` / `consume` contract rather than a flag that
//! clears itself somewhere inside the server:
//!
//! 1. `arm_once()` arms the switch.
//! 2. The next faultable submission calls `consume()`, which reports
//!    `true` exactly once and disarms.
//! 3. Later submissions see a disarmed switch and proceed normally.
//!
//! Consumption happens at submit time, so "the next call fails" is a
//! well-defined statement even while earlier calls are still in flight.

/// One-shot switch dooming the next faultable server call.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    armed: bool,
}

impl FaultInjector {
    /// A disarmed injector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the switch. The next call to [`consume`](Self::consume) fires.
    ///
    /// Arming an already-armed switch is a no-op; the switch never stacks.
    pub fn arm_once(&mut self) {
        self.armed = true;
    }

    /// Disarm without consuming.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether the switch is currently armed.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consume the switch: returns `true` and disarms if armed.
    pub fn consume(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disarmed() {
        let fault = FaultInjector::new();
        assert!(!fault.is_armed());
    }

    #[test]
    fn consume_fires_exactly_once() {
        let mut fault = FaultInjector::new();
        fault.arm_once();
        assert!(fault.is_armed());
        assert!(fault.consume());
        assert!(!fault.is_armed());
        assert!(!fault.consume());
    }

    #[test]
    fn arming_does_not_stack() {
        let mut fault = FaultInjector::new();
        fault.arm_once();
        fault.arm_once();
        assert!(fault.consume());
        assert!(!fault.consume());
    }

    #[test]
    fn disarm_clears_without_firing() {
        let mut fault = FaultInjector::new();
        fault.arm_once();
        fault.disarm();
        assert!(!fault.consume());
    }
}
