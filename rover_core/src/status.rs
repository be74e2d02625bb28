//! Tick status and session counters.

use crate::error::RoverError;

/// Outcome of one coordinator tick.
#[derive(Debug, Clone)]
pub enum TickStatus {
    /// Normal operation.
    Running,
    /// Actuator writes kept failing; both sides were forced to a commanded stop.
    FailSafe(RoverError),
}

impl TickStatus {
    pub fn is_fail_safe(&self) -> bool {
        matches!(self, TickStatus::FailSafe(_))
    }
}

/// Counters accumulated over a session, logged when it ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,
    pub commands: u64,
    /// Commands for a blocked direction, stored instead of actuated.
    pub held: u64,
    pub suspensions: u64,
    pub restores: u64,
    /// Pending restores dropped by an operator stop.
    pub cancelled_restores: u64,
    pub actuator_failures: u64,
    pub fail_safe_trips: u64,
}
