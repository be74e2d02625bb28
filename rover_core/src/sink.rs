//! Change-only writes to the actuator.

use rover_traits::{Actuator, DriveSignal, Side};

use crate::error::RoverError;
use crate::hw_error::map_hw_error;

/// Result of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub written: u8,
    pub failed: u8,
}

impl FlushReport {
    pub fn ok(self) -> bool {
        self.failed == 0
    }
}

/// Wraps an actuator and remembers the last signal accepted per side.
///
/// A failed write leaves the remembered value untouched, so the same signal
/// is retried on the next flush.
pub struct ActuatorSink<A: Actuator> {
    actuator: A,
    last: [Option<DriveSignal>; 2],
}

impl<A: Actuator> ActuatorSink<A> {
    pub fn new(actuator: A) -> Self {
        Self {
            actuator,
            last: [None; 2],
        }
    }

    fn write(&mut self, side: Side, signal: DriveSignal) -> Result<(), RoverError> {
        match self.actuator.apply(side, signal) {
            Ok(()) => {
                self.last[side.index()] = Some(signal);
                Ok(())
            }
            Err(e) => {
                let mapped = map_hw_error(e.as_ref());
                tracing::warn!(side = side.name(), error = %mapped, "actuator write failed");
                Err(mapped)
            }
        }
    }

    /// Write each side whose signal differs from the last accepted one.
    pub fn flush(&mut self, signals: [DriveSignal; 2]) -> FlushReport {
        let mut report = FlushReport::default();
        for side in Side::BOTH {
            let signal = signals[side.index()];
            if self.last[side.index()] == Some(signal) {
                continue;
            }
            match self.write(side, signal) {
                Ok(()) => report.written += 1,
                Err(_) => report.failed += 1,
            }
        }
        report
    }

    /// Write both sides regardless of what was last sent.
    pub fn force(&mut self, signals: [DriveSignal; 2]) -> FlushReport {
        self.last = [None; 2];
        self.flush(signals)
    }

    pub fn release(&mut self) -> Result<(), RoverError> {
        self.actuator
            .release()
            .map_err(|e| map_hw_error(e.as_ref()))
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}
