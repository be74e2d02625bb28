//! Test and helper mocks for rover_core.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rover_traits::{Actuator, DriveSignal, RangeSensor, Side};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared view into a [`RecordingActuator`], usable after the actuator has
/// been moved into a coordinator.
#[derive(Debug, Clone, Default)]
pub struct ActuatorTap {
    writes: Arc<Mutex<Vec<(Side, DriveSignal)>>>,
    failing: Arc<AtomicBool>,
    released: Arc<AtomicBool>,
}

impl ActuatorTap {
    /// Every accepted write, in order.
    pub fn writes(&self) -> Vec<(Side, DriveSignal)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Accepted writes for one side.
    pub fn writes_for(&self, side: Side) -> Vec<DriveSignal> {
        self.writes()
            .into_iter()
            .filter(|(s, _)| *s == side)
            .map(|(_, sig)| sig)
            .collect()
    }

    pub fn last(&self, side: Side) -> Option<DriveSignal> {
        self.writes_for(side).last().copied()
    }

    pub fn clear(&self) {
        if let Ok(mut w) = self.writes.lock() {
            w.clear();
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }
}

/// Actuator that records writes and can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    tap: ActuatorTap,
}

impl RecordingActuator {
    pub fn new() -> (Self, ActuatorTap) {
        let tap = ActuatorTap::default();
        (
            Self {
                tap: tap.clone(),
            },
            tap,
        )
    }
}

impl Actuator for RecordingActuator {
    fn apply(&mut self, side: Side, signal: DriveSignal) -> Result<(), BoxError> {
        if self.tap.failing.load(Ordering::Relaxed) {
            return Err(Box::new(std::io::Error::other("actuator bus error")));
        }
        if let Ok(mut w) = self.tap.writes.lock() {
            w.push((side, signal));
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), BoxError> {
        self.tap.released.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// Range sensor that replays a script, then repeats its final entry.
/// `None` entries simulate a read timeout.
#[derive(Debug, Clone)]
pub struct ScriptedRange {
    script: VecDeque<Option<f32>>,
    last: Option<f32>,
}

impl ScriptedRange {
    pub fn new(script: impl IntoIterator<Item = Option<f32>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
        }
    }

    /// Always reports `cm`.
    pub fn constant(cm: f32) -> Self {
        Self::new([Some(cm)])
    }
}

impl RangeSensor for ScriptedRange {
    fn read_cm(&mut self, _timeout: std::time::Duration) -> Result<f32, BoxError> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
            .ok_or_else(|| Box::new(std::io::Error::other("echo timeout")) as BoxError)
    }
}
