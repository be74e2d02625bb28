//! Simulated backends for running without GPIO.

use std::sync::{Arc, Mutex};

use rover_traits::{Actuator, DriveSignal, RangeSensor, Side};

use crate::error::HwError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Range sensor reporting a settable distance; `None` reads as a timeout.
#[derive(Debug, Clone)]
pub struct SimulatedRangeSensor {
    distance: Arc<Mutex<Option<f32>>>,
}

impl SimulatedRangeSensor {
    pub fn new(distance_cm: Option<f32>) -> Self {
        Self {
            distance: Arc::new(Mutex::new(distance_cm)),
        }
    }

    /// Change the reported distance; clones share the value.
    pub fn set_distance(&self, distance_cm: Option<f32>) {
        if let Ok(mut d) = self.distance.lock() {
            *d = distance_cm;
        }
    }
}

impl RangeSensor for SimulatedRangeSensor {
    fn read_cm(&mut self, _timeout: std::time::Duration) -> Result<f32, BoxError> {
        let d = self.distance.lock().map(|d| *d).unwrap_or(None);
        d.ok_or_else(|| Box::new(HwError::EchoTimeout) as BoxError)
    }
}

/// Motor driver that only logs what it would do.
#[derive(Debug, Default)]
pub struct SimulatedActuator {
    last: [DriveSignal; 2],
    released: bool,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self, side: Side) -> DriveSignal {
        self.last[side.index()]
    }

    pub fn released(&self) -> bool {
        self.released
    }
}

impl Actuator for SimulatedActuator {
    fn apply(&mut self, side: Side, signal: DriveSignal) -> Result<(), BoxError> {
        tracing::info!(
            side = side.name(),
            duty = signal.signed_duty(),
            "motor (simulated)"
        );
        self.last[side.index()] = signal;
        self.released = false;
        Ok(())
    }

    fn release(&mut self) -> Result<(), BoxError> {
        tracing::info!("motors released (simulated)");
        self.last = [DriveSignal::STOP; 2];
        self.released = true;
        Ok(())
    }
}
