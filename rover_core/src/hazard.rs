//! Proximity hazard flags shared between the sampler thread and the tick.
//!
//! Both flags live in one `AtomicU8`. Each direction is updated with a single
//! read-modify-write, so a reader always sees a consistent pair.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::hw_error::map_hw_error;
use crate::side::Direction;

const FRONT: u8 = 0b01;
const REAR: u8 = 0b10;

/// Which way a range sensor looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Front,
    Rear,
}

impl Facing {
    fn bit(self) -> u8 {
        match self {
            Facing::Front => FRONT,
            Facing::Rear => REAR,
        }
    }

    /// Travel direction blocked by an obstacle on this side of the vehicle.
    pub fn direction(self) -> Direction {
        match self {
            Facing::Front => Direction::Forward,
            Facing::Rear => Direction::Backward,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Facing::Front => "front",
            Facing::Rear => "rear",
        }
    }
}

/// Plain-value snapshot of the hazard word, taken once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HazardFlags {
    pub front_blocked: bool,
    pub rear_blocked: bool,
}

impl HazardFlags {
    pub const CLEAR: HazardFlags = HazardFlags {
        front_blocked: false,
        rear_blocked: false,
    };

    /// Whether travel in `direction` is currently blocked.
    pub fn blocks(self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.front_blocked,
            Direction::Backward => self.rear_blocked,
            Direction::None => false,
        }
    }

    fn from_bits(bits: u8) -> Self {
        Self {
            front_blocked: bits & FRONT != 0,
            rear_blocked: bits & REAR != 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct HazardCell(AtomicU8);

impl HazardCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, facing: Facing, blocked: bool) {
        if blocked {
            self.0.fetch_or(facing.bit(), Ordering::Release);
        } else {
            self.0.fetch_and(!facing.bit(), Ordering::Release);
        }
    }

    pub fn load(&self) -> HazardFlags {
        HazardFlags::from_bits(self.0.load(Ordering::Acquire))
    }
}

pub type SharedHazards = Arc<HazardCell>;

pub fn shared() -> SharedHazards {
    Arc::new(HazardCell::new())
}

/// Threshold comparison with hold-on-failure semantics for one sensor.
#[derive(Debug, Clone)]
pub struct HazardMonitor {
    facing: Facing,
    threshold_cm: f32,
    blocked: bool,
}

impl HazardMonitor {
    pub fn new(facing: Facing, threshold_cm: f32) -> Self {
        Self {
            facing,
            threshold_cm,
            blocked: false,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn blocked(&self) -> bool {
        self.blocked
    }

    /// Fold one reading into the flag and return the flag.
    ///
    /// Errors and invalid samples (negative, non-finite) keep the previous
    /// value; they never clear a standing hazard.
    pub fn observe(
        &mut self,
        reading: Result<f32, Box<dyn std::error::Error + Send + Sync>>,
    ) -> bool {
        match reading {
            Ok(cm) if cm.is_finite() && cm >= 0.0 => {
                let blocked = cm <= self.threshold_cm;
                if blocked != self.blocked {
                    if blocked {
                        tracing::info!(facing = self.facing.name(), cm, "obstacle detected");
                    } else {
                        tracing::info!(facing = self.facing.name(), cm, "path clear");
                    }
                }
                self.blocked = blocked;
            }
            Ok(cm) => {
                tracing::warn!(facing = self.facing.name(), cm, "invalid range sample; holding");
            }
            Err(e) => {
                let mapped = map_hw_error(e.as_ref());
                tracing::debug!(facing = self.facing.name(), error = %mapped, "range read failed; holding");
            }
        }
        self.blocked
    }
}
