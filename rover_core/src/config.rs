//! Runtime configuration types for the motion engine.
//!
//! These are what `MotionCoordinator`, `HazardSampler` and the runner consume.
//! They are separate from the TOML-deserialized config in `rover_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

use crate::ramp::PowerMap;

/// Ramp shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampCfg {
    /// Duty points added per tick while accelerating.
    pub increment: u8,
    /// Starting duty after a start from rest or a direction change.
    pub min_step: u8,
    pub map: PowerMap,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            increment: 5,
            min_step: 10,
            map: PowerMap::Quadratic,
        }
    }
}

/// Actuator fail-safe policy.
#[derive(Debug, Clone)]
pub struct SafetyCfg {
    /// Consecutive ticks with at least one failed actuator write before both
    /// sides are forced to the commanded-stop state.
    pub max_actuator_failures: u8,
}

impl Default for SafetyCfg {
    fn default() -> Self {
        Self {
            max_actuator_failures: 3,
        }
    }
}

/// Range sensor sampling.
#[derive(Debug, Clone)]
pub struct SamplerCfg {
    /// Obstacle at or below this distance blocks the direction.
    pub threshold_cm: f32,
    pub sample_hz: u32,
    /// Per-read echo timeout.
    pub read_timeout: Duration,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            threshold_cm: 20.0,
            sample_hz: 10,
            read_timeout: Duration::from_millis(40),
        }
    }
}
