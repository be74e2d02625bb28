//! `From` implementations bridging `rover_config` types to `rover_core` types.

use std::time::Duration;

use crate::config::{RampCfg, SafetyCfg, SamplerCfg};
use crate::ramp::{LEVEL_MAX, PowerMap};
use crate::runner::RunParams;

// ── RampCfg ──────────────────────────────────────────────────────────────────

impl From<&rover_config::Ramp> for RampCfg {
    fn from(c: &rover_config::Ramp) -> Self {
        let map = match c.curve {
            rover_config::PowerCurve::Quadratic => PowerMap::Quadratic,
            rover_config::PowerCurve::Linear => {
                // A short table leaves trailing zeros, which the builder rejects
                // as non-monotonic.
                let mut table = [0u8; LEVEL_MAX as usize + 1];
                for (slot, duty) in table.iter_mut().zip(&c.duty_table) {
                    *slot = *duty;
                }
                PowerMap::Table(table)
            }
        };
        Self {
            increment: c.increment,
            min_step: c.min_step,
            map,
        }
    }
}

// ── SafetyCfg ────────────────────────────────────────────────────────────────

impl From<&rover_config::Safety> for SafetyCfg {
    fn from(c: &rover_config::Safety) -> Self {
        Self {
            max_actuator_failures: c.max_actuator_failures,
        }
    }
}

// ── SamplerCfg ───────────────────────────────────────────────────────────────

impl From<&rover_config::Config> for SamplerCfg {
    fn from(c: &rover_config::Config) -> Self {
        Self {
            threshold_cm: c.safety.threshold_cm,
            sample_hz: c.safety.sample_hz,
            read_timeout: Duration::from_millis(c.hardware.sensor_read_timeout_ms),
        }
    }
}

// ── RunParams ────────────────────────────────────────────────────────────────

impl From<&rover_config::Config> for RunParams {
    fn from(c: &rover_config::Config) -> Self {
        Self {
            tick_hz: c.control.tick_hz,
            reset_debounce_n: c.reset.debounce_n,
            reset_poll: Duration::from_millis(c.reset.poll_ms),
            sensor_stall_ms: c.safety.sensor_stall_ms,
        }
    }
}
