//! Slew-rate limited duty ramp and the power-level → duty mapping.
//!
//! Acceleration is the only rate-limited path: a lower target is applied
//! immediately, a higher one is approached by `increment` per tick.

use crate::config::RampCfg;

/// Highest protocol power level.
pub const LEVEL_MAX: u8 = 9;

/// Coarse throttle step, always within `0..=LEVEL_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PowerLevel(u8);

impl PowerLevel {
    pub const ZERO: PowerLevel = PowerLevel(0);
    pub const MAX: PowerLevel = PowerLevel(LEVEL_MAX);

    /// Build a level, clamping anything above `LEVEL_MAX`.
    #[inline]
    pub fn new(level: u8) -> Self {
        Self(level.min(LEVEL_MAX))
    }

    /// Build a level from an arbitrary integer, clamping to the valid range.
    pub fn saturating_from(raw: i64) -> Self {
        Self(raw.clamp(0, i64::from(LEVEL_MAX)) as u8)
    }

    /// Map the magnitude of a normalized joystick value in [-1, 1] onto a level.
    /// Non-finite input maps to zero.
    pub fn from_fraction(x: f32) -> Self {
        if !x.is_finite() {
            return Self::ZERO;
        }
        let mag = x.abs().min(1.0);
        Self::new((mag * f32::from(LEVEL_MAX)).round() as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for PowerLevel {
    fn from(v: u8) -> Self {
        Self::new(v)
    }
}

/// Monotonic mapping from power level to target duty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PowerMap {
    /// One duty percentage per level, index = level.
    Table([u8; LEVEL_MAX as usize + 1]),
    /// `duty = 100 * (level / LEVEL_MAX)^2`, rounded to nearest.
    #[default]
    Quadratic,
}

impl PowerMap {
    pub fn duty(&self, level: PowerLevel) -> u8 {
        match self {
            PowerMap::Table(t) => t[usize::from(level.get())].min(100),
            PowerMap::Quadratic => {
                let l = u32::from(level.get());
                let max_sq = u32::from(LEVEL_MAX) * u32::from(LEVEL_MAX);
                // round-half-up of 100*l^2/max^2 in integers
                let duty = (100 * l * l + max_sq / 2) / max_sq;
                duty.min(100) as u8
            }
        }
    }

    /// True when every level maps to a duty no lower than the previous one.
    pub fn is_monotonic(&self) -> bool {
        match self {
            PowerMap::Table(t) => t.windows(2).all(|w| w[0] <= w[1]) && t.iter().all(|&d| d <= 100),
            PowerMap::Quadratic => true,
        }
    }
}

/// One ramp step from `current` toward `desired`.
#[inline]
pub fn advance(current: u8, desired: u8, increment: u8) -> u8 {
    if current < desired {
        current.saturating_add(increment).min(desired)
    } else {
        desired
    }
}

/// Ramp parameters bound to a power map; shared by both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampEngine {
    map: PowerMap,
    increment: u8,
    min_step: u8,
}

impl RampEngine {
    pub fn new(cfg: &RampCfg) -> Self {
        Self {
            map: cfg.map.clone(),
            increment: cfg.increment.max(1),
            min_step: cfg.min_step.clamp(1, 100),
        }
    }

    #[inline]
    pub fn desired_duty(&self, level: PowerLevel) -> u8 {
        self.map.duty(level)
    }

    /// Duty used when motion starts from rest or reverses.
    #[inline]
    pub fn start_duty(&self, desired: u8) -> u8 {
        self.min_step.min(desired)
    }

    #[inline]
    pub fn step(&self, current: u8, desired: u8) -> u8 {
        advance(current, desired, self.increment)
    }

    pub fn increment(&self) -> u8 {
        self.increment
    }

    pub fn min_step(&self) -> u8 {
        self.min_step
    }
}
