//! Per-side motion state and the operations that mutate it.

use rover_traits::{DriveSignal, Polarity, Side};

use crate::ramp::{PowerLevel, RampEngine};

/// Travel direction requested for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    None,
    Forward,
    Backward,
}

impl Direction {
    pub fn polarity(self) -> Polarity {
        match self {
            Direction::None => Polarity::Stop,
            Direction::Forward => Polarity::Forward,
            Direction::Backward => Polarity::Backward,
        }
    }

    #[inline]
    pub fn is_moving(self) -> bool {
        self != Direction::None
    }

    /// True for Forward↔Backward, false when either end is `None`.
    #[inline]
    pub fn reverses(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Forward, Direction::Backward) | (Direction::Backward, Direction::Forward)
        )
    }
}

/// Motion suspended by the safety arbiter, waiting to be reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedMotion {
    pub direction: Direction,
    pub power: PowerLevel,
}

/// Snapshot of one side. Mutated only through [`SideController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideState {
    pub direction: Direction,
    pub requested_power: PowerLevel,
    /// Duty currently output by the ramp.
    pub transition_duty: u8,
    /// Duty the ramp is heading to.
    pub desired_duty: u8,
    pub saved: Option<SavedMotion>,
}

/// What a drive request did to the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// Same direction and power as before; nothing changed.
    Unchanged,
    /// Started from rest or reversed; ramp restarted at the start step.
    Restarted,
    /// Same direction, new power; ramp continues from the current duty.
    Retargeted,
}

#[derive(Debug, Clone)]
pub struct SideController {
    side: Side,
    ramp: RampEngine,
    state: SideState,
}

impl SideController {
    pub fn new(side: Side, ramp: RampEngine) -> Self {
        Self {
            side,
            ramp,
            state: SideState::default(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn state(&self) -> &SideState {
        &self.state
    }

    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    pub fn requested_power(&self) -> PowerLevel {
        self.state.requested_power
    }

    pub fn transition_duty(&self) -> u8 {
        self.state.transition_duty
    }

    pub fn desired_duty(&self) -> u8 {
        self.state.desired_duty
    }

    pub fn saved(&self) -> Option<SavedMotion> {
        self.state.saved
    }

    /// `Direction::None` when nothing is saved.
    pub fn saved_direction(&self) -> Direction {
        self.state.saved.map_or(Direction::None, |s| s.direction)
    }

    pub fn saved_power(&self) -> PowerLevel {
        self.state.saved.map_or(PowerLevel::ZERO, |s| s.power)
    }

    pub fn drive_forward(&mut self, power: PowerLevel) -> DriveOutcome {
        self.drive_seeded(Direction::Forward, power, None)
    }

    pub fn drive_backward(&mut self, power: PowerLevel) -> DriveOutcome {
        self.drive_seeded(Direction::Backward, power, None)
    }

    /// Drive in `direction`, optionally lifting the starting duty to `seed`
    /// (never above the desired duty). Always clears the saved slot.
    ///
    /// `Direction::None` behaves like [`stop`](Self::stop) plus clearing the slot.
    pub fn drive_seeded(
        &mut self,
        direction: Direction,
        power: PowerLevel,
        seed: Option<u8>,
    ) -> DriveOutcome {
        self.state.saved = None;
        if !direction.is_moving() {
            let was_moving = self.state.direction.is_moving();
            self.stop();
            return if was_moving {
                DriveOutcome::Restarted
            } else {
                DriveOutcome::Unchanged
            };
        }
        if direction == self.state.direction && power == self.state.requested_power {
            return DriveOutcome::Unchanged;
        }

        let desired = self.ramp.desired_duty(power);
        let (base, outcome) = if direction == self.state.direction {
            (
                self.state.transition_duty.min(desired),
                DriveOutcome::Retargeted,
            )
        } else {
            (self.ramp.start_duty(desired), DriveOutcome::Restarted)
        };
        let duty = seed.map_or(base, |s| base.max(s.min(desired)));

        self.state.direction = direction;
        self.state.requested_power = power;
        self.state.desired_duty = desired;
        self.state.transition_duty = duty;
        tracing::trace!(
            side = self.side.name(),
            ?direction,
            power = power.get(),
            duty,
            desired,
            "drive"
        );
        outcome
    }

    /// Zero the output. The saved slot is left alone; callers decide whether
    /// the stop is a suspension or an operator request.
    pub fn stop(&mut self) {
        self.state.direction = Direction::None;
        self.state.requested_power = PowerLevel::ZERO;
        self.state.transition_duty = 0;
        self.state.desired_duty = 0;
    }

    /// One ramp step toward the desired duty.
    pub fn advance(&mut self) {
        if self.state.direction.is_moving() {
            self.state.transition_duty = self
                .ramp
                .step(self.state.transition_duty, self.state.desired_duty);
        }
    }

    /// Save the current motion and stop. No-op if already stopped or saved.
    /// Returns true when a motion was suspended.
    pub fn suspend(&mut self) -> bool {
        if !self.state.direction.is_moving() || self.state.saved.is_some() {
            return false;
        }
        self.state.saved = Some(SavedMotion {
            direction: self.state.direction,
            power: self.state.requested_power,
        });
        self.stop();
        true
    }

    /// Replace the saved slot without actuating.
    pub fn set_saved(&mut self, saved: SavedMotion) {
        self.state.saved = Some(saved);
    }

    pub fn clear_saved(&mut self) -> Option<SavedMotion> {
        self.state.saved.take()
    }

    pub fn signal(&self) -> DriveSignal {
        if !self.state.direction.is_moving() {
            return DriveSignal::STOP;
        }
        DriveSignal {
            polarity: self.state.direction.polarity(),
            duty: self.state.transition_duty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RampCfg;
    use crate::ramp::PowerMap;

    fn ctl() -> SideController {
        SideController::new(
            Side::Left,
            RampEngine::new(&RampCfg {
                increment: 5,
                min_step: 10,
                map: PowerMap::Table([0, 15, 25, 35, 45, 55, 65, 75, 88, 100]),
            }),
        )
    }

    #[test]
    fn start_from_rest_uses_min_step() {
        let mut c = ctl();
        assert_eq!(c.drive_forward(PowerLevel::new(5)), DriveOutcome::Restarted);
        assert_eq!(c.transition_duty(), 10);
        assert_eq!(c.desired_duty(), 55);
    }

    #[test]
    fn lower_power_snaps_down() {
        let mut c = ctl();
        c.drive_forward(PowerLevel::new(9));
        for _ in 0..30 {
            c.advance();
        }
        assert_eq!(c.transition_duty(), 100);
        assert_eq!(c.drive_forward(PowerLevel::new(2)), DriveOutcome::Retargeted);
        assert_eq!(c.transition_duty(), 25);
    }

    #[test]
    fn seed_is_capped_at_desired() {
        let mut c = ctl();
        c.drive_seeded(Direction::Forward, PowerLevel::new(1), Some(80));
        assert_eq!(c.transition_duty(), 15);
    }

    #[test]
    fn suspend_is_idempotent() {
        let mut c = ctl();
        c.drive_backward(PowerLevel::new(3));
        assert!(c.suspend());
        assert!(!c.suspend());
        assert_eq!(c.saved_direction(), Direction::Backward);
        assert_eq!(c.saved_power(), PowerLevel::new(3));
        assert_eq!(c.signal(), DriveSignal::STOP);
    }

    #[test]
    fn stop_keeps_saved_slot() {
        let mut c = ctl();
        c.drive_forward(PowerLevel::new(4));
        c.suspend();
        c.stop();
        assert!(c.saved().is_some());
    }

    #[test]
    fn reversal_check() {
        assert!(Direction::Forward.reverses(Direction::Backward));
        assert!(!Direction::None.reverses(Direction::Forward));
        assert!(!Direction::Forward.reverses(Direction::Forward));
    }
}
