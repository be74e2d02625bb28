//! Both side controllers plus the cross-side fairness rule.

use rover_traits::{DriveSignal, Side};

use crate::ramp::{PowerLevel, RampEngine};
use crate::side::{Direction, DriveOutcome, SavedMotion, SideController};

#[derive(Debug, Clone)]
pub struct Drivetrain {
    sides: [SideController; 2],
    /// Sides (re)started since the last `begin_tick`; skipped by `advance`.
    restarted: [bool; 2],
}

impl Drivetrain {
    pub fn new(ramp: RampEngine) -> Self {
        Self {
            sides: [
                SideController::new(Side::Left, ramp.clone()),
                SideController::new(Side::Right, ramp),
            ],
            restarted: [false; 2],
        }
    }

    #[inline]
    pub fn side(&self, side: Side) -> &SideController {
        &self.sides[side.index()]
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> &mut SideController {
        &mut self.sides[side.index()]
    }

    fn peer(side: Side) -> Side {
        match side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Operator drive request for one side.
    ///
    /// When the other side already holds the same direction and power, the
    /// starting duty is lifted to the larger of the two sides' duties so both
    /// ramps run in lockstep. Reversals are never seeded.
    pub fn drive(&mut self, side: Side, direction: Direction, power: PowerLevel) -> DriveOutcome {
        let own = self.side(side);
        let peer = self.side(Self::peer(side));
        let seed = if direction.is_moving()
            && !own.direction().reverses(direction)
            && peer.direction() == direction
            && peer.requested_power() == power
        {
            let own_duty = if own.direction() == direction {
                own.transition_duty()
            } else {
                0
            };
            Some(own_duty.max(peer.transition_duty()))
        } else {
            None
        };

        let outcome = self.side_mut(side).drive_seeded(direction, power, seed);
        if outcome == DriveOutcome::Restarted {
            self.restarted[side.index()] = true;
        }
        outcome
    }

    /// Reissue a saved motion. Starts from the minimum step, no seeding.
    /// Returns the motion that was restored.
    pub fn restore(&mut self, side: Side) -> Option<SavedMotion> {
        let ctl = self.side_mut(side);
        let saved = ctl.clear_saved()?;
        ctl.stop();
        ctl.drive_seeded(saved.direction, saved.power, None);
        self.restarted[side.index()] = true;
        Some(saved)
    }

    /// Save and stop a side moving in a blocked direction.
    pub fn suspend(&mut self, side: Side) -> bool {
        self.side_mut(side).suspend()
    }

    /// Record a request for a blocked direction without actuating it.
    /// Any current motion on the side is stopped.
    pub fn divert(&mut self, side: Side, saved: SavedMotion) {
        let ctl = self.side_mut(side);
        ctl.stop();
        ctl.set_saved(saved);
    }

    /// Operator stop: zero output and drop any pending restore.
    /// Returns the cancelled saved motion, if any.
    pub fn stop_commanded(&mut self, side: Side) -> Option<SavedMotion> {
        let ctl = self.side_mut(side);
        ctl.stop();
        ctl.clear_saved()
    }

    pub fn stop_all_commanded(&mut self) {
        for side in Side::BOTH {
            self.stop_commanded(side);
        }
    }

    pub fn begin_tick(&mut self) {
        self.restarted = [false; 2];
    }

    /// Advance every side that was not (re)started this tick.
    pub fn advance(&mut self) {
        for side in Side::BOTH {
            if !self.restarted[side.index()] {
                self.side_mut(side).advance();
            }
        }
    }

    pub fn signals(&self) -> [DriveSignal; 2] {
        [self.sides[0].signal(), self.sides[1].signal()]
    }
}
