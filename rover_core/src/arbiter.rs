//! Safety arbiter: suspends motion toward an obstacle and restores it once
//! the path clears.

use rover_traits::Side;

use crate::command::{Action, MotionCommand};
use crate::drivetrain::Drivetrain;
use crate::hazard::HazardFlags;
use crate::side::{Direction, SavedMotion};

/// Per-tick result of [`SafetyArbiter::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub suspended: u8,
    pub restored: u8,
}

#[derive(Debug, Default)]
pub struct SafetyArbiter;

impl SafetyArbiter {
    pub fn new() -> Self {
        Self
    }

    /// Apply the hazard snapshot: forward first, then backward.
    pub fn reconcile(&mut self, flags: HazardFlags, dt: &mut Drivetrain) -> Reconciliation {
        let mut out = Reconciliation::default();
        for direction in [Direction::Forward, Direction::Backward] {
            let blocked = flags.blocks(direction);
            for side in Side::BOTH {
                if blocked {
                    if dt.side(side).direction() == direction && dt.suspend(side) {
                        tracing::info!(side = side.name(), ?direction, "motion suspended by hazard");
                        out.suspended += 1;
                    }
                } else if dt.side(side).saved_direction() == direction
                    && let Some(saved) = dt.restore(side)
                {
                    tracing::info!(
                        side = side.name(),
                        ?direction,
                        power = saved.power.get(),
                        "hazard cleared; motion restored"
                    );
                    out.restored += 1;
                }
            }
        }
        out
    }

    /// Handle a command aimed at a blocked direction.
    ///
    /// Returns true when the command was consumed: it is stored as the side's
    /// saved motion (replacing any older one) and the side is held stopped.
    /// Commands for a clear direction and stops return false and go through
    /// the normal path.
    pub fn intercept(&mut self, flags: HazardFlags, cmd: &MotionCommand, dt: &mut Drivetrain) -> bool {
        let (direction, power) = match cmd.action {
            Action::Forward(p) => (Direction::Forward, p),
            Action::Backward(p) => (Direction::Backward, p),
            Action::Stop => return false,
        };
        if !flags.blocks(direction) {
            return false;
        }
        dt.divert(cmd.side, SavedMotion { direction, power });
        tracing::info!(
            side = cmd.side.name(),
            ?direction,
            power = power.get(),
            "command held while path is blocked"
        );
        true
    }
}
