//! The per-tick motion pipeline.

use rover_traits::{Actuator, Side};

use crate::arbiter::SafetyArbiter;
use crate::command::{Action, MotionCommand};
use crate::config::SafetyCfg;
use crate::drivetrain::Drivetrain;
use crate::error::RoverError;
use crate::hazard::{HazardFlags, SharedHazards};
use crate::side::{Direction, SideController};
use crate::sink::ActuatorSink;
use crate::status::{SessionStats, TickStatus};

/// Owns all side state and the actuator. Every mutation happens in [`tick`].
///
/// Tick order:
/// 1. snapshot the hazard word
/// 2. reconcile hazards (suspend / restore)
/// 3. advance ramps of sides not restarted in step 2
/// 4. apply at most one operator command
/// 5. flush changed signals to the actuator
///
/// [`tick`]: MotionCoordinator::tick
pub struct MotionCoordinator<A: Actuator> {
    drivetrain: Drivetrain,
    arbiter: SafetyArbiter,
    sink: ActuatorSink<A>,
    hazards: SharedHazards,
    safety: SafetyCfg,
    failing_ticks: u8,
    last_flags: HazardFlags,
    stats: SessionStats,
}

impl<A: Actuator> MotionCoordinator<A> {
    pub(crate) fn from_parts(
        drivetrain: Drivetrain,
        actuator: A,
        hazards: SharedHazards,
        safety: SafetyCfg,
    ) -> Self {
        Self {
            drivetrain,
            arbiter: SafetyArbiter::new(),
            sink: ActuatorSink::new(actuator),
            hazards,
            safety,
            failing_ticks: 0,
            last_flags: HazardFlags::CLEAR,
            stats: SessionStats::default(),
        }
    }

    pub fn tick(&mut self, command: Option<MotionCommand>) -> TickStatus {
        self.stats.ticks += 1;

        let flags = self.hazards.load();
        if flags != self.last_flags {
            tracing::debug!(
                front = flags.front_blocked,
                rear = flags.rear_blocked,
                "hazard flags changed"
            );
            self.last_flags = flags;
        }

        self.drivetrain.begin_tick();
        let rec = self.arbiter.reconcile(flags, &mut self.drivetrain);
        self.stats.suspensions += u64::from(rec.suspended);
        self.stats.restores += u64::from(rec.restored);

        self.drivetrain.advance();

        if let Some(cmd) = command {
            self.apply_command(flags, cmd);
        }

        let report = self.sink.flush(self.drivetrain.signals());
        if report.ok() {
            self.failing_ticks = 0;
            return TickStatus::Running;
        }

        self.stats.actuator_failures += u64::from(report.failed);
        self.failing_ticks = self.failing_ticks.saturating_add(1);
        if self.failing_ticks < self.safety.max_actuator_failures {
            return TickStatus::Running;
        }

        let n = self.failing_ticks;
        self.failing_ticks = 0;
        self.stats.fail_safe_trips += 1;
        self.drivetrain.stop_all_commanded();
        let retry = self.sink.force(self.drivetrain.signals());
        tracing::error!(
            failing_ticks = n,
            stop_written = retry.ok(),
            "actuator fail-safe: both sides stopped"
        );
        TickStatus::FailSafe(RoverError::ActuatorFailSafe(n))
    }

    fn apply_command(&mut self, flags: HazardFlags, cmd: MotionCommand) {
        self.stats.commands += 1;
        tracing::trace!(side = cmd.side.name(), action = ?cmd.action, "command");
        if self.arbiter.intercept(flags, &cmd, &mut self.drivetrain) {
            self.stats.held += 1;
            return;
        }
        match cmd.action {
            Action::Forward(p) => {
                self.drivetrain.drive(cmd.side, Direction::Forward, p);
            }
            Action::Backward(p) => {
                self.drivetrain.drive(cmd.side, Direction::Backward, p);
            }
            Action::Stop => {
                if let Some(cancelled) = self.drivetrain.stop_commanded(cmd.side) {
                    self.stats.cancelled_restores += 1;
                    tracing::info!(
                        side = cmd.side.name(),
                        direction = ?cancelled.direction,
                        "pending restore cancelled by stop"
                    );
                }
            }
        }
    }

    /// Stop both sides, force a final write and release the actuator.
    pub fn shutdown(&mut self) -> Result<(), RoverError> {
        self.drivetrain.stop_all_commanded();
        let report = self.sink.force(self.drivetrain.signals());
        let released = self.sink.release();
        if !report.ok() {
            return Err(RoverError::HardwareFault(format!(
                "final stop write failed on {} side(s)",
                report.failed
            )));
        }
        released
    }

    pub fn side(&self, side: Side) -> &SideController {
        self.drivetrain.side(side)
    }

    pub fn drivetrain(&self) -> &Drivetrain {
        &self.drivetrain
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn hazards(&self) -> &SharedHazards {
        &self.hazards
    }

    pub fn actuator(&self) -> &A {
        self.sink.actuator()
    }
}
