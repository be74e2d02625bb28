//! Paced control loop around a `MotionCoordinator`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use rover_traits::Actuator;
use rover_traits::clock::Clock;

use crate::command::Frame;
use crate::coordinator::MotionCoordinator;
use crate::error::Result;
use crate::sampler::HazardSampler;
use crate::status::{SessionStats, TickStatus};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Physical reset switch held for the debounce window.
    ResetSwitch,
    /// `reset` frame from the operator.
    ResetCommand,
    /// Process signal (SIGINT/SIGTERM).
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct RunParams {
    pub tick_hz: u32,
    /// Consecutive pressed polls that end the session.
    pub reset_debounce_n: u8,
    pub reset_poll: Duration,
    /// Warn once no valid range sample arrived for this long; 0 disables.
    pub sensor_stall_ms: u64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            tick_hz: 50,
            reset_debounce_n: 2,
            reset_poll: Duration::from_millis(200),
            sensor_stall_ms: 3_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reason: StopReason,
    pub stats: SessionStats,
    /// Times the range sensors went silent for `sensor_stall_ms`.
    pub sensor_stalls: u64,
}

/// Latches after `n` consecutive pressed polls.
struct Debounce {
    n: u8,
    count: u8,
}

impl Debounce {
    fn new(n: u8) -> Self {
        Self { n: n.max(1), count: 0 }
    }

    fn update(&mut self, pressed: bool) -> bool {
        self.count = if pressed { self.count.saturating_add(1) } else { 0 };
        self.count >= self.n
    }
}

/// Drive `coordinator` until a reset or shutdown, then stop both sides and
/// release the actuator.
///
/// One frame is taken from `commands` per tick. A disconnected channel only
/// means no more commands; hazard reconciliation keeps running.
pub fn run<A, C>(
    coordinator: &mut MotionCoordinator<A>,
    commands: &Receiver<Frame>,
    shutdown: &AtomicBool,
    reset_check: Option<&dyn Fn() -> bool>,
    sampler: Option<&HazardSampler>,
    params: &RunParams,
    clock: &C,
) -> Result<RunSummary>
where
    A: Actuator,
    C: Clock,
{
    let period = crate::util::period(params.tick_hz);
    let mut reset = Debounce::new(params.reset_debounce_n);
    let mut next_reset_poll = clock.now();
    let mut next_tick = clock.now();
    let mut disconnected = false;
    let mut stall_warned = false;
    let mut sensor_stalls = 0u64;

    tracing::info!(tick_hz = params.tick_hz, "control loop start");

    let reason = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }

        if let Some(check) = reset_check
            && clock.now() >= next_reset_poll
        {
            next_reset_poll += params.reset_poll;
            if reset.update(check()) {
                break StopReason::ResetSwitch;
            }
        }

        let command = match commands.try_recv() {
            Ok(Frame::Motion(cmd)) => Some(cmd),
            Ok(Frame::Reset) => break StopReason::ResetCommand,
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !disconnected {
                    tracing::warn!("command source disconnected; holding current motion");
                    disconnected = true;
                }
                None
            }
        };

        if let TickStatus::FailSafe(e) = coordinator.tick(command) {
            tracing::error!(error = %e, "fail-safe engaged");
        }

        if let Some(s) = sampler
            && params.sensor_stall_ms > 0
        {
            let stalled = s.stalled_for(clock.ms_since(s.epoch()));
            if stalled >= params.sensor_stall_ms {
                if !stall_warned {
                    sensor_stalls += 1;
                    tracing::warn!(stalled_ms = stalled, "range sensors stalled; hazard flags held");
                    stall_warned = true;
                }
            } else {
                stall_warned = false;
            }
        }

        next_tick += period;
        let now = clock.now();
        if next_tick < now {
            // Overran; restart pacing from now instead of bursting.
            next_tick = now;
        } else {
            clock.sleep_until(next_tick);
        }
    };

    tracing::info!(?reason, "control loop stopping");
    coordinator.shutdown().map_err(eyre::Report::new)?;

    let stats = coordinator.stats();
    tracing::info!(
        ticks = stats.ticks,
        commands = stats.commands,
        held = stats.held,
        suspensions = stats.suspensions,
        restores = stats.restores,
        cancelled_restores = stats.cancelled_restores,
        actuator_failures = stats.actuator_failures,
        fail_safe_trips = stats.fail_safe_trips,
        sensor_stalls,
        "session summary"
    );
    Ok(RunSummary {
        reason,
        stats,
        sensor_stalls,
    })
}
