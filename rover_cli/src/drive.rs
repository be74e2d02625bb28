//! Backend assembly and the `drive` / `self-check` commands.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rover_config::Config;
use rover_core::hazard::{self, Facing};
use rover_core::sampler::{BoxedRangeSensor, HazardSampler};
use rover_core::{Coordinator, RunParams, RunSummary, SamplerCfg, StopReason};
use rover_traits::{Actuator, RangeSensor};
use rover_traits::clock::MonotonicClock;

use crate::server::CommandServer;

pub type ResetCheck = Box<dyn Fn() -> bool + Send + Sync>;

pub fn stop_reason_name(r: StopReason) -> &'static str {
    match r {
        StopReason::ResetSwitch => "ResetSwitch",
        StopReason::ResetCommand => "ResetCommand",
        StopReason::Shutdown => "Shutdown",
    }
}

#[derive(Debug, Default, Clone)]
pub struct DriveOpts {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub sim_front_cm: Option<f32>,
    pub sim_rear_cm: Option<f32>,
}

#[derive(Debug)]
pub struct DriveReport {
    pub summary: RunSummary,
    pub rejected_frames: u64,
}

// ── Backends ─────────────────────────────────────────────────────────────────

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_actuator(cfg: &Config) -> eyre::Result<Box<dyn Actuator + Send>> {
    use rover_config::MotorBackend;
    use rover_hardware::{DrivePins, GpioDrive, SerialMotorController};

    match cfg.motor_serial.backend {
        MotorBackend::Gpio => {
            let pins = DrivePins {
                left_forward: cfg.pins.left_forward_pwm,
                left_backward: cfg.pins.left_backward_pwm,
                right_forward: cfg.pins.right_forward_pwm,
                right_backward: cfg.pins.right_backward_pwm,
            };
            Ok(Box::new(GpioDrive::new(pins, cfg.hardware.pwm_freq_hz)?))
        }
        MotorBackend::Serial => Ok(Box::new(SerialMotorController::open(
            cfg.motor_serial.port.as_deref(),
            cfg.motor_serial.baud,
        )?)),
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_actuator(cfg: &Config) -> eyre::Result<Box<dyn Actuator + Send>> {
    tracing::info!(backend = ?cfg.motor_serial.backend, "using simulated motors");
    Ok(Box::new(rover_hardware::SimulatedActuator::new()))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_sensors(cfg: &Config, _opts: &DriveOpts) -> eyre::Result<Vec<(Facing, BoxedRangeSensor)>> {
    use rover_hardware::HcSr04;

    let gpio = rover_hardware::open_gpio()?;
    let mut sensors: Vec<(Facing, BoxedRangeSensor)> = Vec::new();
    let p = &cfg.pins;
    if let (Some(trig), Some(echo)) = (p.front_trigger, p.front_echo) {
        sensors.push((Facing::Front, Box::new(HcSr04::new(&gpio, trig, echo)?)));
    }
    if let (Some(trig), Some(echo)) = (p.rear_trigger, p.rear_echo) {
        sensors.push((Facing::Rear, Box::new(HcSr04::new(&gpio, trig, echo)?)));
    }
    if sensors.is_empty() {
        tracing::warn!("no range sensors configured; obstacle stops disabled");
    }
    Ok(sensors)
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_sensors(_cfg: &Config, opts: &DriveOpts) -> eyre::Result<Vec<(Facing, BoxedRangeSensor)>> {
    use rover_hardware::SimulatedRangeSensor;

    /// Distance reported by simulated sensors unless overridden.
    const SIM_CLEAR_CM: f32 = 300.0;

    let front = opts.sim_front_cm.unwrap_or(SIM_CLEAR_CM);
    let rear = opts.sim_rear_cm.unwrap_or(SIM_CLEAR_CM);
    tracing::info!(front_cm = front, rear_cm = rear, "using simulated range sensors");
    Ok(vec![
        (Facing::Front, Box::new(SimulatedRangeSensor::new(Some(front)))),
        (Facing::Rear, Box::new(SimulatedRangeSensor::new(Some(rear)))),
    ])
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_reset_check(cfg: &Config) -> Option<ResetCheck> {
    let pin = cfg.pins.reset_in?;
    match rover_hardware::reset::make_reset_checker(pin, cfg.reset.active_low) {
        Ok(c) => {
            tracing::info!(
                pin,
                active_low = cfg.reset.active_low,
                poll_ms = cfg.reset.poll_ms,
                "reset switch enabled"
            );
            Some(c)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to init reset switch; continuing without it");
            None
        }
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_reset_check(_cfg: &Config) -> Option<ResetCheck> {
    None
}

fn build(cfg: &Config, hazards: rover_core::SharedHazards) -> eyre::Result<Coordinator> {
    Coordinator::builder()
        .with_actuator(make_actuator(cfg)?)
        .with_hazards(hazards)
        .with_ramp((&cfg.ramp).into())
        .with_safety((&cfg.safety).into())
        .build()
}

// ── Commands ─────────────────────────────────────────────────────────────────

pub fn run_drive(cfg: &Config, opts: &DriveOpts, shutdown: Arc<AtomicBool>) -> eyre::Result<DriveReport> {
    let hazards = hazard::shared();
    let mut coordinator = build(cfg, hazards.clone())?;

    let sampler = HazardSampler::spawn(
        make_sensors(cfg, opts)?,
        SamplerCfg::from(cfg),
        hazards,
        MonotonicClock::new(),
    );
    let reset_check = make_reset_check(cfg);

    let host = opts.host.as_deref().unwrap_or(&cfg.network.host);
    let port = opts.port.unwrap_or(cfg.network.port);
    let (tx, rx) = crossbeam_channel::bounded(cfg.network.queue_depth);
    let server = CommandServer::spawn(&format!("{host}:{port}"), tx)?;

    let params = RunParams::from(cfg);
    tracing::info!(addr = %server.local_addr(), "accepting operator commands");
    let summary = rover_core::runner::run(
        &mut coordinator,
        &rx,
        &shutdown,
        reset_check.as_deref().map(|f| f as &dyn Fn() -> bool),
        Some(&sampler),
        &params,
        &MonotonicClock::new(),
    )?;

    let rejected_frames = server.rejected();
    // Nothing drains the queue any more; release a listener blocked on it.
    drop(rx);
    drop(server);
    drop(sampler);
    tracing::info!(
        reason = stop_reason_name(summary.reason),
        rejected_frames,
        "drive session ended"
    );
    Ok(DriveReport {
        summary,
        rejected_frames,
    })
}

/// Bring the backends up once, sample each range sensor and leave both sides
/// stopped.
pub fn self_check(cfg: &Config) -> eyre::Result<Vec<(Facing, Option<f32>)>> {
    let mut coordinator = build(cfg, hazard::shared())?;
    let timeout = SamplerCfg::from(cfg).read_timeout;
    let mut readings = Vec::new();
    for (facing, mut sensor) in make_sensors(cfg, &DriveOpts::default())? {
        let cm = match sensor.read_cm(timeout) {
            Ok(cm) => Some(cm),
            Err(e) => {
                tracing::warn!(facing = facing.name(), error = %e, "range sensor read failed");
                None
            }
        };
        readings.push((facing, cm));
    }
    coordinator.shutdown()?;
    Ok(readings)
}
