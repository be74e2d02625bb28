#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the rover motion controller.
//!
//! - `Config` and its sections are deserialized from TOML and then checked by
//!   [`Config::validate`].
//! - Only `[pins]` is mandatory; every other section falls back to defaults
//!   matching the stock wiring of the vehicle.
use serde::Deserialize;
use std::path::Path;

/// Number of discrete power levels above zero (protocol digits 1..=9).
pub const LEVEL_MAX: u8 = 9;

/// BCM pin assignments.
#[derive(Debug, Deserialize, Clone)]
pub struct Pins {
    /// BTS7960 RPWM/LPWM inputs for the left side.
    pub left_forward_pwm: u8,
    pub left_backward_pwm: u8,
    /// BTS7960 RPWM/LPWM inputs for the right side.
    pub right_forward_pwm: u8,
    pub right_backward_pwm: u8,
    /// HC-SR04 facing forward.
    pub front_trigger: Option<u8>,
    pub front_echo: Option<u8>,
    /// HC-SR04 facing backward.
    pub rear_trigger: Option<u8>,
    pub rear_echo: Option<u8>,
    /// Physical reset switch (pulled up; pressed pulls low).
    pub reset_in: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Network {
    pub host: String,
    pub port: u16,
    /// Max pending decoded frames between the socket reader and the control loop.
    pub queue_depth: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9999,
            queue_depth: 32,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PowerCurve {
    /// Per-level duty table (`ramp.duty_table`).
    Linear,
    /// `duty = 100 * (level / 9)^2`.
    #[default]
    Quadratic,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Ramp {
    /// Duty points added per control tick while accelerating.
    pub increment: u8,
    /// Starting duty after a start from rest or a direction change.
    pub min_step: u8,
    pub curve: PowerCurve,
    /// Duty for each level 0..=9, used when `curve = "linear"`.
    pub duty_table: Vec<u8>,
}

impl Default for Ramp {
    fn default() -> Self {
        Self {
            increment: 5,
            min_step: 10,
            curve: PowerCurve::Quadratic,
            duty_table: vec![0, 15, 25, 35, 45, 55, 65, 75, 88, 100],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Control {
    /// Motion coordinator tick rate.
    pub tick_hz: u32,
}

impl Default for Control {
    fn default() -> Self {
        Self { tick_hz: 50 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Safety {
    /// Obstacle closer than or at this distance blocks that direction.
    pub threshold_cm: f32,
    /// Range sensor sampling rate (per direction).
    pub sample_hz: u32,
    /// Consecutive ticks with a failed actuator write before forcing a stop.
    pub max_actuator_failures: u8,
    /// Warn when no range sample succeeded for this long (0 disables).
    pub sensor_stall_ms: u64,
}

impl Default for Safety {
    fn default() -> Self {
        Self {
            threshold_cm: 20.0,
            sample_hz: 10,
            max_actuator_failures: 3,
            sensor_stall_ms: 3_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Hardware {
    /// PWM carrier frequency for the H-bridge inputs.
    pub pwm_freq_hz: f64,
    /// Max time to wait for an HC-SR04 echo.
    pub sensor_read_timeout_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            pwm_freq_hz: 1000.0,
            sensor_read_timeout_ms: 40,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResetCfg {
    /// Treat low level as pressed when true.
    pub active_low: bool,
    /// Consecutive pressed polls required before the session ends.
    pub debounce_n: u8,
    pub poll_ms: u64,
}

impl Default for ResetCfg {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_n: 2,
            poll_ms: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MotorBackend {
    /// BTS7960 H-bridges on GPIO PWM pins.
    #[default]
    Gpio,
    /// External microcontroller on a serial line.
    Serial,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotorSerial {
    pub backend: MotorBackend,
    /// Preferred port; tried before auto-discovered candidates.
    pub port: Option<String>,
    pub baud: u32,
}

impl Default for MotorSerial {
    fn default() -> Self {
        Self {
            backend: MotorBackend::Gpio,
            port: None,
            baud: 115_200,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub ramp: Ramp,
    #[serde(default)]
    pub control: Control,
    #[serde(default)]
    pub safety: Safety,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub reset: ResetCfg,
    #[serde(default)]
    pub motor_serial: MotorSerial,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_path(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        let p = &self.pins;
        let drive_pins = [
            p.left_forward_pwm,
            p.left_backward_pwm,
            p.right_forward_pwm,
            p.right_backward_pwm,
        ];
        for (i, a) in drive_pins.iter().enumerate() {
            if drive_pins[i + 1..].contains(a) {
                eyre::bail!("pins: motor PWM pin {a} assigned twice");
            }
        }
        if p.front_trigger.is_some() != p.front_echo.is_some() {
            eyre::bail!("pins: front_trigger and front_echo must be set together");
        }
        if p.rear_trigger.is_some() != p.rear_echo.is_some() {
            eyre::bail!("pins: rear_trigger and rear_echo must be set together");
        }

        // Network
        if self.network.queue_depth == 0 {
            eyre::bail!("network.queue_depth must be >= 1");
        }

        // Ramp
        if self.ramp.increment == 0 || self.ramp.increment > 100 {
            eyre::bail!("ramp.increment must be in [1, 100]");
        }
        if self.ramp.min_step == 0 || self.ramp.min_step > 100 {
            eyre::bail!("ramp.min_step must be in [1, 100]");
        }
        if self.ramp.curve == PowerCurve::Linear {
            let t = &self.ramp.duty_table;
            if t.len() != usize::from(LEVEL_MAX) + 1 {
                eyre::bail!(
                    "ramp.duty_table must have {} entries (levels 0..={}), got {}",
                    LEVEL_MAX + 1,
                    LEVEL_MAX,
                    t.len()
                );
            }
            if t.iter().any(|&d| d > 100) {
                eyre::bail!("ramp.duty_table entries must be <= 100");
            }
            if t.windows(2).any(|w| w[1] < w[0]) {
                eyre::bail!("ramp.duty_table must be non-decreasing");
            }
        }

        // Control
        if self.control.tick_hz == 0 || self.control.tick_hz > 1000 {
            eyre::bail!("control.tick_hz must be in [1, 1000]");
        }

        // Safety
        if !self.safety.threshold_cm.is_finite() || self.safety.threshold_cm <= 0.0 {
            eyre::bail!("safety.threshold_cm must be > 0");
        }
        if self.safety.threshold_cm > 400.0 {
            eyre::bail!("safety.threshold_cm is beyond sensor range (>400cm)");
        }
        if self.safety.sample_hz == 0 || self.safety.sample_hz > 50 {
            eyre::bail!("safety.sample_hz must be in [1, 50]");
        }
        if self.safety.max_actuator_failures == 0 {
            eyre::bail!("safety.max_actuator_failures must be >= 1");
        }

        // Hardware
        if !(self.hardware.pwm_freq_hz > 0.0) {
            eyre::bail!("hardware.pwm_freq_hz must be > 0");
        }
        if self.hardware.sensor_read_timeout_ms == 0 {
            eyre::bail!("hardware.sensor_read_timeout_ms must be >= 1");
        }

        // Reset switch
        if self.reset.debounce_n == 0 {
            eyre::bail!("reset.debounce_n must be >= 1");
        }
        if self.reset.poll_ms == 0 {
            eyre::bail!("reset.poll_ms must be >= 1");
        }

        // Serial motor controller
        if self.motor_serial.backend == MotorBackend::Serial && self.motor_serial.baud == 0 {
            eyre::bail!("motor_serial.baud must be > 0");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}
