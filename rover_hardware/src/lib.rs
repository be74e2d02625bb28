//! Sensor and motor backends for the rover.
//!
//! Simulated backends and the serial line helpers are always built. The GPIO
//! drivers need the `hardware` feature on Linux.

pub mod error;
pub mod serial;
pub mod sim;
pub mod util;

pub use sim::{SimulatedActuator, SimulatedRangeSensor};

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod bts7960;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hc_sr04;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod reset;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use bts7960::{DrivePins, GpioDrive};
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hc_sr04::HcSr04;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use serial::SerialMotorController;

/// Shared GPIO handle for the drivers above.
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn open_gpio() -> error::Result<rppal::gpio::Gpio> {
    rppal::gpio::Gpio::new().map_err(|e| error::HwError::Gpio(e.to_string()))
}
