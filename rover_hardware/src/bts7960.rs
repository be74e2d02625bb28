//! BTS7960 H-bridge: one PWM input per rotation sense.

use rppal::gpio::{Gpio, OutputPin};
use rover_traits::{Actuator, DriveSignal, Polarity, Side};

use crate::error::{HwError, Result};

/// BCM pins for both bridges.
#[derive(Debug, Clone, Copy)]
pub struct DrivePins {
    pub left_forward: u8,
    pub left_backward: u8,
    pub right_forward: u8,
    pub right_backward: u8,
}

pub struct Bts7960 {
    forward: OutputPin,
    backward: OutputPin,
    freq_hz: f64,
}

fn open_output(gpio: &Gpio, pin: u8) -> Result<OutputPin> {
    Ok(gpio
        .get(pin)
        .map_err(|e| HwError::Gpio(format!("open motor pin {pin}: {e}")))?
        .into_output_low())
}

fn idle(pin: &mut OutputPin) -> Result<()> {
    pin.clear_pwm().map_err(|e| HwError::Pwm(e.to_string()))?;
    pin.set_low();
    Ok(())
}

impl Bts7960 {
    pub fn new(gpio: &Gpio, forward_pin: u8, backward_pin: u8, freq_hz: f64) -> Result<Self> {
        Ok(Self {
            forward: open_output(gpio, forward_pin)?,
            backward: open_output(gpio, backward_pin)?,
            freq_hz,
        })
    }

    pub fn set(&mut self, signal: DriveSignal) -> Result<()> {
        let duty = f64::from(signal.duty.min(100)) / 100.0;
        let (active, other) = match signal.polarity {
            Polarity::Forward => (&mut self.forward, &mut self.backward),
            Polarity::Backward => (&mut self.backward, &mut self.forward),
            Polarity::Stop => {
                idle(&mut self.forward)?;
                return idle(&mut self.backward);
            }
        };
        // Release the opposite input first so both are never driven together.
        idle(other)?;
        active
            .set_pwm_frequency(self.freq_hz, duty)
            .map_err(|e| HwError::Pwm(e.to_string()))
    }
}

/// Both drivetrain sides on BTS7960 bridges.
pub struct GpioDrive {
    sides: [Bts7960; 2],
}

impl GpioDrive {
    pub fn new(pins: DrivePins, freq_hz: f64) -> Result<Self> {
        let gpio = crate::open_gpio()?;
        Ok(Self {
            sides: [
                Bts7960::new(&gpio, pins.left_forward, pins.left_backward, freq_hz)?,
                Bts7960::new(&gpio, pins.right_forward, pins.right_backward, freq_hz)?,
            ],
        })
    }
}

impl Actuator for GpioDrive {
    fn apply(
        &mut self,
        side: Side,
        signal: DriveSignal,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sides[side.index()].set(signal).map_err(Into::into)
    }

    fn release(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for bridge in &mut self.sides {
            bridge.set(DriveSignal::STOP)?;
        }
        Ok(())
    }
}
