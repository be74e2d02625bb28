//! Collaborator contracts shared by the rover crates.
//!
//! The motion core only ever talks to hardware through [`RangeSensor`] and
//! [`Actuator`]; concrete GPIO/serial/simulated backends live in
//! `rover_hardware`.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One of the two independently driven halves of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides in evaluation order (left first).
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Polarity of the signal sent to a motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    Forward,
    Backward,
    #[default]
    Stop,
}

/// One actuator update for one side: polarity plus duty cycle in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveSignal {
    pub polarity: Polarity,
    /// Duty cycle, 0..=100.
    pub duty: u8,
}

impl DriveSignal {
    pub const STOP: DriveSignal = DriveSignal {
        polarity: Polarity::Stop,
        duty: 0,
    };

    /// Signed duty in -100..=100 (negative = backward), as used by H-bridge
    /// and serial motor controllers.
    pub fn signed_duty(self) -> i16 {
        let d = i16::from(self.duty.min(100));
        match self.polarity {
            Polarity::Forward => d,
            Polarity::Backward => -d,
            Polarity::Stop => 0,
        }
    }
}

/// Distance sensor facing one direction of travel.
pub trait RangeSensor {
    /// Measure the distance to the nearest obstacle in centimeters.
    fn read_cm(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Motor driver for both drivetrain sides.
pub trait Actuator {
    fn apply(
        &mut self,
        side: Side,
        signal: DriveSignal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Put the driver into a safe idle state and free the underlying pins/port.
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: RangeSensor + ?Sized> RangeSensor for Box<T> {
    fn read_cm(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_cm(timeout)
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn apply(
        &mut self,
        side: Side,
        signal: DriveSignal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).apply(side, signal)
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).release()
    }
}
