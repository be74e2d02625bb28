//! HC-SR04 ultrasonic ranger.

use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use rover_traits::RangeSensor;

use crate::error::{HwError, Result};
use crate::util::{echo_pulse_with_timeout, echo_to_cm};

pub struct HcSr04 {
    trig: OutputPin,
    echo: InputPin,
}

impl HcSr04 {
    pub fn new(gpio: &Gpio, trig_pin: u8, echo_pin: u8) -> Result<Self> {
        let trig = gpio
            .get(trig_pin)
            .map_err(|e| HwError::Gpio(format!("open trigger pin {trig_pin}: {e}")))?
            .into_output_low();
        let echo = gpio
            .get(echo_pin)
            .map_err(|e| HwError::Gpio(format!("open echo pin {echo_pin}: {e}")))?
            .into_input();
        Ok(Self { trig, echo })
    }

    /// One ping, bounded by `timeout` from trigger to falling edge.
    pub fn measure(&mut self, timeout: Duration) -> Result<f32> {
        self.trig.set_low();
        std::thread::sleep(Duration::from_micros(2));
        self.trig.set_high();
        std::thread::sleep(Duration::from_micros(10));
        self.trig.set_low();

        let echo = &self.echo;
        let pulse = echo_pulse_with_timeout(|| echo.is_high(), timeout, Duration::ZERO)?;
        let cm = echo_to_cm(pulse);
        tracing::trace!(cm, "hc-sr04 sample");
        Ok(cm)
    }
}

impl RangeSensor for HcSr04 {
    fn read_cm(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        self.measure(timeout).map_err(Into::into)
    }
}
