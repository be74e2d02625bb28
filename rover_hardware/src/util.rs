use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until `read_level()` returns `want`, or fail with `EchoTimeout` once
/// `timeout` has elapsed. Returns the instant the level was observed.
///
/// A zero `poll_interval` spins instead of sleeping.
pub fn wait_for_level_with_timeout(
    mut read_level: impl FnMut() -> bool,
    want: bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Instant> {
    let deadline = Instant::now() + timeout;
    loop {
        if read_level() == want {
            return Ok(Instant::now());
        }
        if Instant::now() >= deadline {
            return Err(HwError::EchoTimeout);
        }
        if poll_interval.is_zero() {
            std::hint::spin_loop();
        } else {
            std::thread::sleep(poll_interval);
        }
    }
}

/// Width of one echo pulse. `timeout` bounds the whole measurement, both
/// edges included.
pub fn echo_pulse_with_timeout(
    mut read_level: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Duration> {
    let start = Instant::now();
    let rise = wait_for_level_with_timeout(&mut read_level, true, timeout, poll_interval)?;
    let remaining = timeout.saturating_sub(start.elapsed());
    let fall = wait_for_level_with_timeout(&mut read_level, false, remaining, poll_interval)?;
    Ok(fall.saturating_duration_since(rise))
}

/// Speed of sound, centimeters per microsecond (round trip halved).
const CM_PER_US_ROUND_TRIP: f32 = 0.0343 / 2.0;

/// Distance for an echo pulse of the given width.
#[inline]
pub fn echo_to_cm(pulse: Duration) -> f32 {
    pulse.as_micros() as f32 * CM_PER_US_ROUND_TRIP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_meter_echo() {
        let cm = echo_to_cm(Duration::from_micros(5831));
        assert!((cm - 100.0).abs() < 0.1, "got {cm}");
    }
}
