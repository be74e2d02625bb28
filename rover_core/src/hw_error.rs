//! Maps `Box<dyn Error>` from trait boundaries to typed `RoverError`.
//!
//! `rover_traits` uses `Box<dyn Error + Send + Sync>` so any backend can plug
//! in; this module recovers a typed error for logging and fail-safe decisions,
//! with an optional feature-gated path for `rover_hardware::HwError`.

use crate::error::RoverError;

/// Map a trait-boundary error to a typed `RoverError`.
///
/// Known hardware error types are downcast first; anything else falls back
/// to string heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> RoverError {
    #[cfg(feature = "hardware-errors")]
    {
        use rover_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::EchoTimeout => RoverError::Timeout,
                other => RoverError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        RoverError::Timeout
    } else {
        RoverError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_maps_to_timeout() {
        let e = std::io::Error::other("echo Timeout on pin 8");
        assert!(matches!(map_hw_error(&e), RoverError::Timeout));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use rover_hardware::error::HwError;
        assert!(matches!(map_hw_error(&HwError::EchoTimeout), RoverError::Timeout));
        match map_hw_error(&HwError::NoSerialPort("/dev/ttyACM0".into())) {
            RoverError::HardwareFault(msg) => assert!(msg.contains("/dev/ttyACM0")),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn other_text_maps_to_hardware() {
        let e = std::io::Error::other("pwm channel busy");
        match map_hw_error(&e) {
            RoverError::Hardware(msg) => assert!(msg.contains("pwm channel busy")),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
