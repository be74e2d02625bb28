//! Physical reset switch on a pulled-up GPIO input.

use std::sync::Mutex;

use crate::error::{HwError, Result};

/// Returns a closure reporting whether the switch is currently pressed.
/// Debouncing is left to the caller.
pub fn make_reset_checker(pin: u8, active_low: bool) -> Result<Box<dyn Fn() -> bool + Send + Sync>> {
    let input = crate::open_gpio()?
        .get(pin)
        .map_err(|e| HwError::Gpio(format!("open reset pin {pin}: {e}")))?
        .into_input_pullup();
    let input = Mutex::new(input);
    Ok(Box::new(move || {
        input
            .lock()
            .map(|p| if active_low { p.is_low() } else { p.is_high() })
            .unwrap_or(false)
    }))
}
