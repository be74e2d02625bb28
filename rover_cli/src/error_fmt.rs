//! Human-readable error descriptions and structured JSON error formatting.

use rover_core::error::{BuildError, RoverError};
use rover_hardware::error::HwError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuator => {
                "What happened: No motor driver was provided to the motion coordinator.\nLikely causes: The motor backend failed to initialize or was not wired into the builder.\nHow to fix: Check [motor_serial] and [pins] in the config and rerun `rover self-check`.".to_string()
            }
            BuildError::MissingHazards => {
                "What happened: The motion coordinator was built without hazard flags.\nLikely causes: Internal wiring error.\nHow to fix: Re-run with --log-level=debug and report the output.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in [ramp] or [safety].\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(re) = err.downcast_ref::<RoverError>() {
        return match re {
            RoverError::Config(msg) => format!(
                "What happened: Configuration could not be loaded.\nLikely causes: {msg}\nHow to fix: Pass --config with a valid TOML file; etc/rover_config.toml is a working sample."
            ),
            RoverError::Timeout => "What happened: A range sensor did not answer in time.\nLikely causes: HC-SR04 trigger/echo pins swapped, no 5V, or the timeout configured too low.\nHow to fix: Verify [pins] and wiring, and consider raising hardware.sensor_read_timeout_ms.".to_string(),
            RoverError::ActuatorFailSafe(n) => format!(
                "What happened: Motor writes failed on {n} consecutive ticks and the rover was stopped.\nLikely causes: Motor controller unplugged, serial link lost, or PWM unavailable.\nHow to fix: Check the motor controller connection and power, then start a new session."
            ),
            RoverError::Hardware(_) | RoverError::HardwareFault(_) => format!(
                "What happened: {re}.\nLikely causes: Motor controller or GPIO access failed.\nHow to fix: Check wiring and permissions; re-run with --log-level=debug for detail."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::NoSerialPort(tried) => format!(
                "What happened: No serial motor controller could be opened.\nLikely causes: Controller unplugged or the port is busy (tried {tried}).\nHow to fix: Plug the controller in, set motor_serial.port, or switch motor_serial.backend to \"gpio\"."
            ),
            HwError::Gpio(_) | HwError::Pwm(_) => format!(
                "What happened: Failed to initialize GPIO ({hw}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process may access /dev/gpiomem and PWM."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("bind command listener") {
        return format!(
            "What happened: Could not listen for operator commands.\nLikely causes: Port already in use or address not available ({msg}).\nHow to fix: Stop the other process or pass --port/--host."
        );
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 1 generic, 3 configuration, 4 hardware, 5 network.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 3;
    }
    if let Some(re) = err.downcast_ref::<RoverError>() {
        return match re {
            RoverError::Config(_) => 3,
            _ => 4,
        };
    }
    if err.downcast_ref::<HwError>().is_some() {
        return 4;
    }
    if err.to_string().contains("bind command listener") {
        return 5;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        3 => "Config",
        4 => "Hardware",
        5 => "Network",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(eyre::Report::new(RoverError::Config("bad".into())), 3, "Configuration")]
    #[case(eyre::Report::new(BuildError::InvalidConfig("ramp.increment")), 3, "ramp.increment")]
    #[case(eyre::Report::new(RoverError::ActuatorFailSafe(3)), 4, "3 consecutive")]
    #[case(eyre::Report::new(HwError::NoSerialPort("/dev/ttyACM0".into())), 4, "/dev/ttyACM0")]
    #[case(eyre::eyre!("bind command listener 0.0.0.0:9999: in use"), 5, "--port")]
    #[case(eyre::eyre!("boom"), 1, "Something went wrong")]
    fn errors_map_to_codes_and_text(
        #[case] err: eyre::Report,
        #[case] code: i32,
        #[case] needle: &str,
    ) {
        assert_eq!(exit_code_for_error(&err), code);
        assert!(humanize(&err).contains(needle), "{}", humanize(&err));
    }

    #[test]
    fn json_error_has_reason_and_message() {
        let err = eyre::Report::new(RoverError::Config("missing [pins]".into()));
        let v: serde_json::Value =
            serde_json::from_str(&format_error_json(&err)).expect("valid json");
        assert_eq!(v["reason"], "Config");
        assert_eq!(v["exit_code"], 3);
        assert!(v["message"].as_str().is_some_and(|m| m.contains("missing [pins]")));
    }
}
