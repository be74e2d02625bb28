#![no_main]
use libfuzzer_sys::fuzz_target;

// Parse and validate arbitrary TOML; errors are fine, panics are not.
fuzz_target!(|data: &str| {
    if let Ok(cfg) = rover_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // A config that validates must also convert cleanly.
            let ramp = rover_core::RampCfg::from(&cfg.ramp);
            assert!(ramp.map.is_monotonic());
        }
    }
});
