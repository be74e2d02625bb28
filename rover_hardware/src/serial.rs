//! Serial motor controller: one text line per side update.
//!
//! Line format is `L:<duty>\n` / `R:<duty>\n` with a signed duty in
//! -100..=100 (negative = backward).

use std::path::{Path, PathBuf};

use rover_traits::{DriveSignal, Side};

/// Device-node prefixes tried after the configured port, in order.
const PORT_PREFIXES: [&str; 3] = ["ttyACM", "ttyUSB", "ttyAMA"];

pub fn format_line(side: Side, signal: DriveSignal) -> String {
    let tag = match side {
        Side::Left => 'L',
        Side::Right => 'R',
    };
    format!("{tag}:{}\n", signal.signed_duty())
}

fn sorted_entries(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<PathBuf> = rd
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_str().is_some_and(&keep))
        .map(|e| e.path())
        .collect();
    out.sort();
    out
}

/// Ports to try, most specific first: the configured one, stable
/// `/dev/serial/by-id` links, then ACM/USB/AMA device nodes. No duplicates.
pub fn candidate_ports(configured: Option<&str>, dev_root: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    if let Some(p) = configured {
        out.push(PathBuf::from(p));
    }
    out.extend(sorted_entries(&dev_root.join("serial").join("by-id"), |_| true));
    for prefix in PORT_PREFIXES {
        out.extend(sorted_entries(dev_root, |name| name.starts_with(prefix)));
    }
    let mut seen = std::collections::HashSet::new();
    out.retain(|p| seen.insert(p.clone()));
    out
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use uart::SerialMotorController;

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod uart {
    use std::path::{Path, PathBuf};

    use rppal::uart::{Parity, Uart};
    use rover_traits::{Actuator, DriveSignal, Side};

    use super::{candidate_ports, format_line};
    use crate::error::{HwError, Result};

    pub struct SerialMotorController {
        uart: Uart,
        port: PathBuf,
    }

    impl SerialMotorController {
        /// Open the first candidate port that accepts the line settings.
        pub fn open(configured: Option<&str>, baud: u32) -> Result<Self> {
            let candidates = candidate_ports(configured, Path::new("/dev"));
            for port in &candidates {
                match Uart::with_path(port, baud, Parity::None, 8, 1) {
                    Ok(uart) => {
                        tracing::info!(port = %port.display(), baud, "serial motor controller opened");
                        return Ok(Self {
                            uart,
                            port: port.clone(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(port = %port.display(), error = %e, "serial port unusable");
                    }
                }
            }
            let tried = candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(HwError::NoSerialPort(if tried.is_empty() {
                "nothing".to_string()
            } else {
                tried
            }))
        }

        pub fn port(&self) -> &Path {
            &self.port
        }

        fn send(&mut self, side: Side, signal: DriveSignal) -> Result<()> {
            let line = format_line(side, signal);
            let n = self
                .uart
                .write(line.as_bytes())
                .map_err(|e| HwError::Serial(e.to_string()))?;
            if n != line.len() {
                return Err(HwError::Serial(format!(
                    "short write ({n} of {} bytes)",
                    line.len()
                )));
            }
            Ok(())
        }
    }

    impl Actuator for SerialMotorController {
        fn apply(
            &mut self,
            side: Side,
            signal: DriveSignal,
        ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.send(side, signal).map_err(Into::into)
        }

        fn release(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            for side in Side::BOTH {
                self.send(side, DriveSignal::STOP)?;
            }
            Ok(())
        }
    }
}
