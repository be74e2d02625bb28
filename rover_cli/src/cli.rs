//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rover", version, about = "Rover motion controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/rover_config.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Accept operator commands over TCP and drive until reset or signal
    Drive {
        /// Address to listen on (overrides network.host)
        #[arg(long)]
        host: Option<String>,
        /// TCP port to listen on (overrides network.port)
        #[arg(long)]
        port: Option<u16>,
        /// Simulated front obstacle distance in cm (simulation backend only)
        #[arg(long, value_name = "CM")]
        sim_front_cm: Option<f32>,
        /// Simulated rear obstacle distance in cm (simulation backend only)
        #[arg(long, value_name = "CM")]
        sim_rear_cm: Option<f32>,
    },
    /// Validate config, bring up backends and command a stop on both sides
    SelfCheck,
}
