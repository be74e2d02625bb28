#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod drive;
mod error_fmt;
mod server;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use rover_core::RoverError;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::drive::{DriveOpts, DriveReport, stop_reason_name};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let _ = color_eyre::install();

    let cfg = rover_config::load_path(&cli.config)
        .map_err(|e| RoverError::Config(format!("{e:#}")))?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Drive {
            host,
            port,
            sim_front_cm,
            sim_rear_cm,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install signal handler");
            }
            let opts = DriveOpts {
                host,
                port,
                sim_front_cm,
                sim_rear_cm,
            };
            let report = drive::run_drive(&cfg, &opts, shutdown)?;
            print_report(cli.json, &report);
        }
        Commands::SelfCheck => {
            let readings = drive::self_check(&cfg)?;
            if cli.json {
                let sensors: serde_json::Map<String, serde_json::Value> = readings
                    .iter()
                    .map(|(facing, cm)| (facing.name().to_string(), serde_json::json!(cm)))
                    .collect();
                println!("{}", serde_json::json!({ "status": "ok", "sensors_cm": sensors }));
            } else {
                for (facing, cm) in &readings {
                    match cm {
                        Some(cm) => println!("{:<5} sensor: {cm:.1} cm", facing.name()),
                        None => println!("{:<5} sensor: no reading", facing.name()),
                    }
                }
                println!("self-check ok");
            }
        }
    }
    Ok(())
}

fn print_report(json: bool, report: &DriveReport) {
    let s = &report.summary.stats;
    let reason = stop_reason_name(report.summary.reason);
    if json {
        println!(
            "{}",
            serde_json::json!({
                "reason": reason,
                "ticks": s.ticks,
                "commands": s.commands,
                "rejected_frames": report.rejected_frames,
                "held": s.held,
                "suspensions": s.suspensions,
                "restores": s.restores,
                "actuator_failures": s.actuator_failures,
                "fail_safe_trips": s.fail_safe_trips,
                "sensor_stalls": report.summary.sensor_stalls,
            })
        );
    } else {
        println!(
            "session ended ({reason}): {} commands, {} rejected frames, {} hazard stops, {} restores, {} actuator failures",
            s.commands, report.rejected_frames, s.suspensions, s.restores, s.actuator_failures
        );
    }
}

/// Console layer on stderr (pretty or JSON) plus an optional JSON file layer.
///
/// Filter precedence: `RUST_LOG`, then `--log-level`, then `[logging] level`.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &rover_config::Logging,
) -> eyre::Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let mut layers = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
