#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Motion arbitration and ramp engine (hardware-agnostic).
//!
//! All hardware access goes through `rover_traits::Actuator` and
//! `rover_traits::RangeSensor`.
//!
//! ## Architecture
//!
//! - **Ramp**: power level → duty mapping and slew limiting (`ramp`)
//! - **Sides**: per-side state, drive/stop/advance (`side`, `drivetrain`)
//! - **Safety**: hazard word, sampler thread, save/restore arbiter
//!   (`hazard`, `sampler`, `arbiter`)
//! - **Coordinator**: the tick pipeline and change-only actuator writes
//!   (`coordinator`, `sink`)
//! - **Protocol**: closed command types and the stream decoder (`command`)
//! - **Runner**: paced loop with reset/shutdown handling (`runner`)
//!
//! Hazard changes reach the motors on the next tick after the sampler
//! publishes them; latency is bounded by one sampling interval plus one tick.

pub mod arbiter;
pub mod builder;
pub mod command;
pub mod config;
pub mod conversions;
pub mod coordinator;
pub mod drivetrain;
pub mod error;
pub mod hazard;
pub mod hw_error;
pub mod mocks;
pub mod ramp;
pub mod runner;
pub mod sampler;
pub mod side;
pub mod sink;
pub mod status;
pub mod util;

pub use builder::{Coordinator, CoordinatorBuilder, build_coordinator};
pub use command::{Action, DecodeError, Frame, FrameDecoder, MotionCommand};
pub use config::{RampCfg, SafetyCfg, SamplerCfg};
pub use coordinator::MotionCoordinator;
pub use error::{BuildError, Result, RoverError};
pub use hazard::{Facing, HazardFlags, SharedHazards};
pub use ramp::{PowerLevel, PowerMap};
pub use runner::{RunParams, RunSummary, StopReason};
pub use sampler::HazardSampler;
pub use side::{Direction, SavedMotion};
pub use status::{SessionStats, TickStatus};
