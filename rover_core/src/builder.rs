//! Type-state builder for `MotionCoordinator` and the generic
//! `build_coordinator` constructor.
//!
//! `build()` only exists once both the actuator and the hazard word are set.
//! `try_build()` is available in every state and reports what is missing.

use std::marker::PhantomData;

use rover_traits::Actuator;

use crate::config::{RampCfg, SafetyCfg};
use crate::coordinator::MotionCoordinator;
use crate::drivetrain::Drivetrain;
use crate::error::{BuildError, Result};
use crate::hazard::SharedHazards;
use crate::ramp::RampEngine;

/// Boxed coordinator used by the CLI, backend chosen at runtime.
pub type Coordinator = MotionCoordinator<Box<dyn Actuator + Send>>;

pub struct Missing;
pub struct Set;

pub struct CoordinatorBuilder<A, H> {
    actuator: Option<Box<dyn Actuator + Send>>,
    hazards: Option<SharedHazards>,
    ramp: Option<RampCfg>,
    safety: Option<SafetyCfg>,
    _a: PhantomData<A>,
    _h: PhantomData<H>,
}

impl Default for CoordinatorBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            actuator: None,
            hazards: None,
            ramp: None,
            safety: None,
            _a: PhantomData,
            _h: PhantomData,
        }
    }
}

impl Coordinator {
    pub fn builder() -> CoordinatorBuilder<Missing, Missing> {
        CoordinatorBuilder::default()
    }
}

fn validate(ramp: &RampCfg, safety: &SafetyCfg) -> Result<()> {
    if ramp.increment == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "ramp increment must be >= 1",
        )));
    }
    if ramp.min_step == 0 || ramp.min_step > 100 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "ramp min_step must be in [1, 100]",
        )));
    }
    if !ramp.map.is_monotonic() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "power map must be non-decreasing and within [0, 100]",
        )));
    }
    if safety.max_actuator_failures == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "max_actuator_failures must be >= 1",
        )));
    }
    Ok(())
}

impl<A, H> CoordinatorBuilder<A, H> {
    pub fn try_build(self) -> Result<Coordinator> {
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let hazards = self
            .hazards
            .ok_or_else(|| eyre::Report::new(BuildError::MissingHazards))?;
        build_coordinator(
            actuator,
            hazards,
            self.ramp.unwrap_or_default(),
            self.safety.unwrap_or_default(),
        )
    }

    pub fn with_ramp(mut self, ramp: RampCfg) -> Self {
        self.ramp = Some(ramp);
        self
    }

    pub fn with_safety(mut self, safety: SafetyCfg) -> Self {
        self.safety = Some(safety);
        self
    }
}

impl<H> CoordinatorBuilder<Missing, H> {
    pub fn with_actuator(
        self,
        actuator: impl Actuator + Send + 'static,
    ) -> CoordinatorBuilder<Set, H> {
        CoordinatorBuilder {
            actuator: Some(Box::new(actuator)),
            hazards: self.hazards,
            ramp: self.ramp,
            safety: self.safety,
            _a: PhantomData,
            _h: PhantomData,
        }
    }
}

impl<A> CoordinatorBuilder<A, Missing> {
    pub fn with_hazards(self, hazards: SharedHazards) -> CoordinatorBuilder<A, Set> {
        CoordinatorBuilder {
            actuator: self.actuator,
            hazards: Some(hazards),
            ramp: self.ramp,
            safety: self.safety,
            _a: PhantomData,
            _h: PhantomData,
        }
    }
}

impl CoordinatorBuilder<Set, Set> {
    pub fn build(self) -> Result<Coordinator> {
        self.try_build()
    }
}

/// Statically dispatched constructor for callers that know the actuator type.
pub fn build_coordinator<A: Actuator>(
    actuator: A,
    hazards: SharedHazards,
    ramp: RampCfg,
    safety: SafetyCfg,
) -> Result<MotionCoordinator<A>> {
    validate(&ramp, &safety)?;
    let drivetrain = Drivetrain::new(RampEngine::new(&ramp));
    Ok(MotionCoordinator::from_parts(
        drivetrain, actuator, hazards, safety,
    ))
}
