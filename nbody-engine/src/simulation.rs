// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Step driver
//!
//! A [`Simulation`] owns the bodies, the force fields and the integrator,
//! and advances them one caller-supplied `dt` at a time:
//!
//! 1. accumulate every force field into the bodies' accelerations
//! 2. integrate positions and velocities
//! 3. respawn escaped bodies, if containment is configured
//! 4. reset every acceleration to zero
//!
//! Skipping step 4 would make forces pile up across steps, so the driver
//! always does it, including after a random kick has been consumed.
//!
//! The driver never allocates once the first step has sized its scratch
//! buffer, and two simulations built from the same bodies, fields, seed
//! and `dt` sequence produce identical states.

use crate::body::Vec3;
use crate::containment::{random_vec3, Containment};
use crate::error::{check_timestep, Result, SimulationError};
use crate::forces::{ForceSet, ForceStats};
use crate::integration::{Integrator, SemiImplicitEuler};
use crate::store::BodyStore;

/// Default seed for the driver's random source
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Outcome of one call to [`Simulation::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// False if the simulation was paused and nothing moved
    pub advanced: bool,
    /// Force accumulation statistics
    pub forces: ForceStats,
    /// Number of bodies respawned by containment
    pub respawned: usize,
    /// Simulation time after the step
    pub time: f64,
}

/// N-body simulation state and step driver
///
/// # Example
///
/// ```
/// use nbody_engine::forces::{ForceSet, Gravity};
/// use nbody_engine::scenario::Scenario;
/// use nbody_engine::Simulation;
///
/// let scenario = Scenario::TwoBodyCircular { m1: 1.0, m2: 1.0, separation: 1.0 };
/// let bodies = scenario.build(1.0, &mut fastrand::Rng::with_seed(1)).unwrap();
/// let mut sim = Simulation::new(bodies, ForceSet::new().with(Gravity::new(1.0)));
///
/// let report = sim.step(0.001).unwrap();
/// assert!(report.advanced);
/// assert_eq!(sim.step_count(), 1);
/// ```
pub struct Simulation {
    bodies: BodyStore,
    forces: ForceSet,
    integrator: Box<dyn Integrator>,
    containment: Option<Containment>,
    rng: fastrand::Rng,
    paused: bool,
    time: f64,
    step_count: u64,
    saved_accelerations: Vec<Vec3>,
}

impl Simulation {
    /// Create a simulation with the semi-implicit Euler integrator
    pub fn new(bodies: BodyStore, forces: ForceSet) -> Self {
        let capacity = bodies.len();
        Simulation {
            bodies,
            forces,
            integrator: Box::new(SemiImplicitEuler),
            containment: None,
            rng: fastrand::Rng::with_seed(DEFAULT_SEED),
            paused: false,
            time: 0.0,
            step_count: 0,
            saved_accelerations: Vec::with_capacity(capacity),
        }
    }

    /// Replace the integrator, builder style
    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.integrator = integrator;
        self
    }

    /// Enable containment, builder style
    pub fn with_containment(mut self, containment: Containment) -> Self {
        self.containment = Some(containment);
        self
    }

    /// Reseed the random source used by kicks and containment
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// The bodies
    pub fn bodies(&self) -> &BodyStore {
        &self.bodies
    }

    /// Mutable access to the bodies, e.g. to apply external forces
    pub fn bodies_mut(&mut self) -> &mut BodyStore {
        &mut self.bodies
    }

    /// The force fields
    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    /// Name of the active integrator
    pub fn integrator_name(&self) -> &str {
        self.integrator.name()
    }

    /// Elapsed simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Whether stepping is suspended
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspend or resume stepping
    pub fn set_paused(&mut self, paused: bool) {
        if paused != self.paused {
            log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Flip the paused state and return the new one
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    /// Kinetic plus potential energy of all fields
    pub fn total_energy(&self) -> f64 {
        self.bodies.kinetic_energy() + self.forces.potential_energy(&self.bodies)
    }

    /// Give every body a random acceleration for the next step
    ///
    /// Each body receives a force with components uniform in
    /// `[-scale, scale]`, converted to acceleration through its mass. The
    /// kick replaces any acceleration applied since the last step and is
    /// consumed by the next one.
    pub fn apply_random_kick(&mut self, scale: f64) -> Result<()> {
        crate::error::check_non_negative("kick scale", scale)?;
        for body in self.bodies.bodies_mut() {
            body.acceleration = random_vec3(&mut self.rng, scale) * body.mass.inverse();
        }
        Ok(())
    }

    /// Advance the simulation by `dt`
    ///
    /// Fails fast instead of letting NaN or infinity spread. If force
    /// accumulation fails, every body is left exactly as it was before the
    /// call, including accelerations applied for this step. If integration
    /// produces a non-finite state, the moved bodies are kept for
    /// inspection with their accelerations cleared, and neither `time` nor
    /// `step_count` advances.
    pub fn step(&mut self, dt: f64) -> Result<StepReport> {
        check_timestep(dt)?;

        if self.paused {
            return Ok(StepReport {
                advanced: false,
                forces: ForceStats::default(),
                respawned: 0,
                time: self.time,
            });
        }

        self.saved_accelerations.clear();
        self.saved_accelerations
            .extend(self.bodies.bodies().iter().map(|b| b.acceleration));

        let forces = match self.forces.accumulate(&mut self.bodies) {
            Ok(stats) => stats,
            Err(err) => {
                for (body, saved) in self
                    .bodies
                    .bodies_mut()
                    .iter_mut()
                    .zip(self.saved_accelerations.iter())
                {
                    body.acceleration = *saved;
                }
                log::warn!("Step {} aborted: {}", self.step_count, err);
                return Err(err);
            }
        };

        self.integrator.integrate(self.bodies.bodies_mut(), dt);

        if let Some(index) = self.bodies.first_invalid() {
            self.bodies.reset_accelerations();
            log::warn!("Step {} produced a non-finite state for body {}", self.step_count, index);
            return Err(SimulationError::NonFiniteState { index });
        }

        let respawned = match &self.containment {
            Some(containment) => containment.apply(&mut self.bodies, &mut self.rng),
            None => 0,
        };

        self.bodies.reset_accelerations();
        self.time += dt;
        self.step_count += 1;

        Ok(StepReport {
            advanced: true,
            forces,
            respawned,
            time: self.time,
        })
    }

    /// Advance `steps` times with a fixed `dt`
    ///
    /// Stops at the first error. Returns the report of the last step, or
    /// `None` if `steps` is zero.
    pub fn run(&mut self, steps: usize, dt: f64) -> Result<Option<StepReport>> {
        let mut last = None;
        for _ in 0..steps {
            last = Some(self.step(dt)?);
        }
        Ok(last)
    }
}
