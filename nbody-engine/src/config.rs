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
//! YAML run configuration
//!
//! A configuration file describes a complete run: initial conditions,
//! force fields, integrator, timestep and seed. Every key is optional and
//! unknown keys are rejected.
//!
//! ```yaml
//! version: "0.1.0"
//! seed: 42
//! timestep: 0.1
//! steps: 500
//! integrator: semi_implicit_euler
//! gravity:
//!   g_exponent: 4
//!   singularity:
//!     policy: soften
//!     epsilon: 0.05
//!   max_force: 1000.0
//! drag: 0.001
//! containment:
//!   radius: 15.0
//! scenario:
//!   kind: two_body_circular
//!   m1: 1.0
//!   m2: 1.0
//!   separation: 2.0
//! ```

use crate::containment::Containment;
use crate::error::{check_non_negative, Result, SimulationError};
use crate::forces::gravity::DEFAULT_PARALLEL_THRESHOLD;
use crate::forces::{Drag, ForceSet, Gravity, SingularityPolicy, GRAVITATIONAL_CONSTANT};
use crate::integration::{validate_timestep, IntegratorKind};
use crate::scenario::Scenario;
use crate::simulation::{Simulation, DEFAULT_SEED};
use semver::Version;
use serde::Deserialize;
use std::path::Path;

/// Version of the configuration format understood by this crate
pub const CONFIG_FORMAT_VERSION: &str = "0.1.0";

/// Gravity section of a configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GravityConfig {
    /// Gravitational constant
    pub g: Option<f64>,
    /// Alternative to `g`: use `G = 6.674 / 10^g_exponent`
    pub g_exponent: Option<f64>,
    /// Close-encounter policy
    pub singularity: SingularityPolicy,
    /// Optional limit on every pair force magnitude
    pub max_force: Option<f64>,
    /// Body count from which the parallel path is used
    pub parallel_threshold: usize,
}

impl Default for GravityConfig {
    fn default() -> Self {
        GravityConfig {
            g: None,
            g_exponent: None,
            singularity: SingularityPolicy::default(),
            max_force: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl GravityConfig {
    /// The gravitational constant this section resolves to
    pub fn resolved_g(&self) -> Result<f64> {
        match (self.g, self.g_exponent) {
            (Some(_), Some(_)) => Err(SimulationError::Config(
                "gravity.g and gravity.g_exponent are mutually exclusive".to_string(),
            )),
            (Some(g), None) => {
                check_non_negative("gravity.g", g)?;
                Ok(g)
            }
            (None, Some(exponent)) => {
                let g = 6.674 / 10f64.powf(exponent);
                if exponent.is_finite() && g.is_finite() {
                    Ok(g)
                } else {
                    Err(SimulationError::InvalidParameter {
                        name: "gravity.g_exponent",
                        value: exponent,
                    })
                }
            }
            (None, None) => Ok(GRAVITATIONAL_CONSTANT),
        }
    }

    fn validate(&self) -> Result<()> {
        self.resolved_g()?;
        self.singularity.validate()?;
        if let Some(max_force) = self.max_force {
            if !(max_force > 0.0 && max_force.is_finite()) {
                return Err(SimulationError::InvalidParameter {
                    name: "gravity.max_force",
                    value: max_force,
                });
            }
        }
        Ok(())
    }

    /// Build the gravity field this section describes
    pub fn build(&self) -> Result<Gravity> {
        self.validate()?;
        let mut gravity = Gravity::new(self.resolved_g()?)
            .with_policy(self.singularity)
            .with_parallel_threshold(self.parallel_threshold);
        if let Some(max_force) = self.max_force {
            gravity = gravity.with_max_force(max_force);
        }
        Ok(gravity)
    }
}

/// A complete simulation run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Configuration format version, see [`CONFIG_FORMAT_VERSION`]
    pub version: String,
    /// Seed for initial conditions, kicks and respawns
    pub seed: u64,
    /// Fixed timestep
    pub timestep: f64,
    /// Number of steps a driver should run
    pub steps: usize,
    /// Integration method
    pub integrator: IntegratorKind,
    /// Gravity settings
    pub gravity: GravityConfig,
    /// Linear drag factor, 0 disables drag
    pub drag: f64,
    /// Optional respawn policy for escaping bodies
    pub containment: Option<Containment>,
    /// Initial conditions
    pub scenario: Scenario,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            version: CONFIG_FORMAT_VERSION.to_string(),
            seed: DEFAULT_SEED,
            timestep: 0.1,
            steps: 1000,
            integrator: IntegratorKind::default(),
            gravity: GravityConfig::default(),
            drag: 0.0,
            containment: None,
            scenario: Scenario::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        log::info!(
            "Loaded {} scenario from {}",
            config.scenario.name(),
            path.display()
        );
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        if !is_version_compatible(&self.version, CONFIG_FORMAT_VERSION) {
            return Err(SimulationError::Config(format!(
                "configuration version {} is incompatible with format version {}",
                self.version, CONFIG_FORMAT_VERSION
            )));
        }
        validate_timestep(self.timestep)?;
        self.gravity.validate()?;
        check_non_negative("drag", self.drag)?;
        if let Some(containment) = &self.containment {
            containment.validate()?;
        }
        self.scenario.validate()
    }

    /// Build the simulation this configuration describes
    pub fn build(&self) -> Result<Simulation> {
        self.validate()?;

        let g = self.gravity.resolved_g()?;
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let bodies = self.scenario.build(g, &mut rng)?;

        let mut forces = ForceSet::new().with(self.gravity.build()?);
        if self.drag > 0.0 {
            forces = forces.with(Drag::new(self.drag));
        }

        let mut simulation = Simulation::new(bodies, forces)
            .with_integrator(self.integrator.build())
            .with_seed(self.seed);
        if let Some(containment) = self.containment {
            simulation = simulation.with_containment(containment);
        }

        log::info!(
            "Built {} scenario: {} bodies, G = {:.4e}, {}",
            self.scenario.name(),
            simulation.bodies().len(),
            g,
            simulation.integrator_name()
        );
        Ok(simulation)
    }
}

/// Check if a configuration version can be read by this crate
///
/// Major versions must match. Below 1.0 the minor version is treated as
/// breaking and must match too; from 1.0 on, older minors are accepted.
pub fn is_version_compatible(config_version: &str, format_version: &str) -> bool {
    let config_ver = match Version::parse(config_version) {
        Ok(v) => v,
        Err(_) => return false,
    };
    let format_ver = match Version::parse(format_version) {
        Ok(v) => v,
        Err(_) => return false,
    };

    if config_ver.major != format_ver.major {
        return false;
    }

    if config_ver.major != 0 {
        config_ver.minor <= format_ver.minor
    } else {
        config_ver.minor == format_ver.minor
    }
}
