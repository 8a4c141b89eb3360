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
//! Force accumulation
//!
//! Force fields add their contribution to each body's accumulated
//! acceleration. A [`ForceSet`] runs every registered field in registration
//! order and validates the result, so an integrator only ever sees finite
//! accelerations.

use crate::body::Body;
use crate::error::{Result, SimulationError};
use crate::store::BodyStore;

pub mod drag;
pub mod gravity;

pub use drag::Drag;
pub use gravity::{Gravity, SingularityPolicy, GRAVITATIONAL_CONSTANT};

/// Summary of the work done by one accumulation pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceStats {
    /// Number of unordered body pairs evaluated
    pub pairs: usize,
    /// Number of pair forces limited by a maximum force
    pub clamped: usize,
    /// Largest pair force magnitude seen, before clamping
    pub max_force: f64,
}

impl ForceStats {
    /// Combine the statistics of two passes
    pub fn merge(&mut self, other: &ForceStats) {
        self.pairs += other.pairs;
        self.clamped += other.clamped;
        self.max_force = self.max_force.max(other.max_force);
    }
}

/// A source of acceleration acting on a set of bodies
///
/// Implementations add into `Body::acceleration`; they never overwrite it
/// and never touch positions or velocities. If `accumulate` fails part of
/// the accelerations may already have been written; [`Simulation`](crate::Simulation)
/// restores them before reporting the error.
pub trait ForceField: Send + Sync {
    /// Descriptive name used in logs
    fn name(&self) -> &str;

    /// Add this field's contribution to every body's acceleration
    fn accumulate(&mut self, bodies: &mut [Body]) -> Result<ForceStats>;

    /// Potential energy of the configuration under this field
    ///
    /// Dissipative fields have none and keep the default.
    fn potential_energy(&self, _bodies: &[Body]) -> f64 {
        0.0
    }
}

/// Ordered collection of force fields
#[derive(Default)]
pub struct ForceSet {
    fields: Vec<Box<dyn ForceField>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        ForceSet { fields: Vec::new() }
    }

    /// Add a field, builder style
    pub fn with<F>(mut self, field: F) -> Self
    where
        F: ForceField + 'static,
    {
        self.fields.push(Box::new(field));
        self
    }

    /// Register a field
    pub fn register(&mut self, field: Box<dyn ForceField>) {
        self.fields.push(field);
    }

    /// Number of registered fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field is registered
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the registered fields, in evaluation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    /// Run every field and check the accumulated accelerations
    ///
    /// Fails with [`SimulationError::NonFiniteState`] if any acceleration is
    /// NaN or infinite after all fields ran.
    pub fn accumulate(&mut self, store: &mut BodyStore) -> Result<ForceStats> {
        let mut stats = ForceStats::default();

        for field in &mut self.fields {
            let field_stats = field.accumulate(store.bodies_mut())?;
            if field_stats.clamped > 0 {
                log::debug!(
                    "{}: clamped {} of {} pair forces (peak {:.3e})",
                    field.name(),
                    field_stats.clamped,
                    field_stats.pairs,
                    field_stats.max_force
                );
            }
            stats.merge(&field_stats);
        }

        if let Some(index) = store
            .bodies()
            .iter()
            .position(|b| !b.acceleration.is_valid())
        {
            log::warn!("Non-finite acceleration accumulated for body {}", index);
            return Err(SimulationError::NonFiniteState { index });
        }

        Ok(stats)
    }

    /// Sum of the potential energies of all fields
    pub fn potential_energy(&self, store: &BodyStore) -> f64 {
        self.fields
            .iter()
            .map(|f| f.potential_energy(store.bodies()))
            .sum()
    }
}
