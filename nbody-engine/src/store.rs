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
//! Contiguous storage for simulation bodies
//!
//! The store owns every body of a run. Bodies are appended while a scenario
//! is being built and are never removed afterwards, so indices are stable
//! for the lifetime of the store and can be used to report errors.

use crate::body::{Body, Vec3};

/// Owned, contiguous collection of bodies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyStore {
    bodies: Vec<Body>,
}

impl BodyStore {
    /// Create an empty store
    pub fn new() -> Self {
        BodyStore { bodies: Vec::new() }
    }

    /// Create an empty store with room for `capacity` bodies
    pub fn with_capacity(capacity: usize) -> Self {
        BodyStore {
            bodies: Vec::with_capacity(capacity),
        }
    }

    /// Append a body and return its index
    pub fn push(&mut self, body: Body) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if the store has no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Get a body by index
    pub fn get(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Get a mutable body by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// All bodies as a slice
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// All bodies as a mutable slice
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Iterate over body positions, e.g. to feed a renderer
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.bodies.iter().map(|b| b.position)
    }

    /// Zero the accumulated acceleration of every body
    pub fn reset_accelerations(&mut self) {
        for body in &mut self.bodies {
            body.acceleration = Vec3::zero();
        }
    }

    /// Index of the first body whose state is NaN or infinite
    pub fn first_invalid(&self) -> Option<usize> {
        self.bodies.iter().position(|b| !b.is_valid())
    }

    /// Sum of all masses
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass.value()).sum()
    }

    /// Unweighted mean of all positions
    ///
    /// Returns the origin for an empty store.
    pub fn position_average(&self) -> Vec3 {
        if self.bodies.is_empty() {
            return Vec3::zero();
        }
        let sum = self.bodies.iter().fold(Vec3::zero(), |acc, b| acc + b.position);
        sum / self.bodies.len() as f64
    }

    /// Mass-weighted mean of all positions
    ///
    /// Returns the origin for an empty store.
    pub fn center_of_mass(&self) -> Vec3 {
        let total = self.total_mass();
        if total == 0.0 {
            return Vec3::zero();
        }
        let weighted = self
            .bodies
            .iter()
            .fold(Vec3::zero(), |acc, b| acc + b.position * b.mass.value());
        weighted / total
    }

    /// Total linear momentum
    pub fn total_momentum(&self) -> Vec3 {
        self.bodies.iter().fold(Vec3::zero(), |acc, b| acc + b.momentum())
    }

    /// Total kinetic energy
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Newtonian gravitational potential energy, -G Σ mᵢmⱼ/r over unique pairs
    ///
    /// Coincident pairs are skipped. See
    /// [`Gravity::potential_energy`](crate::forces::Gravity::potential_energy)
    /// for the energy consistent with a softened force law.
    pub fn potential_energy(&self, g: f64) -> f64 {
        let mut energy = 0.0;
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                let r = (a.position - b.position).magnitude();
                if r > 0.0 {
                    energy -= g * a.mass.value() * b.mass.value() / r;
                }
            }
        }
        energy
    }
}

impl From<Vec<Body>> for BodyStore {
    fn from(bodies: Vec<Body>) -> Self {
        BodyStore { bodies }
    }
}

impl FromIterator<Body> for BodyStore {
    fn from_iter<I: IntoIterator<Item = Body>>(iter: I) -> Self {
        BodyStore {
            bodies: iter.into_iter().collect(),
        }
    }
}
