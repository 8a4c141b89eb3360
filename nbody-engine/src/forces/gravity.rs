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
//! Pairwise Newtonian gravity
//!
//! Every point mass attracts every other point mass with a force
//! proportional to the product of their masses and inversely proportional
//! to the square of their distance:
//!
//! **F = G * (m₁ * m₂) / r²**
//!
//! # Pair evaluation
//!
//! For N bodies there are N*(N-1)/2 unordered pairs. The sequential path
//! visits each pair once and applies the force to both members with
//! opposite sign (Newton's third law). With the `parallel` feature and a
//! body count at or above [`Gravity::parallel_threshold`], each body instead
//! sums the pull of all others on a Rayon worker. Both paths add the same
//! terms in the same order per body, so they agree exactly. Both report
//! the lowest failing pair `(i, j)` when a close encounter aborts the pass.
//!
//! # Close encounters
//!
//! As r → 0 the force diverges. [`SingularityPolicy`] decides what happens:
//! fail the step, clamp the distance, or soften the law with a Plummer
//! length ε:
//!
//! **F = G * (m₁ * m₂) / (r² + ε²)**
//!
//! See Aarseth, S. J. (2003). "Gravitational N-Body Simulations".

use super::{ForceField, ForceStats};
use crate::body::{Body, Vec3};
use crate::error::{check_non_negative, Result, SimulationError};
use serde::Deserialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Standard gravitational constant in SI units (m³/(kg⋅s²))
///
/// CODATA 2018 recommended value: 6.67430(15) × 10⁻¹¹ m³/(kg⋅s²)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// Default minimum separation for the distance-based policies
pub const DEFAULT_MIN_DISTANCE: f64 = 1e-9;

/// Default body count from which the parallel path is used
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Behaviour when two bodies get arbitrarily close
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case", deny_unknown_fields)]
pub enum SingularityPolicy {
    /// Abort the step with [`SimulationError::CoincidentBodies`]
    Fail {
        /// Separation below which the step fails
        min_distance: f64,
    },
    /// Evaluate the magnitude at no less than `min_distance`
    ///
    /// Exactly coincident bodies have no direction and exert no force.
    Clamp {
        /// Smallest distance used in the force law
        min_distance: f64,
    },
    /// Plummer softening with length `epsilon`
    Soften {
        /// Softening length
        epsilon: f64,
    },
}

impl SingularityPolicy {
    /// Check the policy parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            SingularityPolicy::Fail { min_distance } | SingularityPolicy::Clamp { min_distance } => {
                if min_distance > 0.0 && min_distance.is_finite() {
                    Ok(())
                } else {
                    Err(SimulationError::InvalidParameter {
                        name: "min_distance",
                        value: min_distance,
                    })
                }
            }
            SingularityPolicy::Soften { epsilon } => check_non_negative("epsilon", epsilon),
        }
    }
}

impl Default for SingularityPolicy {
    fn default() -> Self {
        SingularityPolicy::Fail {
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

/// Force exerted on the second body of a pair by the first
#[derive(Debug, Clone, Copy)]
struct PairForce {
    force: Vec3,
    magnitude: f64,
    clamped: bool,
}

/// Per-body accumulator for the parallel path
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
struct Contribution {
    acceleration: Vec3,
    clamped: usize,
    max_force: f64,
}

/// Newtonian gravity between every pair of bodies
///
/// # Example
///
/// ```
/// use nbody_engine::forces::{Gravity, SingularityPolicy};
///
/// // Demo-scale constant, softened close encounters
/// let gravity = Gravity::from_exponent(3.0)
///     .with_policy(SingularityPolicy::Soften { epsilon: 0.05 })
///     .with_max_force(100.0);
/// assert!((gravity.g() - 6.674e-3).abs() < 1e-12);
/// ```
pub struct Gravity {
    g: f64,
    policy: SingularityPolicy,
    max_force: Option<f64>,
    parallel_threshold: usize,
    #[cfg(feature = "parallel")]
    scratch: Vec<Contribution>,
}

impl Gravity {
    /// Create gravity with the given constant
    ///
    /// # Panics
    ///
    /// Panics if `g` is negative or not finite.
    pub fn new(g: f64) -> Self {
        assert!(
            g >= 0.0 && g.is_finite(),
            "Gravitational constant must be non-negative and finite"
        );
        Gravity {
            g,
            policy: SingularityPolicy::default(),
            max_force: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            #[cfg(feature = "parallel")]
            scratch: Vec::new(),
        }
    }

    /// Create gravity, rejecting an invalid constant
    pub fn try_new(g: f64) -> Result<Self> {
        check_non_negative("g", g)?;
        Ok(Self::new(g))
    }

    /// Create gravity with `G = 6.674 / 10^exponent`
    ///
    /// An exponent of 11 gives the physical constant; smaller exponents make
    /// demo-scale clouds interesting at interactive timesteps.
    pub fn from_exponent(exponent: f64) -> Self {
        Self::new(6.674 / 10f64.powf(exponent))
    }

    /// Gravity with the physical constant
    pub fn standard() -> Self {
        Self::new(GRAVITATIONAL_CONSTANT)
    }

    /// Set the close-encounter policy, builder style
    ///
    /// # Panics
    ///
    /// Panics if the policy parameters are invalid.
    pub fn with_policy(mut self, policy: SingularityPolicy) -> Self {
        self.set_policy(policy);
        self
    }

    /// Set the close-encounter policy
    ///
    /// # Panics
    ///
    /// Panics if the policy parameters are invalid.
    pub fn set_policy(&mut self, policy: SingularityPolicy) {
        assert!(policy.validate().is_ok(), "Singularity policy parameters must be positive and finite");
        self.policy = policy;
    }

    /// Limit every pair force magnitude, builder style
    ///
    /// # Panics
    ///
    /// Panics if `max_force` is not positive and finite.
    pub fn with_max_force(mut self, max_force: f64) -> Self {
        assert!(
            max_force > 0.0 && max_force.is_finite(),
            "Maximum force must be positive and finite"
        );
        self.max_force = Some(max_force);
        self
    }

    /// Set the body count from which the parallel path is used
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Gravitational constant
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Close-encounter policy
    pub fn policy(&self) -> SingularityPolicy {
        self.policy
    }

    /// Pair force limit, if any
    pub fn max_force(&self) -> Option<f64> {
        self.max_force
    }

    /// Body count from which the parallel path is used
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Force on body `j` from body `i`, with `d = p_i - p_j`
    ///
    /// `i` and `j` only label errors. Returns `None` when the pair exerts no
    /// force (coincident bodies under a non-failing policy).
    fn pair_force(&self, i: usize, j: usize, d: Vec3, mi: f64, mj: f64) -> Result<Option<PairForce>> {
        let r_squared = d.magnitude_squared();
        let r = r_squared.sqrt();

        let (magnitude, direction) = match self.policy {
            SingularityPolicy::Fail { min_distance } => {
                if r < min_distance {
                    return Err(SimulationError::CoincidentBodies { i, j, distance: r });
                }
                (self.g * mi * mj / r_squared, d / r)
            }
            SingularityPolicy::Clamp { min_distance } => {
                if r == 0.0 {
                    return Ok(None);
                }
                let rc = r.max(min_distance);
                (self.g * mi * mj / (rc * rc), d / r)
            }
            SingularityPolicy::Soften { epsilon } => {
                let softened = r_squared + epsilon * epsilon;
                if softened == 0.0 {
                    return Ok(None);
                }
                // Plummer direction d / sqrt(r² + ε²)
                (self.g * mi * mj / softened, d / softened.sqrt())
            }
        };

        let (applied, clamped) = match self.max_force {
            Some(max) if magnitude > max => (max, true),
            _ => (magnitude, false),
        };

        Ok(Some(PairForce {
            force: direction * applied,
            magnitude,
            clamped,
        }))
    }

    fn accumulate_pairwise(&self, bodies: &mut [Body]) -> Result<ForceStats> {
        let n = bodies.len();
        let mut stats = ForceStats::default();

        for i in 0..n {
            for j in (i + 1)..n {
                let d = bodies[i].position - bodies[j].position;
                let (mi, mj) = (bodies[i].mass.value(), bodies[j].mass.value());
                stats.pairs += 1;

                if let Some(pair) = self.pair_force(i, j, d, mi, mj)? {
                    bodies[j].apply_force(pair.force);
                    bodies[i].apply_force(-pair.force);
                    stats.max_force = stats.max_force.max(pair.magnitude);
                    if pair.clamped {
                        stats.clamped += 1;
                    }
                }
            }
        }

        Ok(stats)
    }

    #[cfg(feature = "parallel")]
    fn accumulate_parallel(&mut self, bodies: &mut [Body]) -> Result<ForceStats> {
        let n = bodies.len();
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.extend(bodies.iter().map(|b| Contribution {
            acceleration: b.acceleration,
            ..Contribution::default()
        }));

        let snapshot: &[Body] = bodies;
        let this = &*self;
        let result = scratch
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(k, out)| -> Result<()> {
                let body = &snapshot[k];
                for other in 0..n {
                    if other == k {
                        continue;
                    }
                    // Same pair orientation as the sequential loop: (low, high)
                    let (lo, hi) = if other < k { (other, k) } else { (k, other) };
                    let d = snapshot[lo].position - snapshot[hi].position;
                    let pair = this.pair_force(lo, hi, d, snapshot[lo].mass.value(), snapshot[hi].mass.value())?;
                    if let Some(pair) = pair {
                        let force = if k == hi { pair.force } else { -pair.force };
                        out.acceleration += force * body.mass.inverse();
                        out.max_force = out.max_force.max(pair.magnitude);
                        if pair.clamped {
                            out.clamped += 1;
                        }
                    }
                }
                Ok(())
            });

        let stats = result.map(|()| {
            let mut stats = ForceStats {
                pairs: n * n.saturating_sub(1) / 2,
                ..ForceStats::default()
            };
            for (body, contribution) in bodies.iter_mut().zip(scratch.iter()) {
                body.acceleration = contribution.acceleration;
                stats.clamped += contribution.clamped;
                stats.max_force = stats.max_force.max(contribution.max_force);
            }
            // Each clamped pair was seen from both ends
            stats.clamped /= 2;
            stats
        });

        self.scratch = scratch;
        // Workers stop at whichever failure they meet first
        stats.map_err(|err| self.first_pair_error(bodies).err().unwrap_or(err))
    }

    /// Evaluate pairs in sequential order and return the first failure
    #[cfg(feature = "parallel")]
    fn first_pair_error(&self, bodies: &[Body]) -> Result<()> {
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let d = bodies[i].position - bodies[j].position;
                self.pair_force(i, j, d, bodies[i].mass.value(), bodies[j].mass.value())?;
            }
        }
        Ok(())
    }

    /// Potential energy consistent with the configured force law
    ///
    /// Coincident pairs contribute nothing. The force limit is ignored.
    pub fn potential_energy_of(&self, bodies: &[Body]) -> f64 {
        let mut energy = 0.0;
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                let r_squared = (a.position - b.position).magnitude_squared();
                let r = match self.policy {
                    SingularityPolicy::Fail { .. } => r_squared.sqrt(),
                    SingularityPolicy::Clamp { min_distance } => {
                        if r_squared == 0.0 {
                            0.0
                        } else {
                            r_squared.sqrt().max(min_distance)
                        }
                    }
                    SingularityPolicy::Soften { epsilon } => (r_squared + epsilon * epsilon).sqrt(),
                };
                if r > 0.0 {
                    energy -= self.g * a.mass.value() * b.mass.value() / r;
                }
            }
        }
        energy
    }
}

impl ForceField for Gravity {
    fn name(&self) -> &str {
        "gravity"
    }

    fn accumulate(&mut self, bodies: &mut [Body]) -> Result<ForceStats> {
        #[cfg(feature = "parallel")]
        {
            if bodies.len() >= self.parallel_threshold {
                return self.accumulate_parallel(bodies);
            }
        }
        self.accumulate_pairwise(bodies)
    }

    fn potential_energy(&self, bodies: &[Body]) -> f64 {
        self.potential_energy_of(bodies)
    }
}
