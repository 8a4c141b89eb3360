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
//! Keeping escaping bodies near the cloud
//!
//! Slingshot encounters fling bodies out of a cloud where they would
//! otherwise drift forever. Containment respawns any body that strays
//! beyond a radius of the position average close to that average, with a
//! small random velocity.

use crate::body::Vec3;
use crate::error::{check_non_negative, Result, SimulationError};
use crate::store::BodyStore;
use serde::Deserialize;

fn default_respawn_spread() -> f64 {
    1.0
}

fn default_respawn_speed() -> f64 {
    0.1
}

/// Uniform random vector with each component in `[-scale, scale]`
pub fn random_vec3(rng: &mut fastrand::Rng, scale: f64) -> Vec3 {
    let x = (rng.f64() * 2.0 - 1.0) * scale;
    let y = (rng.f64() * 2.0 - 1.0) * scale;
    let z = (rng.f64() * 2.0 - 1.0) * scale;
    Vec3::new(x, y, z)
}

/// Respawn policy for bodies that leave the cloud
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Containment {
    /// Distance from the position average beyond which a body is respawned
    pub radius: f64,
    /// Half-width of the cube around the average where bodies reappear
    #[serde(default = "default_respawn_spread")]
    pub respawn_spread: f64,
    /// Maximum component of the respawn velocity
    #[serde(default = "default_respawn_speed")]
    pub respawn_speed: f64,
}

impl Containment {
    /// Create a containment policy with default respawn parameters
    pub fn new(radius: f64) -> Result<Self> {
        let containment = Containment {
            radius,
            respawn_spread: default_respawn_spread(),
            respawn_speed: default_respawn_speed(),
        };
        containment.validate()?;
        Ok(containment)
    }

    /// Override the respawn parameters, builder style
    pub fn with_respawn(mut self, spread: f64, speed: f64) -> Result<Self> {
        self.respawn_spread = spread;
        self.respawn_speed = speed;
        self.validate()?;
        Ok(self)
    }

    /// Check the policy parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(SimulationError::InvalidParameter {
                name: "containment.radius",
                value: self.radius,
            });
        }
        check_non_negative("containment.respawn_spread", self.respawn_spread)?;
        check_non_negative("containment.respawn_speed", self.respawn_speed)
    }

    /// Respawn every body farther than `radius` from the position average
    ///
    /// Returns the number of bodies respawned.
    pub fn apply(&self, store: &mut BodyStore, rng: &mut fastrand::Rng) -> usize {
        let center = store.position_average();
        let mut respawned = 0;

        for body in store.bodies_mut() {
            if (body.position - center).magnitude() > self.radius {
                body.position = center + random_vec3(rng, self.respawn_spread);
                body.velocity = random_vec3(rng, self.respawn_speed);
                body.acceleration = Vec3::zero();
                respawned += 1;
            }
        }

        if respawned > 0 {
            log::debug!("Respawned {} escaping bodies near {:?}", respawned, center);
        }
        respawned
    }
}
