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
//! Point-mass state types
//!
//! This module provides the value types a simulation is made of: a
//! double-precision 3D vector, a strictly positive mass, and the body that
//! bundles mass with position, velocity and accumulated acceleration.

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// 3D vector with double-precision components
///
/// Used for positions, velocities and accelerations alike. Deserializes
/// from and serializes to a plain `[x, y, z]` array.
///
/// # Examples
///
/// ```
/// use nbody_engine::body::Vec3;
///
/// let v = Vec3::new(3.0, 4.0, 0.0);
/// assert_eq!(v.magnitude(), 5.0);
/// assert!(v.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// The zero vector
    pub const fn zero() -> Self {
        Vec3::new(0.0, 0.0, 0.0)
    }

    /// Dot product
    pub fn dot(&self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length
    pub fn magnitude_squared(&self) -> f64 {
        self.dot(*self)
    }

    /// Length
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Unit vector in the same direction
    ///
    /// Returns `None` for the zero vector, which has no direction.
    pub fn normalized(&self) -> Option<Vec3> {
        let mag = self.magnitude();
        if mag > 0.0 && mag.is_finite() {
            Some(*self / mag)
        } else {
            None
        }
    }

    /// Check if all components are finite (not NaN or infinite)
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Get the vector as an array
    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Vec3::new(arr[0], arr[1], arr[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.as_array()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs * self
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

/// Mass of a body in simulation units
///
/// Always strictly positive and finite: force-to-acceleration conversion
/// divides by it.
///
/// # Examples
///
/// ```
/// use nbody_engine::body::Mass;
///
/// let mass = Mass::new(10.5);
/// assert_eq!(mass.inverse(), 1.0 / 10.5);
/// assert!(Mass::try_new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Mass {
    value: f64,
}

impl Mass {
    /// Create a new mass
    ///
    /// # Panics
    ///
    /// Panics if the mass is not positive and finite. For fallible
    /// construction, use `try_new`.
    pub fn new(value: f64) -> Self {
        assert!(value > 0.0 && value.is_finite(), "Mass must be positive and finite");
        Mass { value }
    }

    /// Try to create a new mass
    pub fn try_new(value: f64) -> Result<Self> {
        if value > 0.0 && value.is_finite() {
            Ok(Mass { value })
        } else {
            Err(SimulationError::InvalidMass(value))
        }
    }

    /// Get the mass value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Get the inverse mass (1/m)
    pub fn inverse(&self) -> f64 {
        1.0 / self.value
    }
}

impl Default for Mass {
    fn default() -> Self {
        Mass::new(1.0)
    }
}

/// A point mass
///
/// `acceleration` is an accumulator: force fields add into it during a
/// step and the simulation zeroes it once the step has been integrated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Mass of the body
    pub mass: Mass,
    /// Current position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Acceleration accumulated for the current step
    pub acceleration: Vec3,
}

impl Body {
    /// Create a body with zero accumulated acceleration
    pub fn new(mass: Mass, position: Vec3, velocity: Vec3) -> Self {
        Body {
            mass,
            position,
            velocity,
            acceleration: Vec3::zero(),
        }
    }

    /// Create a body at rest
    pub fn at_rest(mass: Mass, position: Vec3) -> Self {
        Body::new(mass, position, Vec3::zero())
    }

    /// Add a force (F = ma) to the accumulated acceleration
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force * self.mass.inverse();
    }

    /// Linear momentum m * v
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass.value()
    }

    /// Kinetic energy 0.5 * m * v²
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass.value() * self.velocity.magnitude_squared()
    }

    /// Check that position, velocity and acceleration are all finite
    pub fn is_valid(&self) -> bool {
        self.position.is_valid() && self.velocity.is_valid() && self.acceleration.is_valid()
    }
}
