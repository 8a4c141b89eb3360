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
//! Euler integrators
//!
//! # Algorithm
//!
//! Semi-implicit (symplectic) Euler:
//!
//! ```text
//! v(t + dt) = v(t) + a(t)*dt
//! x(t + dt) = x(t) + v(t + dt)*dt
//! ```
//!
//! Explicit (forward) Euler:
//!
//! ```text
//! x(t + dt) = x(t) + v(t)*dt
//! v(t + dt) = v(t) + a(t)*dt
//! ```
//!
//! Both are first-order accurate. Only the semi-implicit variant is
//! symplectic: for a bound orbit its energy error oscillates instead of
//! growing without limit.
//!
//! # References
//!
//! - Hairer, E., Lubich, C., & Wanner, G. (2006). Geometric Numerical Integration:
//!   Structure-Preserving Algorithms for Ordinary Differential Equations (2nd ed.).
//!   Springer. Section VI.3.

use super::Integrator;
use crate::body::Body;

/// Semi-implicit (symplectic) Euler integrator
///
/// # Example
///
/// ```
/// use nbody_engine::body::{Body, Mass, Vec3};
/// use nbody_engine::integration::{Integrator, SemiImplicitEuler};
///
/// let mut bodies = [Body::at_rest(Mass::new(1.0), Vec3::zero())];
/// bodies[0].acceleration = Vec3::new(10.0, 0.0, 0.0);
/// SemiImplicitEuler.integrate(&mut bodies, 0.1);
/// assert!((bodies[0].velocity.x - 1.0).abs() < 1e-12);
/// assert!((bodies[0].position.x - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn name(&self) -> &str {
        "Semi-implicit Euler"
    }

    fn integrate(&self, bodies: &mut [Body], dt: f64) {
        for body in bodies {
            body.velocity += body.acceleration * dt;
            body.position += body.velocity * dt;
        }
    }
}

/// Explicit (forward) Euler integrator
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn name(&self) -> &str {
        "Explicit Euler"
    }

    fn integrate(&self, bodies: &mut [Body], dt: f64) {
        for body in bodies {
            body.position += body.velocity * dt;
            body.velocity += body.acceleration * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Mass, Vec3};

    fn body(velocity: Vec3, acceleration: Vec3) -> Body {
        let mut body = Body::new(Mass::new(1.0), Vec3::zero(), velocity);
        body.acceleration = acceleration;
        body
    }

    #[test]
    fn test_free_motion() {
        // No acceleration: velocity constant, position linear
        let mut bodies = [body(Vec3::new(1.0, 2.0, 3.0), Vec3::zero())];
        SemiImplicitEuler.integrate(&mut bodies, 0.1);

        let b = &bodies[0];
        assert!((b.position.x - 0.1).abs() < 1e-12);
        assert!((b.position.y - 0.2).abs() < 1e-12);
        assert!((b.position.z - 0.3).abs() < 1e-12);
        assert_eq!(b.velocity, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_semi_implicit_uses_updated_velocity() {
        let mut bodies = [body(Vec3::zero(), Vec3::new(10.0, 0.0, 0.0))];
        SemiImplicitEuler.integrate(&mut bodies, 0.1);
        assert!((bodies[0].velocity.x - 1.0).abs() < 1e-12);
        // x = v(t + dt) * dt
        assert!((bodies[0].position.x - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_uses_old_velocity() {
        let mut bodies = [body(Vec3::zero(), Vec3::new(10.0, 0.0, 0.0))];
        ExplicitEuler.integrate(&mut bodies, 0.1);
        assert!((bodies[0].velocity.x - 1.0).abs() < 1e-12);
        assert_eq!(bodies[0].position.x, 0.0);
    }

    #[test]
    fn test_acceleration_left_untouched() {
        let acc = Vec3::new(0.0, -9.81, 0.0);
        let mut bodies = [body(Vec3::zero(), acc)];
        SemiImplicitEuler.integrate(&mut bodies, 0.01);
        assert_eq!(bodies[0].acceleration, acc);
    }

    #[test]
    fn test_constant_acceleration_converges() {
        // y = 0.5*a*t² within first-order error
        let a = -9.81;
        let dt = 0.001;
        let steps = 1000;
        let mut bodies = [body(Vec3::zero(), Vec3::new(0.0, a, 0.0))];
        for _ in 0..steps {
            SemiImplicitEuler.integrate(&mut bodies, dt);
        }
        let t = dt * steps as f64;
        let expected_y = 0.5 * a * t * t;
        let expected_vy = a * t;
        assert!((bodies[0].velocity.y - expected_vy).abs() / expected_vy.abs() < 1e-9);
        assert!((bodies[0].position.y - expected_y).abs() / expected_y.abs() < 0.01);
    }
}
