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
//! Numerical integration methods for physics simulation
//!
//! Integrators advance position and velocity from the accelerations that
//! the force fields accumulated for the current step. They read
//! `Body::acceleration` but never reset it; clearing the accumulator is the
//! caller's job once the step is complete.
//!
//! # Integrators
//!
//! - **Semi-implicit Euler**: updates velocity first, then moves with the
//!   new velocity. Symplectic, so orbital energy error stays bounded.
//! - **Explicit Euler**: moves with the old velocity, then updates it.
//!   Energy grows steadily for orbits; kept for comparison.
//!
//! # Timestep Guidelines
//!
//! - Too small: Numerical precision issues and wasted computation
//! - Too large: Instability and inaccuracy
//! - Interactive demos typically use a fixed dt in the 0.01..0.6 range
//!   rather than the wall-clock frame delta

use crate::body::Body;
use crate::error::{check_timestep, Result};
use serde::Deserialize;

mod euler;

pub use euler::{ExplicitEuler, SemiImplicitEuler};

/// Timestep below which f64 positions start losing precision
pub const MIN_RECOMMENDED_TIMESTEP: f64 = 1e-9;

/// Timestep above which typical demo scenarios become unstable
pub const MAX_RECOMMENDED_TIMESTEP: f64 = 10.0;

/// Trait for numerical integration methods
pub trait Integrator: Send + Sync {
    /// Get the name of this integrator
    fn name(&self) -> &str;

    /// Advance every body by `dt` using its accumulated acceleration
    ///
    /// `dt` has already been validated by the caller.
    fn integrate(&self, bodies: &mut [Body], dt: f64);
}

/// Validate a timestep for stability
///
/// Fails for non-positive or non-finite values and logs a warning for
/// values outside the recommended range.
pub fn validate_timestep(dt: f64) -> Result<()> {
    check_timestep(dt)?;

    if dt < MIN_RECOMMENDED_TIMESTEP {
        log::warn!(
            "Timestep {} is extremely small and may cause precision loss with f64",
            dt
        );
    } else if dt > MAX_RECOMMENDED_TIMESTEP {
        log::warn!("Timestep {} is large and may cause instability", dt);
    }

    Ok(())
}

/// Integrator selection used by configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// [`SemiImplicitEuler`]
    #[default]
    SemiImplicitEuler,
    /// [`ExplicitEuler`]
    ExplicitEuler,
}

impl IntegratorKind {
    /// Instantiate the selected integrator
    pub fn build(self) -> Box<dyn Integrator> {
        match self {
            IntegratorKind::SemiImplicitEuler => Box::new(SemiImplicitEuler),
            IntegratorKind::ExplicitEuler => Box::new(ExplicitEuler),
        }
    }
}
