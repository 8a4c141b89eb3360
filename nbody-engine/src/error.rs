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
//! Error type shared by every fallible simulation operation

use std::fmt;

/// Errors raised while building or stepping a simulation
///
/// A step that fails during force accumulation leaves every body exactly
/// as it was, so callers may inspect the state that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Two bodies are closer than the configured minimum distance
    CoincidentBodies {
        /// Index of the first body of the pair
        i: usize,
        /// Index of the second body of the pair
        j: usize,
        /// Separation at the time of the check
        distance: f64,
    },
    /// A body's acceleration, velocity or position became NaN or infinite
    NonFiniteState {
        /// Index of the offending body
        index: usize,
    },
    /// Timestep was zero, negative, NaN or infinite
    InvalidTimestep(f64),
    /// Mass was zero, negative, NaN or infinite
    InvalidMass(f64),
    /// A named runtime parameter was out of range
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f64,
    },
    /// Configuration could not be read, parsed or accepted
    Config(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::CoincidentBodies { i, j, distance } => write!(
                f,
                "bodies {} and {} are {:.3e} apart, below the minimum distance",
                i, j, distance
            ),
            SimulationError::NonFiniteState { index } => {
                write!(f, "body {} has a non-finite state", index)
            }
            SimulationError::InvalidTimestep(dt) => {
                write!(f, "invalid timestep {}: must be positive and finite", dt)
            }
            SimulationError::InvalidMass(m) => {
                write!(f, "invalid mass {}: must be positive and finite", m)
            }
            SimulationError::InvalidParameter { name, value } => {
                write!(f, "invalid value {} for parameter '{}'", value, name)
            }
            SimulationError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<serde_yaml::Error> for SimulationError {
    fn from(err: serde_yaml::Error) -> Self {
        SimulationError::Config(err.to_string())
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(err: std::io::Error) -> Self {
        SimulationError::Config(err.to_string())
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Reject timesteps that are not positive and finite
pub fn check_timestep(dt: f64) -> Result<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidTimestep(dt))
    }
}

/// Reject parameters that are negative or not finite
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}
