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
//! # N-body Engine
//!
//! A pairwise Newtonian gravity core for clouds of point masses, advanced
//! with a semi-implicit Euler integrator.
//!
//! ## Features
//!
//! - **Pairwise Gravity**: every unordered pair evaluated once, Newton's
//!   third law applied to both bodies
//! - **Singularity Policies**: fail, clamp or soften close encounters
//! - **Force Accumulation**: gravity, drag and custom fields summed into
//!   per-body accelerations that are reset after every step
//! - **Parallelization**: optional Rayon path with results identical to the
//!   sequential one
//! - **Scenarios**: seeded initial conditions, loadable from YAML
//!
//! ## Example
//!
//! ```rust
//! use nbody_engine::{Body, BodyStore, ForceSet, Gravity, Mass, Simulation, Vec3};
//!
//! let mut bodies = BodyStore::new();
//! bodies.push(Body::at_rest(Mass::new(1.0), Vec3::new(-0.5, 0.0, 0.0)));
//! bodies.push(Body::at_rest(Mass::new(1.0), Vec3::new(0.5, 0.0, 0.0)));
//!
//! let mut sim = Simulation::new(bodies, ForceSet::new().with(Gravity::new(1.0)));
//! sim.run(10, 0.01).unwrap();
//!
//! // The bodies fall toward each other
//! assert!(sim.bodies().get(0).unwrap().position.x > -0.5);
//! ```

#![warn(missing_docs)]

/// Vectors, masses and bodies
pub mod body;

/// Respawning bodies that escape the cloud
pub mod containment;

/// YAML run configuration
pub mod config;

/// Error type
pub mod error;

/// Force fields and accumulation
pub mod forces;

/// Numerical integration methods
pub mod integration;

/// Initial conditions
pub mod scenario;

/// Step driver
pub mod simulation;

/// Body storage and aggregate diagnostics
pub mod store;

pub use body::{Body, Mass, Vec3};
pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use forces::{Drag, ForceField, ForceSet, ForceStats, Gravity, SingularityPolicy};
pub use integration::{Integrator, SemiImplicitEuler};
pub use scenario::Scenario;
pub use simulation::{Simulation, StepReport};
pub use store::BodyStore;
