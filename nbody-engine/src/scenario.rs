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
//! Initial-condition builders
//!
//! A scenario describes how to populate a [`BodyStore`] at t = 0. Random
//! scenarios draw from a caller-supplied, seeded `fastrand::Rng`, so the same
//! seed always yields the same bodies.
//!
//! # YAML format
//!
//! Scenarios are tagged by `kind`:
//!
//! ```yaml
//! kind: random_cloud
//! count: 1000
//! radius: 5.0
//! speed: 0.1
//! mass:
//!   distribution: normal
//!   mean: 3.0
//!   std_dev: 0.5
//!   floor: 0.5
//! ```

use crate::body::{Body, Mass, Vec3};
use crate::containment::random_vec3;
use crate::error::{check_non_negative, Result, SimulationError};
use crate::store::BodyStore;
use serde::Deserialize;
use std::f64::consts::PI;

/// Largest body count a random cloud may request
pub const MAX_BODIES: usize = 1 << 24;

/// Explicit initial state of one body
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodySpec {
    /// Mass, must be positive
    pub mass: f64,
    /// Initial position `[x, y, z]`
    pub position: Vec3,
    /// Initial velocity `[x, y, z]`
    #[serde(default)]
    pub velocity: Vec3,
}

/// How masses are drawn for a random cloud
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case", deny_unknown_fields)]
pub enum MassDistribution {
    /// Every body has the same mass
    Constant {
        /// The mass
        value: f64,
    },
    /// Uniform in `[min, max)`
    Uniform {
        /// Lower bound, positive
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Normal with a lower cut-off
    Normal {
        /// Mean
        mean: f64,
        /// Standard deviation
        std_dev: f64,
        /// Samples below this value are raised to it
        floor: f64,
    },
    /// `uniform(1, 10) * 10^k` with integer `k` uniform in `[min_exp, max_exp)`
    ///
    /// Spreads masses over several orders of magnitude.
    LogUniform {
        /// Smallest decade exponent
        min_exp: i32,
        /// One past the largest decade exponent
        max_exp: i32,
    },
}

impl MassDistribution {
    /// Check that every sample is a valid mass
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &'static str, value: f64| -> Result<()> {
            Err(SimulationError::InvalidParameter { name, value })
        };
        match *self {
            MassDistribution::Constant { value } => Mass::try_new(value).map(|_| ()),
            MassDistribution::Uniform { min, max } => {
                Mass::try_new(min)?;
                if max >= min && max.is_finite() {
                    Ok(())
                } else {
                    invalid("mass.max", max)
                }
            }
            MassDistribution::Normal { mean, std_dev, floor } => {
                Mass::try_new(floor)?;
                if !mean.is_finite() {
                    return invalid("mass.mean", mean);
                }
                if std_dev >= 0.0 && std_dev.is_finite() {
                    Ok(())
                } else {
                    invalid("mass.std_dev", std_dev)
                }
            }
            MassDistribution::LogUniform { min_exp, max_exp } => {
                if min_exp >= max_exp {
                    return invalid("mass.max_exp", max_exp as f64);
                }
                if max_exp > 300 || min_exp < -300 {
                    return invalid("mass.min_exp", min_exp as f64);
                }
                Ok(())
            }
        }
    }

    /// Draw one mass
    ///
    /// The distribution must have been validated.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        match *self {
            MassDistribution::Constant { value } => value,
            MassDistribution::Uniform { min, max } => min + rng.f64() * (max - min),
            MassDistribution::Normal { mean, std_dev, floor } => {
                // Box-Muller; u1 in (0, 1] keeps ln finite
                let u1 = 1.0 - rng.f64();
                let u2 = rng.f64();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
                (mean + std_dev * z).max(floor)
            }
            MassDistribution::LogUniform { min_exp, max_exp } => {
                let exponent = rng.i32(min_exp..max_exp);
                (1.0 + 9.0 * rng.f64()) * 10f64.powi(exponent)
            }
        }
    }
}

/// Initial conditions of a simulation run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Scenario {
    /// Two bodies on circular orbits around their barycentre, in the xy plane
    TwoBodyCircular {
        /// Mass of the first body
        m1: f64,
        /// Mass of the second body
        m2: f64,
        /// Distance between the bodies
        separation: f64,
    },
    /// Two equal masses with antiparallel velocities
    ///
    /// One body starts at the origin moving along -x, the other at
    /// `(0, separation, 0)` moving along +x.
    DoubleOrbit {
        /// Mass of each body
        mass: f64,
        /// Initial distance between the bodies
        separation: f64,
        /// Initial speed of each body
        speed: f64,
    },
    /// A satellite launched tangentially past a primary at rest
    SingleOrbit {
        /// Mass of the primary, placed at the origin
        primary_mass: f64,
        /// Mass of the satellite, placed at `(0, separation, 0)`
        satellite_mass: f64,
        /// Initial distance
        separation: f64,
        /// Initial satellite speed along +x
        speed: f64,
    },
    /// Bodies scattered uniformly in a cube
    RandomCloud {
        /// Number of bodies, at most [`MAX_BODIES`]
        count: usize,
        /// Half-width of the cube
        radius: f64,
        /// Maximum initial velocity component
        speed: f64,
        /// Mass distribution
        mass: MassDistribution,
    },
    /// A fixed list of bodies
    Explicit {
        /// The bodies, in index order
        bodies: Vec<BodySpec>,
    },
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::RandomCloud {
            count: 1000,
            radius: 5.0,
            speed: 0.1,
            mass: MassDistribution::Normal {
                mean: 3.0,
                std_dev: 0.5,
                floor: 0.5,
            },
        }
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

impl Scenario {
    /// Check every parameter without building
    pub fn validate(&self) -> Result<()> {
        match self {
            Scenario::TwoBodyCircular { m1, m2, separation } => {
                Mass::try_new(*m1)?;
                Mass::try_new(*m2)?;
                check_positive("separation", *separation)
            }
            Scenario::DoubleOrbit { mass, separation, speed } => {
                Mass::try_new(*mass)?;
                check_positive("separation", *separation)?;
                check_finite("speed", *speed)
            }
            Scenario::SingleOrbit {
                primary_mass,
                satellite_mass,
                separation,
                speed,
            } => {
                Mass::try_new(*primary_mass)?;
                Mass::try_new(*satellite_mass)?;
                check_positive("separation", *separation)?;
                check_finite("speed", *speed)
            }
            Scenario::RandomCloud { count, radius, speed, mass } => {
                if *count > MAX_BODIES {
                    return Err(SimulationError::InvalidParameter {
                        name: "count",
                        value: *count as f64,
                    });
                }
                check_non_negative("radius", *radius)?;
                check_non_negative("speed", *speed)?;
                mass.validate()
            }
            Scenario::Explicit { bodies } => {
                for spec in bodies {
                    Mass::try_new(spec.mass)?;
                    if !spec.position.is_valid() || !spec.velocity.is_valid() {
                        return Err(SimulationError::Config(format!(
                            "non-finite position or velocity in body {:?}",
                            spec
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Populate a store with the scenario's bodies
    ///
    /// `g` is only used by scenarios that derive orbital velocities.
    pub fn build(&self, g: f64, rng: &mut fastrand::Rng) -> Result<BodyStore> {
        self.validate()?;

        let store = match self {
            Scenario::TwoBodyCircular { m1, m2, separation } => {
                let total = m1 + m2;
                // Relative speed of a circular orbit, split by mass ratio
                let v = (g * total / separation).sqrt();
                let mut store = BodyStore::with_capacity(2);
                store.push(Body::new(
                    Mass::new(*m1),
                    Vec3::new(-separation * m2 / total, 0.0, 0.0),
                    Vec3::new(0.0, -v * m2 / total, 0.0),
                ));
                store.push(Body::new(
                    Mass::new(*m2),
                    Vec3::new(separation * m1 / total, 0.0, 0.0),
                    Vec3::new(0.0, v * m1 / total, 0.0),
                ));
                store
            }
            Scenario::DoubleOrbit { mass, separation, speed } => {
                let mut store = BodyStore::with_capacity(2);
                store.push(Body::new(Mass::new(*mass), Vec3::zero(), Vec3::new(-speed, 0.0, 0.0)));
                store.push(Body::new(
                    Mass::new(*mass),
                    Vec3::new(0.0, *separation, 0.0),
                    Vec3::new(*speed, 0.0, 0.0),
                ));
                store
            }
            Scenario::SingleOrbit {
                primary_mass,
                satellite_mass,
                separation,
                speed,
            } => {
                let mut store = BodyStore::with_capacity(2);
                store.push(Body::at_rest(Mass::new(*primary_mass), Vec3::zero()));
                store.push(Body::new(
                    Mass::new(*satellite_mass),
                    Vec3::new(0.0, *separation, 0.0),
                    Vec3::new(*speed, 0.0, 0.0),
                ));
                store
            }
            Scenario::RandomCloud {
                count,
                radius,
                speed,
                mass,
            } => {
                let mut store = BodyStore::with_capacity(*count);
                for _ in 0..*count {
                    let position = random_vec3(rng, *radius);
                    let m = Mass::try_new(mass.sample(rng))?;
                    let velocity = random_vec3(rng, *speed);
                    store.push(Body::new(m, position, velocity));
                }
                store
            }
            Scenario::Explicit { bodies } => bodies
                .iter()
                .map(|spec| Body::new(Mass::new(spec.mass), spec.position, spec.velocity))
                .collect(),
        };

        // Extreme parameters can overflow derived velocities
        if let Some(index) = store.first_invalid() {
            return Err(SimulationError::NonFiniteState { index });
        }

        log::debug!("Built {} bodies for {}", store.len(), self.name());
        Ok(store)
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::TwoBodyCircular { .. } => "two_body_circular",
            Scenario::DoubleOrbit { .. } => "double_orbit",
            Scenario::SingleOrbit { .. } => "single_orbit",
            Scenario::RandomCloud { .. } => "random_cloud",
            Scenario::Explicit { .. } => "explicit",
        }
    }

    /// Orbital period for [`Scenario::TwoBodyCircular`], `2π sqrt(a³ / (G M))`
    ///
    /// Returns `None` for other scenarios or when `g` is zero.
    pub fn orbital_period(&self, g: f64) -> Option<f64> {
        match self {
            Scenario::TwoBodyCircular { m1, m2, separation } if g > 0.0 => {
                Some(2.0 * PI * (separation.powi(3) / (g * (m1 + m2))).sqrt())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_body_circular_barycentre_at_rest() {
        let scenario = Scenario::TwoBodyCircular { m1: 3.0, m2: 1.0, separation: 2.0 };
        let store = scenario.build(1.0, &mut fastrand::Rng::with_seed(0)).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.center_of_mass().magnitude() < 1e-12);
        assert!(store.total_momentum().magnitude() < 1e-12);

        let separation = (store.get(0).unwrap().position - store.get(1).unwrap().position).magnitude();
        assert!((separation - 2.0).abs() < 1e-12);

        // Relative speed sqrt(G M / a) = sqrt(2)
        let relative = (store.get(0).unwrap().velocity - store.get(1).unwrap().velocity).magnitude();
        assert!((relative - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_orbital_period() {
        let scenario = Scenario::TwoBodyCircular { m1: 1.0, m2: 1.0, separation: 1.0 };
        let period = scenario.orbital_period(2.0).unwrap();
        assert!((period - PI).abs() < 1e-12);
        assert!(scenario.orbital_period(0.0).is_none());
        assert!(Scenario::default().orbital_period(1.0).is_none());
    }

    #[test]
    fn test_double_and_single_orbit_layout() {
        let double = Scenario::DoubleOrbit { mass: 1000.0, separation: 1.0, speed: 0.5 };
        let store = double.build(1.0, &mut fastrand::Rng::with_seed(0)).unwrap();
        assert_eq!(store.get(1).unwrap().position, Vec3::new(0.0, 1.0, 0.0));
        assert!(store.total_momentum().magnitude() < 1e-12);

        let single = Scenario::SingleOrbit {
            primary_mass: 1000.0,
            satellite_mass: 100.0,
            separation: 1.0,
            speed: 0.5,
        };
        let store = single.build(1.0, &mut fastrand::Rng::with_seed(0)).unwrap();
        assert_eq!(store.get(0).unwrap().velocity, Vec3::zero());
        assert_eq!(store.get(1).unwrap().velocity, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_random_cloud_is_seeded() {
        let scenario = Scenario::default();
        let a = scenario.build(1.0, &mut fastrand::Rng::with_seed(42)).unwrap();
        let b = scenario.build(1.0, &mut fastrand::Rng::with_seed(42)).unwrap();
        let c = scenario.build(1.0, &mut fastrand::Rng::with_seed(43)).unwrap();

        assert_eq!(a.len(), 1000);
        assert_eq!(a, b);
        assert_ne!(a, c);
        for body in a.bodies() {
            assert!(body.mass.value() >= 0.5);
            assert!(body.position.x.abs() <= 5.0);
            assert!(body.velocity.y.abs() <= 0.1);
        }
    }

    #[test]
    fn test_mass_distributions() {
        let mut rng = fastrand::Rng::with_seed(9);

        let uniform = MassDistribution::Uniform { min: 1.0, max: 10.0 };
        let log_uniform = MassDistribution::LogUniform { min_exp: 2, max_exp: 5 };
        let normal = MassDistribution::Normal { mean: 3.0, std_dev: 0.5, floor: 0.5 };
        for _ in 0..500 {
            let m = uniform.sample(&mut rng);
            assert!((1.0..10.0).contains(&m));
            let m = log_uniform.sample(&mut rng);
            assert!((100.0..1e5).contains(&m), "log-uniform sample {}", m);
            let m = normal.sample(&mut rng);
            assert!(m >= 0.5 && m.is_finite());
        }
        assert_eq!(MassDistribution::Constant { value: 2.0 }.sample(&mut rng), 2.0);
    }

    #[test]
    fn test_validation_rejects_bad_parameters() {
        assert!(MassDistribution::Constant { value: 0.0 }.validate().is_err());
        assert!(MassDistribution::Uniform { min: 2.0, max: 1.0 }.validate().is_err());
        assert!(MassDistribution::Normal { mean: 3.0, std_dev: -1.0, floor: 0.5 }.validate().is_err());
        assert!(MassDistribution::LogUniform { min_exp: 3, max_exp: 3 }.validate().is_err());

        let bad = Scenario::TwoBodyCircular { m1: 1.0, m2: -1.0, separation: 1.0 };
        assert_eq!(bad.validate(), Err(SimulationError::InvalidMass(-1.0)));

        let bad = Scenario::DoubleOrbit { mass: 1.0, separation: 0.0, speed: 1.0 };
        assert!(bad.build(1.0, &mut fastrand::Rng::with_seed(0)).is_err());

        let bad = Scenario::Explicit {
            bodies: vec![BodySpec {
                mass: 1.0,
                position: Vec3::new(f64::NAN, 0.0, 0.0),
                velocity: Vec3::zero(),
            }],
        };
        assert!(matches!(bad.validate(), Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_overflowing_orbit_rejected() {
        let scenario = Scenario::TwoBodyCircular { m1: 1e308, m2: 1e308, separation: 1.0 };
        let result = scenario.build(1.0, &mut fastrand::Rng::with_seed(0));
        assert!(matches!(result, Err(SimulationError::NonFiniteState { .. })));

        let scenario = Scenario::TwoBodyCircular { m1: 1e300, m2: 1e300, separation: 1e-300 };
        assert!(scenario.build(1.0, &mut fastrand::Rng::with_seed(0)).is_err());
    }

    #[test]
    fn test_cloud_count_bounded() {
        let scenario = Scenario::RandomCloud {
            count: usize::MAX,
            radius: 1.0,
            speed: 0.1,
            mass: MassDistribution::Constant { value: 1.0 },
        };
        assert_eq!(
            scenario.validate(),
            Err(SimulationError::InvalidParameter { name: "count", value: usize::MAX as f64 })
        );
        assert!(scenario.build(1.0, &mut fastrand::Rng::with_seed(0)).is_err());

        let at_limit = Scenario::RandomCloud {
            count: MAX_BODIES,
            radius: 1.0,
            speed: 0.1,
            mass: MassDistribution::Constant { value: 1.0 },
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_explicit_preserves_order() {
        let scenario = Scenario::Explicit {
            bodies: vec![
                BodySpec { mass: 1.0, position: Vec3::new(1.0, 0.0, 0.0), velocity: Vec3::zero() },
                BodySpec { mass: 2.0, position: Vec3::new(2.0, 0.0, 0.0), velocity: Vec3::new(0.0, 1.0, 0.0) },
            ],
        };
        let store = scenario.build(1.0, &mut fastrand::Rng::with_seed(0)).unwrap();
        assert_eq!(store.get(1).unwrap().mass.value(), 2.0);
        assert_eq!(store.get(1).unwrap().velocity, Vec3::new(0.0, 1.0, 0.0));
    }
}
