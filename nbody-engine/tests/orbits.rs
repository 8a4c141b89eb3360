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
//! Orbital accuracy tests for the two-body problem

use nbody_engine::scenario::Scenario;
use nbody_engine::{ForceSet, Gravity, Simulation, Vec3};

fn separation(sim: &Simulation) -> f64 {
    let bodies = sim.bodies();
    (bodies.get(0).unwrap().position - bodies.get(1).unwrap().position).magnitude()
}

fn orbit(m1: f64, m2: f64, a: f64, g: f64) -> (Simulation, f64) {
    let scenario = Scenario::TwoBodyCircular { m1, m2, separation: a };
    let period = scenario.orbital_period(g).unwrap();
    let bodies = scenario.build(g, &mut fastrand::Rng::with_seed(0)).unwrap();
    (Simulation::new(bodies, ForceSet::new().with(Gravity::new(g))), period)
}

#[test]
fn test_circular_orbit_returns_after_one_period() {
    let (mut sim, period) = orbit(1.0, 1.0, 1.0, 1.0);
    let start: Vec<Vec3> = sim.bodies().positions().collect();
    let steps = 5000;
    let dt = period / steps as f64;

    let mut min_sep = f64::INFINITY;
    let mut max_sep: f64 = 0.0;
    for _ in 0..steps {
        sim.step(dt).unwrap();
        let s = separation(&sim);
        min_sep = min_sep.min(s);
        max_sep = max_sep.max(s);
    }

    assert!((separation(&sim) - 1.0).abs() < 1e-2);
    assert!(min_sep > 0.98 && max_sep < 1.02, "separation range {}..{}", min_sep, max_sep);
    for (now, then) in sim.bodies().positions().zip(start) {
        assert!((now - then).magnitude() < 0.05, "{:?} vs {:?}", now, then);
    }
}

#[test]
fn test_unequal_masses_orbit_barycentre() {
    let (mut sim, period) = orbit(10.0, 1.0, 2.0, 0.5);
    let dt = period / 4000.0;
    for _ in 0..4000 {
        sim.step(dt).unwrap();
        assert!(sim.bodies().center_of_mass().magnitude() < 1e-9);
    }
    assert!((separation(&sim) - 2.0).abs() < 2e-2);
}

#[test]
fn test_orbit_period_scales_with_g() {
    let scenario = Scenario::TwoBodyCircular { m1: 1.0, m2: 1.0, separation: 1.0 };
    let slow = scenario.orbital_period(1.0).unwrap();
    let fast = scenario.orbital_period(4.0).unwrap();
    assert!((slow / fast - 2.0).abs() < 1e-12);
    assert!(scenario.orbital_period(0.0).is_none());
}

#[test]
fn test_double_orbit_stays_bound() {
    let scenario = Scenario::DoubleOrbit { mass: 1.0, separation: 1.0, speed: 0.3 };
    let bodies = scenario.build(1.0, &mut fastrand::Rng::with_seed(0)).unwrap();
    let mut sim = Simulation::new(bodies, ForceSet::new().with(Gravity::new(1.0)));
    assert!(sim.total_energy() < 0.0);

    for _ in 0..2000 {
        sim.step(0.001).unwrap();
        assert!(separation(&sim) < 1.5);
    }
}
