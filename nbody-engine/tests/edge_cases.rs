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
//! Edge case tests for the step driver and the gravity field

use nbody_engine::{
    Body, BodyStore, Drag, ForceSet, Gravity, Mass, Simulation, SimulationConfig, SimulationError,
    SingularityPolicy, Vec3,
};

fn single(velocity: Vec3) -> BodyStore {
    let mut store = BodyStore::new();
    store.push(Body::new(Mass::new(5.0), Vec3::new(1.0, 2.0, 3.0), velocity));
    store
}

fn coincident_pair() -> BodyStore {
    let mut store = BodyStore::new();
    store.push(Body::new(Mass::new(1.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.1, 0.0, 0.0)));
    store.push(Body::new(Mass::new(2.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.1, 0.0)));
    store
}

#[test]
fn test_empty_store_steps() {
    let mut sim = Simulation::new(BodyStore::new(), ForceSet::new().with(Gravity::new(1.0)));
    let report = sim.step(0.1).unwrap();
    assert!(report.advanced);
    assert_eq!(report.forces.pairs, 0);
    assert_eq!(sim.total_energy(), 0.0);
}

#[test]
fn test_isolated_body_at_rest_stays_at_rest() {
    let mut sim = Simulation::new(single(Vec3::zero()), ForceSet::new().with(Gravity::new(1.0)));
    sim.run(1000, 0.1).unwrap();

    let body = sim.bodies().get(0).unwrap();
    assert_eq!(body.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(body.velocity, Vec3::zero());
    assert_eq!(body.acceleration, Vec3::zero());
}

#[test]
fn test_accelerations_consumed_not_accumulated() {
    let velocity = Vec3::new(0.5, -0.25, 1.0);
    let mut sim = Simulation::new(single(velocity), ForceSet::new());

    sim.step(0.1).unwrap();
    sim.step(0.1).unwrap();

    let body = sim.bodies().get(0).unwrap();
    assert_eq!(body.velocity, velocity);
    assert_eq!(body.acceleration, Vec3::zero());
}

#[test]
fn test_external_force_affects_one_step() {
    let mut sim = Simulation::new(single(Vec3::zero()), ForceSet::new());
    sim.bodies_mut()
        .get_mut(0)
        .unwrap()
        .apply_force(Vec3::new(10.0, 0.0, 0.0));

    sim.step(0.1).unwrap();
    let v1 = sim.bodies().get(0).unwrap().velocity;
    assert!((v1.x - 0.2).abs() < 1e-15);

    sim.step(0.1).unwrap();
    assert_eq!(sim.bodies().get(0).unwrap().velocity, v1);
}

#[test]
fn test_coincident_bodies_fail_fast() {
    let mut sim = Simulation::new(coincident_pair(), ForceSet::new().with(Gravity::new(1.0)));
    let before = sim.bodies().clone();

    match sim.step(0.01) {
        Err(SimulationError::CoincidentBodies { i, j, distance }) => {
            assert_eq!((i, j), (0, 1));
            assert_eq!(distance, 0.0);
        }
        other => panic!("expected CoincidentBodies, got {:?}", other),
    }
    assert_eq!(sim.bodies(), &before);
    assert_eq!(sim.time(), 0.0);
}

#[test]
fn test_near_coincident_below_minimum_fails() {
    let mut store = BodyStore::new();
    store.push(Body::at_rest(Mass::new(1.0), Vec3::zero()));
    store.push(Body::at_rest(Mass::new(1.0), Vec3::new(1e-6, 0.0, 0.0)));
    let gravity = Gravity::new(1.0).with_policy(SingularityPolicy::Fail { min_distance: 1e-3 });
    let mut sim = Simulation::new(store, ForceSet::new().with(gravity));
    assert!(matches!(sim.step(0.01), Err(SimulationError::CoincidentBodies { .. })));
}

#[test]
fn test_clamp_policy_ignores_coincident_pair() {
    let gravity = Gravity::new(1.0).with_policy(SingularityPolicy::Clamp { min_distance: 0.01 });
    let mut sim = Simulation::new(coincident_pair(), ForceSet::new().with(gravity));
    sim.step(0.1).unwrap();

    assert_eq!(sim.bodies().get(0).unwrap().velocity, Vec3::new(0.1, 0.0, 0.0));
    assert_eq!(sim.bodies().get(1).unwrap().velocity, Vec3::new(0.0, 0.1, 0.0));
}

#[test]
fn test_softening_keeps_state_finite() {
    let gravity = Gravity::new(1.0).with_policy(SingularityPolicy::Soften { epsilon: 0.05 });
    let mut sim = Simulation::new(coincident_pair(), ForceSet::new().with(gravity));
    sim.run(100, 0.01).unwrap();
    assert!(sim.bodies().bodies().iter().all(Body::is_valid));
}

#[test]
fn test_max_force_clamps_close_encounters() {
    let mut store = BodyStore::new();
    store.push(Body::at_rest(Mass::new(1.0), Vec3::zero()));
    store.push(Body::at_rest(Mass::new(1.0), Vec3::new(0.01, 0.0, 0.0)));
    let gravity = Gravity::new(1.0).with_max_force(100.0);
    let mut sim = Simulation::new(store, ForceSet::new().with(gravity));

    let report = sim.step(0.001).unwrap();
    assert_eq!(report.forces.clamped, 1);
    // Unclamped magnitude is 1 / 0.01²
    assert!((report.forces.max_force - 1e4).abs() < 1e-6);
    let v = sim.bodies().get(0).unwrap().velocity;
    assert!((v.x - 0.1).abs() < 1e-12);
}

#[test]
fn test_invalid_timesteps_rejected() {
    let mut sim = Simulation::new(single(Vec3::zero()), ForceSet::new());
    for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
        assert!(matches!(sim.step(dt), Err(SimulationError::InvalidTimestep(_))));
    }
    sim.set_paused(true);
    assert!(sim.step(-1.0).is_err());
    assert_eq!(sim.step_count(), 0);
}

#[test]
fn test_paused_simulation_ignores_kicks_until_resumed() {
    let mut sim = Simulation::new(single(Vec3::zero()), ForceSet::new().with(Drag::new(0.1))).with_seed(4);
    sim.set_paused(true);
    sim.apply_random_kick(1.0).unwrap();
    let kicked = sim.bodies().clone();

    assert!(!sim.step(0.1).unwrap().advanced);
    assert_eq!(sim.bodies(), &kicked);

    sim.set_paused(false);
    sim.step(0.1).unwrap();
    assert!(sim.bodies().get(0).unwrap().velocity.magnitude() > 0.0);
    assert_eq!(sim.bodies().get(0).unwrap().acceleration, Vec3::zero());
}

#[test]
fn test_same_seed_is_bit_identical() {
    let yaml = r#"
seed: 99
timestep: 0.01
gravity:
  g: 0.01
  singularity:
    policy: soften
    epsilon: 0.1
containment:
  radius: 3.0
scenario:
  kind: random_cloud
  count: 64
  radius: 2.0
  speed: 0.5
  mass:
    distribution: log_uniform
    min_exp: -1
    max_exp: 1
"#;
    let config = SimulationConfig::from_yaml_str(yaml).unwrap();
    let mut a = config.build().unwrap();
    let mut b = config.build().unwrap();

    for step in 0..50 {
        if step % 10 == 0 {
            a.apply_random_kick(0.5).unwrap();
            b.apply_random_kick(0.5).unwrap();
        }
        a.step(config.timestep).unwrap();
        b.step(config.timestep).unwrap();
    }
    assert_eq!(a.bodies(), b.bodies());
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_path_matches_sequential() {
    use nbody_engine::scenario::{MassDistribution, Scenario};

    let scenario = Scenario::RandomCloud {
        count: 300,
        radius: 5.0,
        speed: 0.1,
        mass: MassDistribution::Constant { value: 1.0 },
    };
    let bodies = scenario.build(1.0, &mut fastrand::Rng::with_seed(21)).unwrap();
    let policy = SingularityPolicy::Soften { epsilon: 0.01 };

    let sequential = Gravity::new(1.0).with_policy(policy).with_parallel_threshold(usize::MAX);
    let parallel = Gravity::new(1.0).with_policy(policy).with_parallel_threshold(0);
    let mut seq = Simulation::new(bodies.clone(), ForceSet::new().with(sequential));
    let mut par = Simulation::new(bodies, ForceSet::new().with(parallel));

    let seq_report = seq.run(5, 0.01).unwrap().unwrap();
    let par_report = par.run(5, 0.01).unwrap().unwrap();
    assert_eq!(seq_report, par_report);
    assert_eq!(seq.bodies(), par.bodies());
}
