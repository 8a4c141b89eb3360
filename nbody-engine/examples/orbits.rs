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
//! Two-Body Orbit Example
//!
//! Integrates a circular two-body orbit for several periods with both Euler
//! variants and compares how well each keeps energy and separation.
//!
//! # Running
//!
//! ```bash
//! cargo run --example orbits --release
//! cargo run --example orbits --release -- --periods 10 --steps-per-period 500
//! ```

use anyhow::Result;
use clap::Parser;
use nbody_engine::integration::IntegratorKind;
use nbody_engine::scenario::Scenario;
use nbody_engine::{ForceSet, Gravity, Simulation};

#[derive(Parser, Debug)]
#[command(about = "Compare Euler integrators on a circular orbit")]
struct Args {
    /// Number of orbital periods to integrate
    #[arg(long, default_value_t = 5)]
    periods: usize,

    /// Steps per orbital period
    #[arg(long, default_value_t = 1000)]
    steps_per_period: usize,

    /// Mass ratio m1 / m2
    #[arg(long, default_value_t = 1.0)]
    mass_ratio: f64,
}

struct OrbitSummary {
    energy_drift: f64,
    min_separation: f64,
    max_separation: f64,
}

fn separation(sim: &Simulation) -> f64 {
    let bodies = sim.bodies().bodies();
    (bodies[0].position - bodies[1].position).magnitude()
}

fn run_orbit(scenario: &Scenario, kind: IntegratorKind, steps: usize, dt: f64) -> Result<OrbitSummary> {
    let bodies = scenario.build(1.0, &mut fastrand::Rng::with_seed(0))?;
    let mut sim = Simulation::new(bodies, ForceSet::new().with(Gravity::new(1.0))).with_integrator(kind.build());

    let initial_energy = sim.total_energy();
    let mut summary = OrbitSummary {
        energy_drift: 0.0,
        min_separation: f64::INFINITY,
        max_separation: 0.0,
    };

    for _ in 0..steps {
        sim.step(dt)?;
        let drift = ((sim.total_energy() - initial_energy) / initial_energy).abs();
        summary.energy_drift = summary.energy_drift.max(drift);
        let s = separation(&sim);
        summary.min_separation = summary.min_separation.min(s);
        summary.max_separation = summary.max_separation.max(s);
    }

    Ok(summary)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = Scenario::TwoBodyCircular {
        m1: args.mass_ratio,
        m2: 1.0,
        separation: 1.0,
    };
    scenario.validate()?;
    let period = scenario
        .orbital_period(1.0)
        .ok_or_else(|| anyhow::anyhow!("scenario has no orbital period"))?;
    let steps = args.periods * args.steps_per_period;
    let dt = period / args.steps_per_period as f64;

    println!("Two-Body Circular Orbit");
    println!("=======================\n");
    println!("Period:   {:.6}", period);
    println!("Timestep: {:.6e}", dt);
    println!("Steps:    {}\n", steps);
    println!(
        "{:<22} {:>14} {:>14} {:>14}",
        "integrator", "max |ΔE/E|", "min r", "max r"
    );

    for kind in [IntegratorKind::SemiImplicitEuler, IntegratorKind::ExplicitEuler] {
        let summary = run_orbit(&scenario, kind, steps, dt)?;
        println!(
            "{:<22} {:>14.3e} {:>14.6} {:>14.6}",
            kind.build().name(),
            summary.energy_drift,
            summary.min_separation,
            summary.max_separation
        );
    }

    Ok(())
}
