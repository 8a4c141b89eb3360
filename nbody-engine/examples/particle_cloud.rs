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
//! Particle Cloud Example
//!
//! Runs a gravitating particle cloud headless and prints energy and
//! momentum diagnostics at a fixed interval.
//!
//! # Running
//!
//! ```bash
//! # Default 1000-body cloud
//! cargo run --example particle_cloud --release
//!
//! # A bundled scenario file
//! cargo run --example particle_cloud --release -- -f scenarios/random_cloud.yaml
//!
//! # Override the step count and kick the cloud every 50 steps
//! RUST_LOG=debug cargo run --example particle_cloud -- -f scenarios/random_cloud.yaml --steps 500 --kick-every 50
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use nbody_engine::SimulationConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Headless N-body particle cloud")]
struct Args {
    /// YAML configuration; defaults are used when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Number of steps, overriding the configuration
    #[arg(long)]
    steps: Option<usize>,

    /// Print diagnostics every this many steps
    #[arg(long, default_value_t = 100)]
    report_every: usize,

    /// Apply a random kick every this many steps (0 disables)
    #[arg(long, default_value_t = 0)]
    kick_every: usize,

    /// Force scale of the random kick
    #[arg(long, default_value_t = 1.0)]
    kick_scale: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.file {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let steps = args.steps.unwrap_or(config.steps);
    let dt = config.timestep;

    let mut sim = config.build().context("failed to build simulation")?;

    println!("N-body Particle Cloud");
    println!("=====================\n");
    println!("Scenario:   {}", config.scenario.name());
    println!("Bodies:     {}", sim.bodies().len());
    println!("Integrator: {}", sim.integrator_name());
    println!("Timestep:   {}", dt);
    println!("Steps:      {}\n", steps);

    let initial_energy = sim.total_energy();
    let initial_momentum = sim.bodies().total_momentum();
    let mut respawned = 0;
    let mut clamped = 0;

    println!(
        "{:>8} {:>10} {:>14} {:>12} {:>12} {:>10}",
        "step", "time", "energy", "rel. drift", "|Δp|", "max F"
    );

    for step in 1..=steps {
        if args.kick_every > 0 && step % args.kick_every == 0 {
            sim.apply_random_kick(args.kick_scale)?;
        }

        let report = sim
            .step(dt)
            .with_context(|| format!("step {} failed", step))?;
        respawned += report.respawned;
        clamped += report.forces.clamped;

        if step % args.report_every.max(1) == 0 || step == steps {
            let energy = sim.total_energy();
            let drift = if initial_energy != 0.0 {
                (energy - initial_energy) / initial_energy.abs()
            } else {
                0.0
            };
            let momentum_change = (sim.bodies().total_momentum() - initial_momentum).magnitude();
            println!(
                "{:>8} {:>10.3} {:>14.6e} {:>12.3e} {:>12.3e} {:>10.3e}",
                step,
                sim.time(),
                energy,
                drift,
                momentum_change,
                report.forces.max_force
            );
        }
    }

    println!("\nCenter of mass: {:?}", sim.bodies().center_of_mass().as_array());
    println!("Respawned bodies: {}", respawned);
    println!("Clamped pair forces: {}", clamped);

    Ok(())
}
