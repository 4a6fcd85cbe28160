//! Nemesis scenario runner
//!
//! Run with: cargo run -p nemesis_sim -- scenarios/courtyard.toml
//!       or: cargo run --bin nemesis-sim -- --json --ticks 300

use clap::Parser;
use nemesis_sim::{ScenarioConfig, Simulation, DEMO_SCENARIO};
use std::error::Error;
use std::path::PathBuf;

/// Headless enemy behavior simulation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (TOML). The built-in courtyard demo runs without one.
    scenario: Option<PathBuf>,

    /// RNG seed, overrides the scenario and NEMESIS_SEED
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks, overrides the scenario and NEMESIS_TICKS
    #[arg(long)]
    ticks: Option<u32>,

    /// Print every event and the final report as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(&args) {
        log::error!("Simulation failed: {e}");
        std::process::exit(1);
    }
}

/// File, then environment, then flags
fn load_scenario(args: &Args) -> Result<ScenarioConfig, Box<dyn Error>> {
    let mut scenario = match &args.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => {
            log::info!("No scenario given, running the built-in demo");
            ScenarioConfig::from_toml_str(DEMO_SCENARIO)?
        }
    };
    scenario.apply_env_overrides();
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        scenario.ticks = ticks;
    }
    Ok(scenario)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let scenario = load_scenario(args)?;
    let mut sim = Simulation::new(&scenario)?;

    let mut event_count = 0usize;
    for _ in 0..scenario.ticks {
        sim.step();
        for event in sim.drain_events() {
            event_count += 1;
            if args.json {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        if sim.player().health() == 0 {
            log::info!("Player is down after {} ticks", sim.ticks());
            break;
        }
    }

    let report = sim.report();
    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        log::info!(
            "Ran {} ticks ({:.1}s): {} events, {} active enemies, {} released, player health {}",
            report.ticks,
            report.elapsed,
            event_count,
            report.active_enemies,
            report.released_enemies,
            report.player_health
        );
        for (state, count) in &report.states {
            log::info!("  {state}: {count}");
        }
    }
    Ok(())
}
