//! Prime Society - command-line runner
//!
//! Builds (or loads) a world, runs it for a number of days and prints the
//! final report.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use prime_society::simulation::{Simulation, SnapshotStore, StopReason, World};
use prime_society::{Result, SimulationConfig};

/// Prime Society - a socio-economic simulation built on prime numbers
#[derive(Parser, Debug)]
#[command(name = "prime-society")]
#[command(about = "Simulate a society whose food, knowledge and trade are prime numbers")]
struct Args {
    /// Number of days to simulate
    #[arg(long, default_value_t = 365)]
    days: u64,

    /// Initial population (overrides the config file)
    #[arg(long)]
    population: Option<usize>,

    /// Resume from a snapshot in the snapshot directory
    #[arg(long)]
    load: Option<String>,

    /// List available snapshots and exit
    #[arg(long)]
    list_snapshots: bool,

    /// Skip writing the statistics export used for plotting
    #[arg(long)]
    no_graphs: bool,

    /// Save snapshots periodically and at the end of the run
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    auto_save: bool,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Report time spent in each daily phase
    #[arg(long)]
    profile: bool,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding snapshots (overrides the config file)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("prime_society={}", args.log_level)))
        .init();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(population) = args.population {
        config.world.initial_population = population;
    }
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(dir) = &args.snapshot_dir {
        config.persistence.snapshot_dir = dir.clone();
    }
    config.persistence.auto_snapshot = args.auto_save;
    config.validate()?;

    let store = SnapshotStore::from_config(&config.persistence);

    if args.list_snapshots {
        let names = store.list()?;
        if names.is_empty() {
            println!("No snapshots in {}", store.dir().display());
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    let world = match &args.load {
        Some(name) => {
            let mut world = store.load_world(name).map_err(|e| {
                tracing::error!(snapshot = %name, error = %e, "Failed to load snapshot");
                e
            })?;
            world.config.persistence.auto_snapshot = args.auto_save;
            tracing::info!(snapshot = %name, day = world.day, population = world.population(), "Snapshot loaded");
            world
        }
        None => World::new(config)?,
    };

    tracing::info!(days = args.days, seed = world.config.world.seed, "Prime Society starting");

    let mut simulation = Simulation::new(world).with_profiling(args.profile);
    if args.auto_save {
        simulation = simulation.with_snapshots(store.clone());
    }

    let result = simulation.run(args.days);

    println!();
    print!("{}", result.summary);
    match &result.stop_reason {
        StopReason::Completed => {}
        StopReason::Extinct => println!("Stopped early: population extinct"),
        StopReason::InvariantViolation(detail) => println!("Stopped early: {}", detail),
    }
    if let Some(timings) = &result.timings {
        println!();
        print!("{}", timings);
    }

    if !args.no_graphs {
        std::fs::create_dir_all(store.dir())?;
        let path = store
            .dir()
            .join(format!("statistics_day_{:08}.json", simulation.world.day));
        simulation.world.stats.write_json(&path)?;
        println!("Statistics written to {}", path.display());
    }

    if args.auto_save {
        match store.save(&simulation.world, Some("final")) {
            Ok(path) => println!("Final snapshot: {}", path.display()),
            Err(e) => tracing::warn!(error = %e, "Final snapshot failed"),
        }
    }

    Ok(())
}
