use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Instant;
use unts_lib::model::metrics::{init_logging, Metrics};
use unts_lib::{AppConfig, Simulation};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Random seed, overriding the one in the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print a JSON snapshot to stdout every N ticks (0 disables)
    #[arg(long, default_value_t = 0)]
    snapshot_every: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let content = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read config file {}", args.config))?;
    let mut config = AppConfig::from_toml(&content)
        .with_context(|| format!("Failed to load config file {}", args.config))?;
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    tracing::info!(
        path = %args.config,
        seed = config.world.seed,
        fingerprint = %config.fingerprint(),
        "Configuration loaded"
    );

    let metrics = Metrics::new(config.log.interval);
    let mut sim = Simulation::new(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for _ in 0..args.ticks {
        let start = Instant::now();
        let report = sim.step();
        metrics.record_tick(&report, &sim.registry().census, start.elapsed());

        if args.snapshot_every > 0 && report.tick % args.snapshot_every == 0 {
            serde_json::to_writer(&mut out, &sim.snapshot())?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    let census = sim.registry().census;
    tracing::info!(
        ticks = metrics.tick_count(),
        agents = metrics.agent_count(),
        pheromones = metrics.pheromones_processed(),
        born = census.born,
        died = census.died,
        killed = census.killed,
        hills_founded = census.hills_founded,
        elapsed_ms = metrics.elapsed().as_millis() as u64,
        "Simulation finished"
    );
    Ok(())
}
