//! KTSim - Entry Point
//!
//! Loads a matchup file, runs the batch of simulated exchanges and prints the
//! damage distribution as text or JSON.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use ktsim::core::error::Result;
use ktsim::simulation::{simulate, Matchup};
use ktsim::SimulationConfig;

/// Estimate the damage distribution of one shooting exchange
#[derive(Parser, Debug)]
#[command(name = "ktsim")]
#[command(about = "Monte Carlo damage distribution for an attacker/defender matchup")]
struct Args {
    /// Matchup file (.toml or .json) with [attacker] and [defender] records
    matchup: PathBuf,

    /// Simulation config file with a [simulation] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trials (overrides the config file)
    #[arg(long, short = 'n')]
    trials: Option<u32>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Dice worker count
    #[arg(long)]
    workers: Option<usize>,

    /// Defender is in cover
    #[arg(long)]
    cover: bool,

    /// Target is obscured
    #[arg(long)]
    obscured: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "ktsim=debug" } else { "ktsim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(trials) = args.trials {
        config.trials = trials;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }

    let matchup = Matchup::load(&args.matchup)?;
    let (attacker, defender) = matchup.profiles()?;
    let mut context = matchup.context();
    context.cover |= args.cover;
    context.obscured |= args.obscured;

    tracing::debug!("Attacker: {:?}", attacker);
    tracing::debug!("Defender: {:?}", defender);

    let report = simulate(&attacker, &defender, context, &config)?;

    match args.format {
        Format::Json => println!("{}", report.to_json()),
        Format::Text => {
            println!("{}", report.summary());
            println!();
            print!("{}", report.summary.render_histogram(40));
        }
    }

    Ok(())
}
