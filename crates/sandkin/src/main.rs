use clap::Parser;
use env_logger::{Builder, Env};
use std::path::PathBuf;

use sandkin::runner::{run_sandbox, run_training};
use sandkin::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run controller training instead of the free sandbox
    #[arg(long)]
    train: bool,

    /// Config file (default: sandkin.ron in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Terrain preset: flat, pond, hill
    #[arg(long)]
    scenario: Option<String>,

    /// World seed
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate in sandbox mode
    #[arg(long)]
    ticks: Option<u64>,

    /// Creatures spawned in sandbox mode
    #[arg(long)]
    creatures: Option<usize>,

    /// Training task: survive, forage, climb
    #[arg(long)]
    task: Option<String>,

    /// Species to train: serpent, spider, crab, centipede, crawler, ...
    #[arg(long)]
    species: Option<String>,

    /// Population size per generation
    #[arg(long)]
    population: Option<usize>,

    /// Simulated seconds per candidate
    #[arg(long)]
    eval_seconds: Option<f32>,

    /// Number of generations to train
    #[arg(long)]
    generations: Option<u32>,

    /// Save a PNG of the final world state
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    verbose: bool,
}

impl Args {
    /// Command-line values take priority over every config layer
    fn apply(&self, config: &mut AppConfig) {
        if let Some(scenario) = &self.scenario {
            config.sandbox.scenario = scenario.clone();
        }
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            config.sandbox.ticks = ticks;
        }
        if let Some(creatures) = self.creatures {
            config.sandbox.creatures = creatures;
        }
        if let Some(task) = &self.task {
            config.training.task = task.clone();
        }
        if let Some(species) = &self.species {
            config.training.species = species.clone();
        }
        if let Some(population) = self.population {
            config.training.population = population;
        }
        if let Some(eval_seconds) = self.eval_seconds {
            config.training.eval_seconds = eval_seconds;
        }
        if let Some(generations) = self.generations {
            config.training.generations = generations;
        }
        if self.verbose {
            config.debug.verbose_logging = true;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    args.apply(&mut config);

    let level = if config.debug.verbose_logging {
        "debug"
    } else {
        "info"
    };
    Builder::from_env(Env::default().default_filter_or(level)).init();

    if args.train {
        run_training(&config, args.snapshot.as_deref())?;
    } else {
        run_sandbox(&config, args.snapshot.as_deref())?;
    }
    Ok(())
}
