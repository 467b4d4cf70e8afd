//! Headless sandbox and training loops

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sandkin_core::creature::{BodyPlan, CreatureId, Species};
use sandkin_core::{Trainer, World};

use crate::config::AppConfig;
use crate::scenario::Scenario;
use crate::snapshot;

/// Ticks between progress bar messages
const REPORT_INTERVAL: u64 = 60;

/// Snapshot scale for `--snapshot` output
pub const SNAPSHOT_SCALE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxSummary {
    pub ticks: u64,
    pub alive: usize,
    pub corpses: usize,
    pub food_left: usize,
    pub explosions: u64,
}

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub generations: u32,
    pub best_score: f32,
    pub best_params: Option<Vec<f32>>,
    pub champion: Option<CreatureId>,
}

fn progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
        .progress_chars("█▓░"))
}

fn build_world(config: &AppConfig) -> Result<(World, Scenario)> {
    let scenario: Scenario = config
        .sandbox
        .scenario
        .parse()
        .context("Invalid sandbox scenario")?;
    let mut world = World::new(config.world.clone());
    scenario.build(world.grid_mut());
    Ok((world, scenario))
}

/// Free-running simulation with a mixed population
pub fn run_sandbox(config: &AppConfig, snapshot_path: Option<&Path>) -> Result<SandboxSummary> {
    let (mut world, scenario) = build_world(config)?;
    let settings = &config.sandbox;

    let plans: Vec<Arc<BodyPlan>> = Species::all().iter().map(|s| Arc::new(s.plan())).collect();
    let width = world.grid().width() as f32;
    let count = settings.creatures.min(config.world.max_creatures);
    for i in 0..count {
        let plan = &plans[i % plans.len()];
        let x = width * (i as f32 + 0.5) / count as f32;
        let head = scenario.spawn_point(world.grid(), plan, x);
        world.spawn(plan, head.x, head.y, None);
    }
    let placed = world.grid_mut().spawn_food(settings.food);

    log::info!("Starting sandbox run");
    log::info!("  Scenario: {}", scenario);
    log::info!("  Grid: {}x{}", config.world.width, config.world.height);
    log::info!("  Creatures: {}", count);
    log::info!("  Food: {}", placed);
    log::info!("  Ticks: {}", settings.ticks);

    let pb = ProgressBar::new(settings.ticks);
    pb.set_style(progress_style()?);
    for tick in 0..settings.ticks {
        world.tick();
        pb.inc(1);
        if tick % REPORT_INTERVAL == 0 {
            pb.set_message(format!(
                "alive {} corpses {}",
                world.live_count(),
                world.corpses().len()
            ));
        }
    }
    pb.finish_with_message("Sandbox complete");

    let summary = SandboxSummary {
        ticks: world.tick_count(),
        alive: world.live_count(),
        corpses: world.corpses().len(),
        food_left: world.grid().count_type(sandkin_core::simulation::CellType::Food),
        explosions: world.grid().explosions(),
    };
    log::info!(
        "Sandbox finished after {} ticks: {} alive, {} corpses, {} food left, {} explosions",
        summary.ticks,
        summary.alive,
        summary.corpses,
        summary.food_left,
        summary.explosions
    );

    if let Some(path) = snapshot_path {
        snapshot::write_png(&world, path, SNAPSHOT_SCALE)?;
    }
    Ok(summary)
}

/// Train a controller for one species, then release the champion
pub fn run_training(config: &AppConfig, snapshot_path: Option<&Path>) -> Result<TrainingSummary> {
    let settings = &config.training;
    let species = settings.species().context("Invalid training species")?;
    let task = settings.task().context("Invalid training task")?;
    let (mut world, scenario) = build_world(config)?;

    let plan = Arc::new(species.plan());
    let x = scenario.training_x(world.grid());
    let spawn = scenario.spawn_point(world.grid(), &plan, x);
    let mut trainer = Trainer::with_seed(Arc::clone(&plan), spawn.x, spawn.y, task, config.world.seed);
    trainer.set_time_budget(Duration::from_millis(settings.budget_ms));

    log::info!("Starting controller training");
    log::info!("  Species: {}", species);
    log::info!("  Task: {}", task);
    log::info!("  Scenario: {}", scenario);
    log::info!("  Generations: {}", settings.generations);
    log::info!("  Population: {}", settings.population);
    log::info!("  Eval seconds: {}", settings.eval_seconds);

    world.start_training(trainer, settings.population, settings.eval_seconds);
    let pop_size = world.trainer().map_or(0, |t| t.stats().pop_size) as u64;
    let eval_ticks = ((settings.eval_seconds.max(0.0) * 60.0).round() as u64).max(1);
    // Every world tick advances the rollout at least once
    let max_ticks = (settings.generations as u64 + 1) * pop_size * eval_ticks + 1;

    let pb = ProgressBar::new(settings.generations as u64);
    pb.set_style(progress_style()?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut generation = 0;
    let mut ticks = 0u64;
    while generation < settings.generations {
        world.tick();
        ticks += 1;
        let Some(trainer) = world.trainer() else {
            bail!("Trainer vanished during training");
        };
        let stats = trainer.stats();
        if stats.generation > generation {
            generation = stats.generation;
            pb.set_position(generation as u64);
            pb.println(format!(
                "Gen {:>3}: best {:.2}, avg {:.2}",
                stats.generation, stats.best_score, stats.avg_score
            ));
        }
        if ticks > max_ticks {
            bail!("Training stalled after {} ticks at generation {}", ticks, generation);
        }
    }
    pb.finish_with_message("Training complete!");
    world.stop_training();

    let (best_score, best_params) = world
        .trainer()
        .map(|t| (t.best_score(), t.best_params().map(<[f32]>::to_vec)))
        .unwrap_or((f32::NEG_INFINITY, None));
    log::info!("Best score: {:.3}", best_score);
    if let Some(params) = &best_params {
        log::info!("Best params: {:?}", params);
    }

    let champion = world.promote_champion();
    if champion.is_some() {
        // Let the champion settle into the scene before capture
        for _ in 0..REPORT_INTERVAL {
            world.tick();
        }
    }
    if let Some(path) = snapshot_path {
        snapshot::write_png(&world, path, SNAPSHOT_SCALE)?;
    }

    Ok(TrainingSummary {
        generations: generation,
        best_score,
        best_params,
        champion,
    })
}
