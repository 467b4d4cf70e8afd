//! Application configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `sandkin.ron` file (if exists)
//! 3. Environment variables prefixed with `SANDKIN_`
//!
//! Example environment variable: `SANDKIN_TRAINING__POPULATION=32`

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use sandkin_core::creature::Species;
use sandkin_core::simulation::ParseNameError;
use sandkin_core::{Task, WorldConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub world: WorldConfig,

    #[serde(default)]
    pub sandbox: SandboxConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// Free-running simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Terrain preset: flat, pond or hill
    pub scenario: String,
    /// Creatures spawned at startup, cycling through every species
    pub creatures: usize,
    /// Food cells scattered at startup
    pub food: usize,
    /// Ticks to simulate
    pub ticks: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            scenario: "flat".to_string(),
            creatures: 12,
            food: 150,
            ticks: 1800,
        }
    }
}

/// Controller training settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Candidates per generation
    pub population: usize,
    /// Simulated seconds per candidate rollout
    pub eval_seconds: f32,
    /// Generations to run before stopping
    pub generations: u32,
    /// Wall-clock budget per simulation tick in milliseconds
    pub budget_ms: u64,
    /// survive, forage or climb
    pub task: String,
    pub species: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population: 16,
            eval_seconds: 8.0,
            generations: 10,
            budget_ms: 50,
            task: "survive".to_string(),
            species: "serpent".to_string(),
        }
    }
}

impl TrainingConfig {
    pub fn task(&self) -> Result<Task, ParseNameError> {
        self.task.parse()
    }

    pub fn species(&self) -> Result<Species, ParseNameError> {
        self.species.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// Raise the default log filter to debug
    pub verbose_logging: bool,
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `sandkin.ron` in the working directory (if exists)
    /// 3. Environment variables prefixed with `SANDKIN_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("sandkin.ron"))
    }

    /// Same layering as [`AppConfig::load`] with an explicit file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let world = WorldConfig::default();
        let sandbox = SandboxConfig::default();
        let training = TrainingConfig::default();

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("world.width", world.width as i64)?
            .set_default("world.height", world.height as i64)?
            .set_default("world.seed", world.seed as i64)?
            .set_default("world.gravity", world.gravity as f64)?
            .set_default("world.heat_diffusion_interval", world.heat_diffusion_interval as i64)?
            .set_default("world.heat_diffusion_strength", world.heat_diffusion_strength as f64)?
            .set_default("world.interaction_interval", world.interaction_interval as i64)?
            .set_default("world.max_creatures", world.max_creatures as i64)?
            .set_default("world.reproduction", world.reproduction)?
            .set_default("world.corpse_food", world.corpse_food)?
            .set_default("sandbox.scenario", sandbox.scenario)?
            .set_default("sandbox.creatures", sandbox.creatures as i64)?
            .set_default("sandbox.food", sandbox.food as i64)?
            .set_default("sandbox.ticks", sandbox.ticks as i64)?
            .set_default("training.population", training.population as i64)?
            .set_default("training.eval_seconds", training.eval_seconds as f64)?
            .set_default("training.generations", training.generations as i64)?
            .set_default("training.budget_ms", training.budget_ms as i64)?
            .set_default("training.task", training.task)?
            .set_default("training.species", training.species)?
            .set_default("debug.verbose_logging", false)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(File::from(path).format(FileFormat::Ron).required(false))
            // Layer 3: Environment variables (SANDKIN_WORLD__SEED, etc.)
            .add_source(Environment::with_prefix("SANDKIN").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.world.width, 320);
        assert_eq!(config.sandbox.scenario, "flat");
        assert_eq!(config.training.population, 16);
        assert_eq!(config.training.task(), Ok(Task::Survive));
        assert_eq!(config.training.species(), Ok(Species::Serpent));
        assert!(!config.debug.verbose_logging);
    }

    #[test]
    fn test_load_config_with_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = AppConfig::load_from(&dir.path().join("missing.ron")).expect("loads");
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.training.generations, 10);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".ron")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "(world: (width: 100, height: 60, seed: 9), training: (population: 4, task: \"climb\"))"
        )
        .expect("write config");

        let config = AppConfig::load_from(file.path()).expect("loads");
        assert_eq!(config.world.width, 100);
        assert_eq!(config.world.height, 60);
        assert_eq!(config.world.seed, 9);
        assert_eq!(config.training.population, 4);
        assert_eq!(config.training.task(), Ok(Task::Climb));
        // Untouched keys keep their defaults
        assert_eq!(config.training.species, "serpent");
        assert_eq!(config.sandbox.creatures, 12);
    }

    #[test]
    fn test_bad_names_are_reported() {
        let training = TrainingConfig {
            task: "sprint".to_string(),
            species: "dragon".to_string(),
            ..Default::default()
        };
        assert!(training.task().is_err());
        assert!(training.species().is_err());
    }
}
