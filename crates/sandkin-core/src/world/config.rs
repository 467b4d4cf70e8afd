//! World configuration - grid size, physics and scheduling knobs
//!
//! Every field has a default, so a RON document only needs the values it changes.

use serde::{Deserialize, Serialize};

use sandkin_creature::physics::DEFAULT_GRAVITY;
use sandkin_simulation::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Seed for the grid and world RNG streams
    pub seed: u64,
    /// Downward acceleration per tick applied to creature segments
    pub gravity: f32,
    /// Run heat diffusion every N ticks (0 disables it)
    pub heat_diffusion_interval: u32,
    pub heat_diffusion_strength: f32,
    /// Run predator/prey steering every N ticks (0 disables it)
    pub interaction_interval: u32,
    /// Reproduction stops once this many creatures are alive
    pub max_creatures: usize,
    pub reproduction: bool,
    /// Fully decayed corpses drop food cells
    pub corpse_food: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            seed: 42,
            gravity: DEFAULT_GRAVITY,
            heat_diffusion_interval: 4,
            heat_diffusion_strength: 0.5,
            interaction_interval: 6,
            max_creatures: 64,
            reproduction: true,
            corpse_food: true,
        }
    }
}

impl WorldConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}
