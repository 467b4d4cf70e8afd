//! Sandkin core: the material grid, world orchestration and gait training
//!
//! - `grid`: falling-sand cellular automaton with heat, reactive materials and a render hook
//! - `world`: owns the grid, the creature population and an optional trainer; runs one tick
//! - `training`: cross-entropy search over CPG controller parameters

pub mod grid;
pub mod training;
pub mod world;

pub use grid::Grid;
pub use training::{Task, Trainer, TrainerState, TrainerStats};
pub use world::{World, WorldConfig};

// Re-export the crates the public API is built from
pub use sandkin_creature as creature;
pub use sandkin_simulation as simulation;
