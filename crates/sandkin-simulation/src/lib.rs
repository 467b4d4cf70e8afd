//! Cell types, material data and randomness for Sandkin
//!
//! This crate provides the foundational data shared by the grid and the creatures:
//! - Cell tags (CellType) and grid size constants
//! - Material definitions (MaterialDef, MaterialType, Materials)
//! - Randomness abstraction (WorldRng)

mod cell;
mod error;
mod materials;
mod rng;

pub use cell::{CellType, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
pub use error::ParseNameError;
pub use materials::{MaterialDef, MaterialType, Materials};
pub use rng::WorldRng;
