//! Material grid - falling-sand cellular automaton with heat and reactive materials

mod ca_update;
mod chemistry;
#[allow(clippy::module_inception)]
mod grid;
mod queries;
mod render;
mod temperature;

pub use chemistry::{
    BOMB_BLAST_RADIUS, BOMB_CHAIN_FUSE, BOMB_FUSE, GUNPOWDER_BLAST_RADIUS, WOOD_BUDGET,
};
pub use grid::{Grid, FIRE_LIFE_MAX, FIRE_LIFE_MIN, MAGMA_HEAT};
