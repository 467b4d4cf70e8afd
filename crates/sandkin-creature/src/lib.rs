//! Articulated soft-body creatures for Sandkin
//!
//! This crate implements:
//! - Body plans (species, diet, segment layout) and per-individual bodies
//! - The central pattern generator mapping controller parameters to segment forces
//! - The per-tick creature physics step (PBD chain, grid collision, gaits, feeding)
//! - Reproduction, predator/prey interaction, inter-body collision and ragdolls
//! - Grid access traits so the creature code never depends on the grid type

pub mod body;
pub mod cpg;
pub mod gait;
pub mod interaction;
pub mod physics;
pub mod plan;
pub mod spawning;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use body::{Body, Segment};
pub use cpg::{
    clamp_params, default_params, eval_cpg, eval_cpg_into, param_bounds, param_count, zone_count,
};
pub use interaction::{collide_creature_segments, interact_creatures, push_creatures_apart};
pub use physics::{solve_constraints, step_creature, step_ragdoll};
pub use plan::{BodyPlan, Diet, Gait, Species};
pub use spawning::{spawn_creature, try_reproduce};
pub use traits::{GridAccess, GridMutAccess};
pub use types::{CreatureId, Energy};

/// Segment render data for a single body segment
#[derive(Debug, Clone)]
pub struct SegmentRenderData {
    pub position: glam::Vec2,
    pub radius: f32,
    pub color: [u8; 4],
}
