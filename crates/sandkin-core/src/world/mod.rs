//! World orchestration and its configuration

mod config;
#[allow(clippy::module_inception)]
mod world;

pub use config::WorldConfig;
pub use world::{World, FIXED_TIMESTEP};
