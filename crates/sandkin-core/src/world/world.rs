//! World - owns the grid, the creatures and an optional trainer, and sequences one tick

use glam::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use std::sync::Arc;

use sandkin_creature::{
    collide_creature_segments, eval_cpg_into, interact_creatures, push_creatures_apart,
    spawn_creature, step_creature, step_ragdoll, try_reproduce, Body, BodyPlan, CreatureId,
};
use sandkin_simulation::CellType;

use super::config::WorldConfig;
use crate::grid::Grid;
use crate::training::Trainer;

/// Simulation rate the host loop is expected to drive
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
/// Cap on catch-up ticks per host frame
const MAX_STEPS_PER_FRAME: u32 = 2;
/// Half-size of the square searched for empty cells when a corpse turns into food
const CORPSE_FOOD_REACH: i32 = 3;

pub struct World {
    config: WorldConfig,
    grid: Grid,
    creatures: Vec<Body>,
    /// Dead bodies still animated as ragdolls
    corpses: Vec<Body>,
    trainer: Option<Trainer>,
    rng: Xoshiro256StarStar,
    tick: u64,
    next_id: u64,
    time_accumulator: f32,
    /// Per-creature CPG output, reused every tick
    forces: Vec<f32>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let grid = Grid::with_seed(config.width, config.height, config.seed);
        let rng = Xoshiro256StarStar::seed_from_u64(config.seed.wrapping_add(1));
        log::info!(
            "Created world {}x{} (seed {})",
            config.width,
            config.height,
            config.seed
        );
        Self {
            config,
            grid,
            creatures: Vec::new(),
            corpses: Vec::new(),
            trainer: None,
            rng,
            tick: 0,
            next_id: 1,
            time_accumulator: 0.0,
            forces: Vec::new(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn creatures(&self) -> &[Body] {
        &self.creatures
    }

    pub fn creatures_mut(&mut self) -> &mut [Body] {
        &mut self.creatures
    }

    pub fn corpses(&self) -> &[Body] {
        &self.corpses
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Body> {
        self.creatures.iter().find(|b| b.id == id)
    }

    /// Number of ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn live_count(&self) -> usize {
        self.creatures.iter().filter(|b| b.alive).count()
    }

    pub fn trainer(&self) -> Option<&Trainer> {
        self.trainer.as_ref()
    }

    pub fn trainer_mut(&mut self) -> Option<&mut Trainer> {
        self.trainer.as_mut()
    }

    /// Spawn a creature from a plan with its head at `(x, y)`
    pub fn spawn(&mut self, plan: &Arc<BodyPlan>, x: f32, y: f32, params: Option<Vec<f32>>) -> CreatureId {
        let body = spawn_creature(plan, Vec2::new(x, y), params, &mut self.rng);
        self.add_creature(body)
    }

    /// Take ownership of a body, giving it a fresh id
    pub fn add_creature(&mut self, mut body: Body) -> CreatureId {
        let id = CreatureId::from_raw(self.next_id);
        self.next_id += 1;
        body.id = id;
        self.creatures.push(body);
        id
    }

    /// Install a trainer and start its first round; replaces any running trainer
    pub fn start_training(&mut self, mut trainer: Trainer, pop_size: usize, eval_seconds: f32) {
        trainer.set_gravity(self.config.gravity);
        trainer.start(pop_size, eval_seconds);
        self.trainer = Some(trainer);
    }

    pub fn stop_training(&mut self) {
        if let Some(trainer) = self.trainer.as_mut() {
            trainer.stop();
        }
    }

    /// Spawn the trainer's best controller as a regular creature
    pub fn promote_champion(&mut self) -> Option<CreatureId> {
        let body = self.trainer.as_mut()?.spawn_champion()?;
        let id = self.add_creature(body);
        log::info!("Promoted training champion as {}", id);
        Some(id)
    }

    /// Run as many fixed ticks as `dt` seconds of host time allow; returns the count
    pub fn advance(&mut self, dt: f32) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.time_accumulator += dt;
        }
        let mut steps = 0;
        while self.time_accumulator >= FIXED_TIMESTEP && steps < MAX_STEPS_PER_FRAME {
            self.tick();
            self.time_accumulator -= FIXED_TIMESTEP;
            steps += 1;
        }
        // Drop the backlog instead of spiralling
        if self.time_accumulator > FIXED_TIMESTEP * 2.0 {
            self.time_accumulator = FIXED_TIMESTEP;
        }
        steps
    }

    /// One simulation tick.
    ///
    /// Materials always resolve before creatures act, so feeding sees this
    /// tick's grid state.
    pub fn tick(&mut self) {
        self.tick += 1;
        let gravity = self.config.gravity;

        // 1. Materials
        self.grid.update();
        if every(self.tick, self.config.heat_diffusion_interval) {
            self.grid.diffuse_heat(self.config.heat_diffusion_strength);
        }

        // 2. Creatures
        for body in self.creatures.iter_mut() {
            if !body.alive {
                continue;
            }
            eval_cpg_into(&body.params, body, &mut self.forces);
            step_creature(body, &self.forces, &mut self.grid, gravity);
        }

        // 3. Interactions
        if every(self.tick, self.config.interaction_interval) {
            interact_creatures(&mut self.creatures);
        }
        collide_creature_segments(&mut self.creatures);
        push_creatures_apart(&mut self.creatures);

        // 4. Reproduction
        if self.config.reproduction {
            self.reproduce();
        }

        // 5. Death and decay
        let (alive, dead): (Vec<Body>, Vec<Body>) =
            std::mem::take(&mut self.creatures).into_iter().partition(|b| b.alive);
        self.creatures = alive;
        self.corpses.extend(dead);
        self.step_corpses(gravity);

        // 6. Training slice
        if let Some(trainer) = self.trainer.as_mut() {
            trainer.step(&mut self.grid);
        }
    }

    fn reproduce(&mut self) {
        let mut live = self.live_count();
        let mut births = Vec::new();
        for parent in self.creatures.iter_mut() {
            if live >= self.config.max_creatures {
                break;
            }
            if let Some(child) = try_reproduce(parent, &mut self.rng) {
                births.push(child);
                live += 1;
            }
        }
        for child in births {
            self.add_creature(child);
        }
    }

    fn step_corpses(&mut self, gravity: f32) {
        let mut expired = Vec::new();
        let grid = &self.grid;
        self.corpses.retain_mut(|body| {
            let keep = step_ragdoll(body, grid, gravity);
            if !keep {
                expired.push((body.center_of_mass(), body.len()));
            }
            keep
        });

        if self.config.corpse_food {
            for (center, segments) in expired {
                self.drop_corpse_food(center, segments.div_ceil(2));
            }
        }
    }

    /// Place up to `amount` food cells in empty cells around `center`
    fn drop_corpse_food(&mut self, center: Vec2, amount: usize) {
        if !center.is_finite() || amount == 0 {
            return;
        }
        let (cx, cy) = (center.x.floor() as i32, center.y.floor() as i32);
        let mut placed = 0;
        'search: for dy in -CORPSE_FOOD_REACH..=CORPSE_FOOD_REACH {
            for dx in -CORPSE_FOOD_REACH..=CORPSE_FOOD_REACH {
                if placed >= amount {
                    break 'search;
                }
                if self.grid.get(cx + dx, cy + dy) == CellType::Empty {
                    self.grid.set(cx + dx, cy + dy, CellType::Food);
                    placed += 1;
                }
            }
        }
        log::debug!("Corpse decayed into {} food at ({}, {})", placed, cx, cy);
    }
}

fn every(tick: u64, interval: u32) -> bool {
    interval > 0 && tick % interval as u64 == 0
}
