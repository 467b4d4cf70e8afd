//! Creature physics step
//!
//! Advances one body by one fixed tick against the grid:
//! bookkeeping, food sensing, force integration, position-based distance
//! constraints, grid collision, species gait, feeding, energy and stuck detection.
//!
//! Units are grid cells and ticks; velocities are cells per tick.

use glam::Vec2;

use crate::body::{Body, Segment};
use crate::gait;
use crate::traits::{GridAccess, GridMutAccess};

/// Fixed simulation timestep (seconds per tick)
pub const DT: f32 = 1.0 / 60.0;

/// Hard cap on each velocity component (cells per tick)
pub const VMAX: f32 = 1.5;

/// Default downward acceleration (cells per tick squared)
pub const DEFAULT_GRAVITY: f32 = 0.05;

/// Gauss-Seidel passes over the segment chain per step
pub const CONSTRAINT_ITERATIONS: usize = 5;

/// Consecutive segments rest at `(r_a + r_b) * REST_FACTOR`
pub const REST_FACTOR: f32 = 0.85;

pub const MIN_STIFFNESS: f32 = 0.15;
pub const MAX_STIFFNESS: f32 = 0.85;

/// Ticks a corpse is animated before removal
pub const RAGDOLL_FADE_TICKS: u32 = 180;

pub const SENSE_INTERVAL: u32 = 12;
pub const SENSE_RADIUS: f32 = 40.0;
/// Ticks a body keeps its heading while no food is in sensing range
pub const WANDER_INTERVAL: u32 = 600;

pub const ENERGY_DRAIN: f32 = 0.025;
pub const HAZARD_DRAIN: f32 = 0.5;
/// Energy per eaten food cell before diet efficiency
pub const FOOD_ENERGY: f32 = 12.0;

/// Center-of-mass movement below this many cells counts as stuck
pub const STUCK_DISTANCE: f32 = 3.0;
pub const STUCK_TICKS: u32 = 240;

const AIR_DRAG: f32 = 0.998;
const WATER_DRAG: f32 = 0.92;
const GRIP_DRAG: f32 = 0.8;
const GROUND_DRAG: f32 = 0.9;
const GROUND_FRICTION: f32 = 0.85;

/// Acceleration per unit of CPG force per unit mass
const MOTOR_GAIN: f32 = 0.02;
const SWIM_THRUST: f32 = 0.02;

const FEED_REACH: f32 = 1.5;
const FEED_NUDGE: f32 = 0.1;
const EAT_FLASH_TICKS: u8 = 10;
const RETREAT_TICKS: u32 = 120;

const RAGDOLL_STIFFNESS: f32 = 0.3;
const RAGDOLL_ITERATIONS: usize = 2;
const RAGDOLL_DRAG: f32 = 0.98;

const EPSILON: f32 = 1e-6;

/// Advance a live body by one tick.
///
/// `motor_forces` holds one CPG force per segment (missing entries count as zero).
/// Dead bodies are left untouched; death is latched here and nowhere else.
pub fn step_creature<G: GridMutAccess + ?Sized>(
    body: &mut Body,
    motor_forces: &[f32],
    grid: &mut G,
    gravity: f32,
) {
    if !body.alive {
        return;
    }
    if body.energy.is_depleted() || body.age > body.max_age {
        kill(body);
        return;
    }

    // 1. Bookkeeping
    body.age += 1;
    body.phase += DT;
    body.eat_flash = body.eat_flash.saturating_sub(1);
    body.retreat_ticks = body.retreat_ticks.saturating_sub(1);
    body.record_trail();

    if body.segments.len() >= 2 {
        // 2. Sensing
        if (body.age - 1) % SENSE_INTERVAL == 0 {
            sense_food(body, &*grid);
        }

        // 3. Forces
        integrate(body, motor_forces, &*grid, gravity);

        // 4. Distance constraints
        let stiffness = body.plan.stiffness;
        solve_constraints(&mut body.segments, stiffness, CONSTRAINT_ITERATIONS);

        // 5. Grid collision
        let hazard = collide_with_grid(&mut body.segments, &*grid, true);
        derive_velocities(&mut body.segments);
        if hazard {
            body.energy.drain(HAZARD_DRAIN);
            if body.energy.is_depleted() {
                kill(body);
                return;
            }
        }

        // 6. Locomotion
        gait::apply_gait(body);

        // 7. Feeding
        feed(body, grid);
    }

    // 8. Energy
    body.energy.drain(ENERGY_DRAIN);
    if body.energy.is_depleted() || body.age > body.max_age {
        kill(body);
    }

    // 9. Stuck detection
    update_stuck(body);

    clamp_velocities(&mut body.segments);
}

fn kill(body: &mut Body) {
    body.alive = false;
    body.corpse_ticks = 0;
    log::debug!(
        "{} died at age {} (energy {:.1}, generation {})",
        body.id,
        body.age,
        body.energy.current,
        body.generation
    );
}

/// Face the nearest food; with none in range, turn around every `WANDER_INTERVAL` ticks
fn sense_food<G: GridAccess + ?Sized>(body: &mut Body, grid: &G) {
    let head = body.head_pos();
    body.target = grid.nearest_food(head.x, head.y, SENSE_RADIUS);
    if body.retreat_ticks > 0 {
        return;
    }
    match body.target {
        Some(food) => {
            let dx = food.x - head.x;
            if dx.abs() >= 1.0 {
                body.facing = dx.signum();
            }
        }
        None => {
            if body.age > 1 && (body.age - 1) % WANDER_INTERVAL == 0 {
                body.facing = -body.facing;
            }
        }
    }
}

/// Unit vector along the chain toward the head, computed from start-of-step positions
pub(crate) fn chain_tangent(segments: &[Segment], index: usize, facing: f32, use_prev: bool) -> Vec2 {
    let at = |i: usize| {
        if use_prev {
            segments[i].prev
        } else {
            segments[i].pos
        }
    };
    let dir = if index == 0 {
        at(0) - at(1)
    } else {
        at(index - 1) - at(index)
    };
    let t = dir.normalize_or_zero();
    if t == Vec2::ZERO {
        Vec2::new(facing, 0.0)
    } else {
        t
    }
}

/// Perpendicular to the chain, pointing "up" relative to the direction of travel
pub(crate) fn chain_normal(tangent: Vec2, facing: f32) -> Vec2 {
    Vec2::new(tangent.y, -tangent.x) * facing
}

fn integrate<G: GridAccess + ?Sized>(body: &mut Body, motor_forces: &[f32], grid: &G, gravity: f32) {
    let species = body.plan.species;
    let g = gravity * species.gravity_scale();
    let facing = body.facing;

    for seg in body.segments.iter_mut() {
        seg.prev = seg.pos;
        seg.in_water = grid.is_water(seg.pos.x.floor() as i32, seg.pos.y.floor() as i32);
    }

    for i in 0..body.segments.len() {
        let tangent = chain_tangent(&body.segments, i, facing, true);
        let normal = chain_normal(tangent, facing);
        let seg = &mut body.segments[i];

        let mut acc = Vec2::new(0.0, g);

        let force = motor_forces.get(i).copied().unwrap_or(0.0);
        if force.is_finite() && seg.mass > EPSILON {
            let a = force / seg.mass * MOTOR_GAIN;
            acc += normal * a;
            if seg.grounded {
                acc += tangent * a * 0.5;
            }
        }

        if seg.in_water {
            acc.y -= g * species.buoyancy();
            if species.is_swimmer() {
                acc.x += facing * SWIM_THRUST;
            }
        }

        seg.vel += acc;
        let drag = if seg.in_water {
            WATER_DRAG
        } else if seg.grounded && seg.is_grip {
            GRIP_DRAG
        } else if seg.grounded {
            GROUND_DRAG
        } else {
            AIR_DRAG
        };
        seg.vel *= drag;
        seg.vel = clamp_velocity(seg.vel);
        seg.pos += seg.vel;
    }
}

/// Position-based distance constraints between consecutive segments.
///
/// Each pass moves both ends of a link toward the rest length
/// `(r_a + r_b) * REST_FACTOR`, split by inverse mass. Degenerate
/// (near-zero length) links are skipped for that pass.
pub fn solve_constraints(segments: &mut [Segment], stiffness: f32, iterations: usize) {
    let k = stiffness.clamp(MIN_STIFFNESS, MAX_STIFFNESS);
    for _ in 0..iterations {
        for i in 1..segments.len() {
            let a = segments[i - 1];
            let b = segments[i];
            let delta = b.pos - a.pos;
            let dist = delta.length();
            if dist < EPSILON || !dist.is_finite() {
                continue;
            }
            let w_a = if a.mass > EPSILON { 1.0 / a.mass } else { 0.0 };
            let w_b = if b.mass > EPSILON { 1.0 / b.mass } else { 0.0 };
            let w_sum = w_a + w_b;
            if w_sum <= EPSILON {
                continue;
            }
            let rest = (a.radius + b.radius) * REST_FACTOR;
            let correction = delta / dist * (dist - rest) * k;
            segments[i - 1].pos += correction * (w_a / w_sum);
            segments[i].pos -= correction * (w_b / w_sum);
        }
    }
}

/// Resolve every segment against solid cells and the world bounds.
///
/// With `full` set, side and overhead pushback also apply; the ragdoll step
/// only settles segments onto the ground. Returns true if any segment touches a hazard.
fn collide_with_grid<G: GridAccess + ?Sized>(segments: &mut [Segment], grid: &G, full: bool) -> bool {
    let width = grid.width() as f32;
    let height = grid.height() as f32;
    let mut hazard = false;

    for seg in segments.iter_mut() {
        seg.grounded = false;
        seg.gripped = false;
        let r = seg.radius;

        if full {
            let cy = seg.pos.y.floor() as i32;
            let right = (seg.pos.x + r).floor() as i32;
            if grid.is_solid(right, cy) {
                seg.pos.x = right as f32 - r - 0.001;
            }
            let left = (seg.pos.x - r).floor() as i32;
            if grid.is_solid(left, cy) {
                seg.pos.x = (left + 1) as f32 + r + 0.001;
            }
            let cx = seg.pos.x.floor() as i32;
            let above = (seg.pos.y - r).floor() as i32;
            if grid.is_solid(cx, above) && !grid.is_solid(cx, cy) {
                seg.pos.y = (above + 1) as f32 + r;
            }
        }

        // Ground: find the top of the solid run under the segment and rest on it
        let cx = seg.pos.x.floor() as i32;
        let below = (seg.pos.y + r).floor() as i32;
        if grid.is_solid(cx, below) {
            let mut top = below;
            while top > 0 && grid.is_solid(cx, top - 1) {
                top -= 1;
            }
            seg.pos.y = top as f32 - r;
            seg.grounded = true;
            seg.gripped = seg.is_grip;
        }

        seg.pos.x = seg.pos.x.clamp(r, (width - r).max(r));
        seg.pos.y = seg.pos.y.clamp(r, (height - r).max(r));
        if seg.pos.y >= height - r - EPSILON {
            seg.grounded = true;
            seg.gripped = seg.is_grip;
        }

        if full {
            let cx = seg.pos.x.floor() as i32;
            let cy = seg.pos.y.floor() as i32;
            let feet = (seg.pos.y + r).floor() as i32;
            if grid.is_hazard(cx, cy) || grid.is_hazard(cx, feet) {
                hazard = true;
            }
        }
    }
    hazard
}

/// Velocity from this step's displacement, with ground contact damping
fn derive_velocities(segments: &mut [Segment]) {
    for seg in segments.iter_mut() {
        if !seg.pos.is_finite() {
            seg.pos = seg.prev;
            seg.vel = Vec2::ZERO;
            continue;
        }
        seg.vel = clamp_velocity(seg.pos - seg.prev);
        if seg.grounded {
            seg.vel.y = seg.vel.y.min(0.0);
            seg.vel.x *= GROUND_FRICTION;
        }
    }
}

fn feed<G: GridMutAccess + ?Sized>(body: &mut Body, grid: &mut G) {
    let Some(head) = body.segments.first() else {
        return;
    };
    let reach = head.radius + FEED_REACH;
    let eaten = grid.consume(head.pos.x, head.pos.y, reach);
    if eaten == 0 {
        return;
    }
    body.energy
        .gain(eaten as f32 * FOOD_ENERGY * body.plan.diet.food_efficiency());
    body.food_eaten += eaten;
    body.eat_flash = EAT_FLASH_TICKS;
    let facing = body.facing;
    body.segments[0].vel.x += FEED_NUDGE * facing;
}

fn update_stuck(body: &mut Body) {
    if body.segments.is_empty() {
        return;
    }
    let com_x = body.center_of_mass().x;
    if (com_x - body.stuck_anchor_x).abs() < STUCK_DISTANCE {
        body.stuck_ticks += 1;
        if body.stuck_ticks > STUCK_TICKS {
            body.facing = -body.facing;
            body.stuck_ticks = 0;
            body.stuck_anchor_x = com_x;
            body.retreat_ticks = RETREAT_TICKS;
        }
    } else {
        body.stuck_ticks = 0;
        body.stuck_anchor_x = com_x;
    }
}

pub fn clamp_velocity(vel: Vec2) -> Vec2 {
    if !vel.is_finite() {
        return Vec2::ZERO;
    }
    vel.clamp(Vec2::splat(-VMAX), Vec2::splat(VMAX))
}

pub(crate) fn clamp_velocities(segments: &mut [Segment]) {
    for seg in segments.iter_mut() {
        seg.vel = clamp_velocity(seg.vel);
    }
}

/// Animate a dead body: gravity, loose constraints, ground settling.
///
/// Returns false once the fade-out is over and the corpse should be removed.
pub fn step_ragdoll<G: GridAccess + ?Sized>(body: &mut Body, grid: &G, gravity: f32) -> bool {
    if body.alive {
        return true;
    }
    body.corpse_ticks += 1;
    if body.corpse_ticks >= RAGDOLL_FADE_TICKS {
        return false;
    }

    for seg in body.segments.iter_mut() {
        seg.prev = seg.pos;
        seg.in_water = grid.is_water(seg.pos.x.floor() as i32, seg.pos.y.floor() as i32);
        let g = if seg.in_water { gravity * 0.4 } else { gravity };
        seg.vel.y += g;
        seg.vel *= RAGDOLL_DRAG;
        seg.vel = clamp_velocity(seg.vel);
        seg.pos += seg.vel;
    }
    solve_constraints(&mut body.segments, RAGDOLL_STIFFNESS, RAGDOLL_ITERATIONS);
    collide_with_grid(&mut body.segments, grid, false);
    for seg in body.segments.iter_mut() {
        if !seg.pos.is_finite() {
            seg.pos = seg.prev;
            seg.vel = Vec2::ZERO;
            continue;
        }
        seg.vel = clamp_velocity(seg.pos - seg.prev);
        if seg.grounded {
            seg.vel.y = seg.vel.y.min(0.0);
            seg.vel.x *= 0.7;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpg::{default_params, eval_cpg};
    use crate::plan::{BodyPlan, Species};
    use crate::test_support::TestGrid;
    use sandkin_simulation::CellType;
    use std::sync::Arc;

    fn body_on_floor(plan: BodyPlan, grid: &TestGrid, x: f32, facing: f32) -> Body {
        let r = plan.radii[0];
        let y = grid.floor_y() as f32 - r;
        let params = default_params(&plan);
        let mut body = Body::new(Arc::new(plan), Vec2::new(x, y), facing, params);
        body.max_age = 100_000;
        body
    }

    fn max_link_error(body: &Body) -> f32 {
        (1..body.len())
            .map(|i| {
                let a = body.segments[i - 1];
                let b = body.segments[i];
                let rest = (a.radius + b.radius) * REST_FACTOR;
                (a.pos.distance(b.pos) - rest).abs()
            })
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_velocity_cap_holds() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        // Huge motor forces and a violent initial kick
        for seg in body.segments.iter_mut() {
            seg.vel = Vec2::new(40.0, -40.0);
        }
        let forces = vec![500.0; body.len()];
        for _ in 0..200 {
            step_creature(&mut body, &forces, &mut grid, DEFAULT_GRAVITY);
            for seg in &body.segments {
                assert!(seg.vel.x.abs() <= VMAX && seg.vel.y.abs() <= VMAX);
                assert!(seg.pos.is_finite());
            }
        }
    }

    #[test]
    fn test_constraints_converge_after_perturbation() {
        for plan in [BodyPlan::serpent(), BodyPlan::crab(), BodyPlan::centipede()] {
            let stiffness = plan.stiffness;
            let mut body = Body::new(Arc::new(plan), Vec2::new(50.0, 20.0), 1.0, Vec::new());
            // Zig-zag every segment off the rest chain
            for (i, seg) in body.segments.iter_mut().enumerate() {
                let s = if i % 2 == 0 { 1.0 } else { -1.0 };
                seg.pos += Vec2::new(0.2 * s, -0.15 * s);
            }
            let before = max_link_error(&body);
            solve_constraints(&mut body.segments, stiffness, CONSTRAINT_ITERATIONS);
            let after = max_link_error(&body);
            assert!(after < before * 0.1, "before {before}, after {after}");
            assert!(after < 0.05, "residual {after}");
        }
    }

    #[test]
    fn test_constraints_skip_degenerate_links() {
        let plan = BodyPlan::generic();
        let mut body = Body::new(Arc::new(plan), Vec2::new(50.0, 20.0), 1.0, Vec::new());
        let p = body.segments[0].pos;
        for seg in body.segments.iter_mut() {
            seg.pos = p;
        }
        solve_constraints(&mut body.segments, 0.5, CONSTRAINT_ITERATIONS);
        assert!(body.segments.iter().all(|s| s.pos.is_finite()));
    }

    #[test]
    fn test_rest_chain_stays_at_rest_in_free_fall() {
        let mut grid = TestGrid::empty(200, 200);
        let plan = BodyPlan::crawler();
        let mut body = Body::new(Arc::new(plan), Vec2::new(100.0, 40.0), 1.0, Vec::new());
        body.max_age = 100_000;
        step_creature(&mut body, &[], &mut grid, 0.0);
        assert!(max_link_error(&body) < 0.05);
    }

    #[test]
    fn test_rests_on_floor_and_grips() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        body.segments.iter_mut().for_each(|s| s.pos.y -= 4.0);
        for _ in 0..120 {
            step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        }
        for seg in &body.segments {
            assert!(seg.pos.y + seg.radius <= 50.0 + 0.01, "segment sank into floor");
        }
        assert!(body.grip_count() > 0);
    }

    #[test]
    fn test_dead_body_is_untouched() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        body.alive = false;
        let before: Vec<Vec2> = body.segments.iter().map(|s| s.pos).collect();
        step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        let after: Vec<Vec2> = body.segments.iter().map(|s| s.pos).collect();
        assert_eq!(before, after);
        assert_eq!(body.age, 0);
    }

    #[test]
    fn test_zero_energy_dies_next_step_and_stays_dead() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        // Food right at the head must not rescue it
        let head = body.head_pos();
        grid.set(head.x as i32, head.y as i32, CellType::Food);

        body.energy.current = 0.0;
        step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        assert!(!body.alive);

        body.energy.current = 150.0;
        for _ in 0..10 {
            step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
            assert!(!body.alive);
        }
    }

    #[test]
    fn test_old_age_kills() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        body.max_age = 5;
        for _ in 0..5 {
            step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
            assert!(body.alive);
        }
        step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        assert!(!body.alive);
    }

    #[test]
    fn test_energy_drains_each_tick() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        let start = body.energy.current;
        for _ in 0..100 {
            step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        }
        let expected = start - 100.0 * ENERGY_DRAIN;
        assert!((body.energy.current - expected).abs() < 1e-3);
    }

    #[test]
    fn test_feeding_consumes_food_and_caps_energy() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        body.energy.current = 195.0;
        let head = body.head_pos();
        grid.set(head.x as i32, head.y as i32, CellType::Food);
        grid.set(head.x as i32 + 1, head.y as i32, CellType::Food);

        step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);

        assert_eq!(grid.count(CellType::Food), 0);
        assert!(body.energy.current <= 200.0);
        assert!(body.energy.current > 195.0 - 1.0);
        assert_eq!(body.food_eaten, 2);
        assert!(body.eat_flash > 0);
    }

    #[test]
    fn test_senses_food_and_turns() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        grid.set(30, 48, CellType::Food);
        step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        assert_eq!(body.facing, -1.0);
        assert!(body.target.is_some());
    }

    #[test]
    fn test_hazard_drains_energy() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        for x in 40..70 {
            for y in 46..50 {
                grid.set(x, y, CellType::Acid);
            }
        }
        let start = body.energy.current;
        step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        assert!(body.energy.current < start - HAZARD_DRAIN + 0.01);
    }

    #[test]
    fn test_hazard_death_comes_before_feeding() {
        let mut grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);
        for x in 40..70 {
            for y in 46..50 {
                grid.set(x, y, CellType::Acid);
            }
        }
        let head = body.head_pos();
        grid.set(head.x as i32, head.y as i32, CellType::Food);
        body.energy.current = 0.3;

        step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);

        assert!(!body.alive);
        assert_eq!(body.food_eaten, 0);
        assert_eq!(grid.count(CellType::Food), 1);
    }

    #[test]
    fn test_wanders_without_food() {
        let grid = TestGrid::with_floor(120, 60, 50);
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 60.0, 1.0);

        body.age = WANDER_INTERVAL;
        sense_food(&mut body, &grid);
        assert_eq!(body.facing, 1.0);

        body.age = WANDER_INTERVAL + 1;
        sense_food(&mut body, &grid);
        assert_eq!(body.facing, -1.0);
        assert!(body.target.is_none());

        // Food in range wins over wandering
        let mut grid = grid;
        grid.set(90, 48, CellType::Food);
        body.age = 2 * WANDER_INTERVAL + 1;
        sense_food(&mut body, &grid);
        assert_eq!(body.facing, 1.0);
    }

    #[test]
    fn test_single_segment_body_only_ages_and_drains() {
        let mut grid = TestGrid::with_floor(60, 40, 30);
        let mut plan = BodyPlan::serpent();
        plan.radii.truncate(1);
        plan.masses.truncate(1);
        plan.grip_indices.retain(|&i| i < 1);
        let mut body = body_on_floor(plan, &grid, 30.0, 1.0);
        let start = body.segments[0].pos;
        let energy = body.energy.current;

        for _ in 0..100 {
            let forces = eval_cpg(&body.params, &body);
            step_creature(&mut body, &forces, &mut grid, DEFAULT_GRAVITY);
        }

        assert!(body.alive);
        assert_eq!(body.len(), 1);
        assert_eq!(body.age, 100);
        assert_eq!(body.segments[0].pos, start);
        assert!((body.energy.current - (energy - 100.0 * ENERGY_DRAIN)).abs() < 1e-3);
    }

    #[test]
    fn test_stuck_body_flips_facing() {
        // A wall directly ahead of the head keeps the body in place
        let mut grid = TestGrid::with_floor(120, 60, 50);
        for y in 0..50 {
            grid.set(64, y, CellType::Wall);
        }
        let mut body = body_on_floor(BodyPlan::serpent(), &grid, 61.0, 1.0);
        let mut flipped = false;
        for _ in 0..(STUCK_TICKS + 60) {
            step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
            if body.facing < 0.0 {
                flipped = true;
                break;
            }
        }
        assert!(flipped);
    }

    #[test]
    fn test_stays_inside_bounds() {
        let mut grid = TestGrid::empty(40, 30);
        let mut body = Body::new(
            Arc::new(BodyPlan::serpent()),
            Vec2::new(20.0, 10.0),
            1.0,
            Vec::new(),
        );
        body.max_age = 100_000;
        for _ in 0..400 {
            step_creature(&mut body, &[], &mut grid, DEFAULT_GRAVITY);
        }
        for seg in &body.segments {
            assert!(seg.pos.x >= seg.radius - 1e-3 && seg.pos.x <= 40.0 - seg.radius + 1e-3);
            assert!(seg.pos.y >= seg.radius - 1e-3 && seg.pos.y <= 30.0 - seg.radius + 1e-3);
        }
    }

    #[test]
    fn test_every_species_steps_without_nan() {
        let mut grid = TestGrid::with_floor(200, 80, 70);
        for x in 0..200 {
            for y in 55..70 {
                if x < 60 {
                    grid.set(x, y, CellType::Water);
                }
            }
        }
        for species in Species::all() {
            let plan = species.plan();
            let mut body = body_on_floor(plan, &grid, 100.0, 1.0);
            for _ in 0..300 {
                let forces = eval_cpg(&body.params, &body);
                step_creature(&mut body, &forces, &mut grid, DEFAULT_GRAVITY);
            }
            for seg in &body.segments {
                assert!(seg.pos.is_finite() && seg.vel.is_finite(), "{species} produced NaN");
            }
        }
    }

    #[test]
    fn test_ragdoll_settles_and_fades() {
        let grid = TestGrid::with_floor(120, 60, 50);
        let mut body = Body::new(
            Arc::new(BodyPlan::serpent()),
            Vec2::new(60.0, 20.0),
            1.0,
            Vec::new(),
        );
        body.alive = false;
        let mut ticks = 0;
        while step_ragdoll(&mut body, &grid, DEFAULT_GRAVITY) {
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(ticks, RAGDOLL_FADE_TICKS - 1);
        for seg in &body.segments {
            assert!(seg.pos.y + seg.radius <= 50.0 + 0.01);
            assert!(seg.pos.y > 40.0, "corpse should have fallen to the floor");
        }
    }
}
