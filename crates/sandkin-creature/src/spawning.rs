//! Creature spawning and reproduction

use glam::Vec2;
use std::sync::Arc;

use sandkin_simulation::WorldRng;

use crate::body::Body;
use crate::cpg::{clamp_params, default_params, param_bounds, param_count};
use crate::plan::BodyPlan;
use crate::types::Energy;

/// Lifespan range in ticks
pub const MIN_LIFESPAN: u32 = 3600;
pub const MAX_LIFESPAN: u32 = 7200;

pub const REPRODUCE_MIN_ENERGY: f32 = 160.0;
pub const REPRODUCE_MIN_AGE: u32 = 300;
/// Chance per eligible check that a body reproduces
pub const REPRODUCE_PROBABILITY: f32 = 0.004;
pub const REPRODUCE_COST: f32 = 60.0;
pub const CHILD_ENERGY: f32 = 80.0;

/// Gaussian mutation strength as a fraction of each parameter's range
const PARAM_MUTATION: f32 = 0.05;
const HUE_MUTATION: f32 = 0.02;

/// Create a body from a plan with its head at `head`.
///
/// `params` of the wrong length (or `None`) fall back to the plan's defaults.
pub fn spawn_creature<R: WorldRng + ?Sized>(
    plan: &Arc<BodyPlan>,
    head: Vec2,
    params: Option<Vec<f32>>,
    rng: &mut R,
) -> Body {
    let expected = param_count(plan);
    let mut params = match params {
        Some(p) if p.len() == expected => p,
        _ => default_params(plan),
    };
    clamp_params(&mut params, plan);

    let facing = rng.gen_sign() as f32;
    let mut body = Body::new(Arc::clone(plan), head, facing, params);
    let span = (MAX_LIFESPAN - MIN_LIFESPAN) as f32;
    body.max_age = MIN_LIFESPAN + (rng.gen_f32() * span) as u32;
    log::debug!(
        "Spawned {} at ({:.1}, {:.1}), lifespan {}",
        plan.name,
        head.x,
        head.y,
        body.max_age
    );
    body
}

/// Try to produce one offspring.
///
/// Requires enough energy and age, then succeeds with a fixed probability.
/// The child starts next to the parent's head with mutated parameters and hue.
pub fn try_reproduce<R: WorldRng + ?Sized>(parent: &mut Body, rng: &mut R) -> Option<Body> {
    if !parent.alive
        || parent.is_empty()
        || parent.energy.current < REPRODUCE_MIN_ENERGY
        || parent.age < REPRODUCE_MIN_AGE
    {
        return None;
    }
    if !rng.check_probability(REPRODUCE_PROBABILITY) {
        return None;
    }

    parent.energy.drain(REPRODUCE_COST);

    let plan = Arc::clone(&parent.plan);
    let bounds = param_bounds(&plan);
    let mut params = parent.params.clone();
    for (p, (lo, hi)) in params.iter_mut().zip(&bounds) {
        *p += rng.gen_gaussian() * PARAM_MUTATION * (hi - lo);
    }

    let head = parent.head_pos();
    let offset = Vec2::new(-parent.facing * plan.radii[0] * 2.0, -plan.radii[0]);
    let mut child = spawn_creature(&plan, head + offset, Some(params), rng);
    child.hue = (parent.hue + rng.gen_gaussian() * HUE_MUTATION).rem_euclid(1.0);
    child.energy = Energy::new(CHILD_ENERGY);
    child.generation = parent.generation + 1;
    child.parent_id = Some(parent.id);

    log::debug!(
        "{} reproduced (generation {})",
        parent.id,
        child.generation
    );
    Some(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CreatureId;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn serpent() -> Arc<BodyPlan> {
        Arc::new(BodyPlan::serpent())
    }

    fn ready_parent(rng: &mut Xoshiro256StarStar) -> Body {
        let mut parent = spawn_creature(&serpent(), Vec2::new(50.0, 30.0), None, rng);
        parent.id = CreatureId::from_raw(3);
        parent.energy = Energy::new(190.0);
        parent.age = REPRODUCE_MIN_AGE;
        parent
    }

    #[test]
    fn test_spawn_uses_defaults_for_bad_params() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let plan = serpent();
        let body = spawn_creature(&plan, Vec2::new(10.0, 10.0), Some(vec![1.0]), &mut rng);
        assert_eq!(body.params, default_params(&plan));
        assert!(body.alive);
        assert_eq!(body.generation, 0);
    }

    #[test]
    fn test_spawn_keeps_valid_params() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let plan = serpent();
        let mut params = default_params(&plan);
        params[0] = 0.2;
        let body = spawn_creature(&plan, Vec2::new(10.0, 10.0), Some(params.clone()), &mut rng);
        assert_eq!(body.params, params);
    }

    #[test]
    fn test_spawn_randomizes_lifespan() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let plan = serpent();
        let ages: Vec<u32> = (0..20)
            .map(|_| spawn_creature(&plan, Vec2::new(10.0, 10.0), None, &mut rng).max_age)
            .collect();
        assert!(ages.iter().all(|a| (MIN_LIFESPAN..=MAX_LIFESPAN).contains(a)));
        assert!(ages.iter().any(|a| *a != ages[0]));
    }

    #[test]
    fn test_reproduce_gates() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(9);

        let mut young = ready_parent(&mut rng);
        young.age = REPRODUCE_MIN_AGE - 1;
        let mut hungry = ready_parent(&mut rng);
        hungry.energy = Energy::new(REPRODUCE_MIN_ENERGY - 1.0);
        let mut dead = ready_parent(&mut rng);
        dead.alive = false;

        for _ in 0..5000 {
            assert!(try_reproduce(&mut young, &mut rng).is_none());
            assert!(try_reproduce(&mut hungry, &mut rng).is_none());
            assert!(try_reproduce(&mut dead, &mut rng).is_none());
        }
    }

    #[test]
    fn test_reproduce_eventually_and_mutates() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let mut parent = ready_parent(&mut rng);
        let parent_params = parent.params.clone();

        let mut child = None;
        for _ in 0..10_000 {
            if let Some(c) = try_reproduce(&mut parent, &mut rng) {
                child = Some(c);
                break;
            }
        }
        let child = child.expect("reproduction should happen with enough attempts");

        assert!((parent.energy.current - (190.0 - REPRODUCE_COST)).abs() < 1e-4);
        assert_eq!(child.energy.current, CHILD_ENERGY);
        assert_eq!(child.generation, 1);
        assert_eq!(child.parent_id, Some(CreatureId::from_raw(3)));
        assert_eq!(child.params.len(), parent_params.len());
        assert_ne!(child.params, parent_params);
        let bounds = param_bounds(&parent.plan);
        for (p, (lo, hi)) in child.params.iter().zip(&bounds) {
            assert!(*p >= *lo && *p <= *hi);
        }
        assert!((0.0..1.0).contains(&child.hue));
        assert!(child.head_pos().distance(parent.head_pos()) < 10.0);
    }
}
