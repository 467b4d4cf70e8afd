//! Interactions between bodies: predator/prey steering, segment collision and body push-apart
//!
//! All three passes are O(n²) over live bodies. Predator/prey first collects
//! its decisions from an immutable view and applies them afterwards, so the
//! outcome does not depend on body order within a pass.

use glam::Vec2;

use crate::body::Body;
use crate::physics::clamp_velocity;
use crate::plan::Diet;

pub const FLEE_RADIUS: f32 = 25.0;
pub const HUNT_RADIUS: f32 = 40.0;
/// Energy removed from prey per interaction pass while a hunter touches it
pub const BITE_DAMAGE: f32 = 4.0;
/// Fraction of the bite that the hunter gains
pub const BITE_TRANSFER: f32 = 0.6;

const STEER_IMPULSE: f32 = 0.15;
const CONTACT_MARGIN: f32 = 0.5;
const EPSILON: f32 = 1e-6;

#[derive(Debug, Default, Clone, Copy)]
struct Decision {
    /// Direction the head should be pushed toward
    steer: Option<Vec2>,
    /// Body index being bitten this pass
    bite: Option<usize>,
}

/// Herbivores flee; carnivores and omnivores chase and bite smaller bodies
pub fn interact_creatures(bodies: &mut [Body]) {
    let n = bodies.len();
    if n < 2 {
        return;
    }

    let centers: Vec<Vec2> = bodies.iter().map(|b| b.center_of_mass()).collect();
    let masses: Vec<f32> = bodies.iter().map(|b| b.total_mass()).collect();
    let mut decisions = vec![Decision::default(); n];

    for i in 0..n {
        if !bodies[i].alive || bodies[i].is_empty() {
            continue;
        }
        let diet = bodies[i].plan.diet;
        match diet.prey_mass_fraction() {
            None => {
                // Herbivore: flee from the nearest non-herbivore
                let threat = (0..n)
                    .filter(|&j| j != i && bodies[j].alive && bodies[j].plan.diet != Diet::Herbivore)
                    .map(|j| (j, centers[i].distance(centers[j])))
                    .filter(|(_, d)| *d < FLEE_RADIUS)
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((j, _)) = threat {
                    decisions[i].steer = Some(centers[i] - centers[j]);
                }
            }
            Some(fraction) => {
                let limit = masses[i] * fraction;
                let prey = (0..n)
                    .filter(|&j| j != i && bodies[j].alive && masses[j] < limit)
                    .map(|j| (j, centers[i].distance(centers[j])))
                    .filter(|(_, d)| *d < HUNT_RADIUS)
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((j, _)) = prey {
                    decisions[i].steer = Some(centers[j] - centers[i]);
                    if segments_touch(&bodies[i], &bodies[j]) {
                        decisions[i].bite = Some(j);
                    }
                }
            }
        }
    }

    for (i, decision) in decisions.iter().enumerate() {
        if let Some(dir) = decision.steer {
            steer(&mut bodies[i], dir);
        }
        if let Some(j) = decision.bite {
            let taken = BITE_DAMAGE.min(bodies[j].energy.current);
            bodies[j].energy.drain(taken);
            bodies[i].energy.gain(taken * BITE_TRANSFER);
            bodies[i].eat_flash = 10;
            log::debug!("{} bit {} for {:.1}", bodies[i].id, bodies[j].id, taken);
        }
    }
}

fn steer(body: &mut Body, dir: Vec2) {
    let dir = dir.normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    if dir.x.abs() > EPSILON {
        body.facing = dir.x.signum();
    }
    if let Some(head) = body.segments.first_mut() {
        head.vel = clamp_velocity(head.vel + dir * STEER_IMPULSE);
    }
}

fn segments_touch(a: &Body, b: &Body) -> bool {
    a.segments.iter().any(|sa| {
        b.segments
            .iter()
            .any(|sb| sa.pos.distance(sb.pos) < sa.radius + sb.radius + CONTACT_MARGIN)
    })
}

/// Separate overlapping segments of different bodies, split by inverse mass
pub fn collide_creature_segments(bodies: &mut [Body]) {
    let n = bodies.len();
    for i in 0..n {
        let (left, right) = bodies.split_at_mut(i + 1);
        let a = &mut left[i];
        if !a.alive {
            continue;
        }
        for b in right.iter_mut() {
            if !b.alive {
                continue;
            }
            for sa in a.segments.iter_mut() {
                for sb in b.segments.iter_mut() {
                    let delta = sb.pos - sa.pos;
                    let dist = delta.length();
                    let min_dist = sa.radius + sb.radius;
                    if dist >= min_dist || dist < EPSILON {
                        continue;
                    }
                    let w_a = 1.0 / sa.mass.max(EPSILON);
                    let w_b = 1.0 / sb.mass.max(EPSILON);
                    let push = delta / dist * (min_dist - dist) / (w_a + w_b);
                    sa.pos -= push * w_a;
                    sb.pos += push * w_b;
                }
            }
        }
    }
}

/// Push whole bodies apart when their bounding circles overlap
pub fn push_creatures_apart(bodies: &mut [Body]) {
    let n = bodies.len();
    for i in 0..n {
        let (left, right) = bodies.split_at_mut(i + 1);
        let a = &mut left[i];
        if !a.alive || a.is_empty() {
            continue;
        }
        for b in right.iter_mut() {
            if !b.alive || b.is_empty() {
                continue;
            }
            let ca = a.center_of_mass();
            let cb = b.center_of_mass();
            let delta = cb - ca;
            let dist = delta.length();
            let min_dist = (a.extent() + b.extent()) * 0.5;
            if dist >= min_dist || dist < EPSILON {
                continue;
            }
            let ma = a.total_mass().max(EPSILON);
            let mb = b.total_mass().max(EPSILON);
            let overlap = (min_dist - dist) * 0.1;
            let dir = delta / dist;
            let shift_a = dir * overlap * (mb / (ma + mb));
            let shift_b = dir * overlap * (ma / (ma + mb));
            for s in a.segments.iter_mut() {
                s.pos -= shift_a;
            }
            for s in b.segments.iter_mut() {
                s.pos += shift_b;
            }
        }
    }
}
