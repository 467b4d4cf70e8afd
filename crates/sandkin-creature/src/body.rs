//! Creature instance data: a chain of segments plus per-individual bookkeeping
//!
//! A body has no behavior of its own; it is advanced by `physics::step_creature`.

use glam::Vec2;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::physics::RAGDOLL_FADE_TICKS;
use crate::plan::BodyPlan;
use crate::types::{CreatureId, Energy};
use crate::SegmentRenderData;

/// Maximum number of head positions kept for rendering
pub const TRAIL_LENGTH: usize = 32;

/// One circle of the segment chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub pos: Vec2,
    /// Position at the start of the current step
    pub prev: Vec2,
    /// Velocity in cells per tick
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    /// Designated ground-contact point (static, from the plan)
    pub is_grip: bool,
    /// Grip point touching the ground this tick
    pub gripped: bool,
    /// Resting on a solid cell this tick
    pub grounded: bool,
    /// Center inside a water cell this tick
    pub in_water: bool,
}

impl Segment {
    pub fn new(pos: Vec2, radius: f32, mass: f32, is_grip: bool) -> Self {
        Self {
            pos,
            prev: pos,
            vel: Vec2::ZERO,
            radius,
            mass,
            is_grip,
            gripped: false,
            grounded: false,
            in_water: false,
        }
    }
}

/// A living (or recently dead) creature
#[derive(Debug, Clone)]
pub struct Body {
    pub id: CreatureId,
    pub parent_id: Option<CreatureId>,
    pub plan: Arc<BodyPlan>,
    pub segments: Vec<Segment>,
    /// Controller parameter vector (`3 + 2 * zones` entries)
    pub params: Vec<f32>,

    /// Seconds of simulated time since spawn
    pub phase: f32,
    pub alive: bool,
    pub energy: Energy,
    /// Ticks since spawn
    pub age: u32,
    /// Lifespan in ticks, randomized at spawn
    pub max_age: u32,
    /// +1.0 moves toward larger x, -1.0 toward smaller x
    pub facing: f32,
    pub generation: u32,
    pub hue: f32,

    /// Recent head positions (rendering only)
    pub trail: VecDeque<Vec2>,
    /// Ticks left of the "just ate" highlight
    pub eat_flash: u8,
    /// Food cells eaten over the whole life
    pub food_eaten: u32,
    /// Food position picked up by the last sensing pass
    pub target: Option<Vec2>,

    /// Center-of-mass x when the stuck tracker was last reset
    pub stuck_anchor_x: f32,
    pub stuck_ticks: u32,
    /// Ticks left during which food sensing may not override a stuck-flip
    pub retreat_ticks: u32,
    /// Ticks spent as a ragdoll after death
    pub corpse_ticks: u32,
}

impl Body {
    /// Lay the segments out horizontally, head at `head`, tail trailing behind `facing`
    pub fn new(plan: Arc<BodyPlan>, head: Vec2, facing: f32, params: Vec<f32>) -> Self {
        let n = plan.segment_count();
        let facing = if facing < 0.0 { -1.0 } else { 1.0 };
        let mut segments = Vec::with_capacity(n);
        let mut x = head.x;
        for i in 0..n {
            if i > 0 {
                x -= facing * plan.rest_length(i - 1, i);
            }
            segments.push(Segment::new(
                Vec2::new(x, head.y),
                plan.radii[i],
                plan.masses[i],
                plan.is_grip(i),
            ));
        }
        let hue = plan.hue;

        let mut body = Self {
            id: CreatureId::UNASSIGNED,
            parent_id: None,
            plan,
            segments,
            params,
            phase: 0.0,
            alive: true,
            energy: Energy::default(),
            age: 0,
            max_age: u32::MAX,
            facing,
            generation: 0,
            hue,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            eat_flash: 0,
            food_eaten: 0,
            target: None,
            stuck_anchor_x: head.x,
            stuck_ticks: 0,
            retreat_ticks: 0,
            corpse_ticks: 0,
        };
        body.stuck_anchor_x = body.center_of_mass().x;
        body
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn head_pos(&self) -> Vec2 {
        self.segments.first().map(|s| s.pos).unwrap_or(Vec2::ZERO)
    }

    pub fn total_mass(&self) -> f32 {
        self.segments.iter().map(|s| s.mass).sum()
    }

    /// Mass-weighted center of all segments
    pub fn center_of_mass(&self) -> Vec2 {
        let total = self.total_mass();
        if total <= f32::EPSILON {
            return self.head_pos();
        }
        self.segments
            .iter()
            .fold(Vec2::ZERO, |acc, s| acc + s.pos * s.mass)
            / total
    }

    /// Radius of the smallest circle around the center of mass enclosing every segment
    pub fn extent(&self) -> f32 {
        let com = self.center_of_mass();
        self.segments
            .iter()
            .map(|s| s.pos.distance(com) + s.radius)
            .fold(0.0, f32::max)
    }

    /// Angle of the tail-to-head line above the horizontal, measured in the facing direction.
    ///
    /// Positive when the head is raised; zero for bodies with fewer than two segments.
    pub fn tilt(&self) -> f32 {
        if self.segments.len() < 2 {
            return 0.0;
        }
        let head = self.segments[0].pos;
        let tail = self.segments[self.segments.len() - 1].pos;
        let dx = (head.x - tail.x) * self.facing;
        let dy = tail.y - head.y;
        if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
            return 0.0;
        }
        dy.atan2(dx)
    }

    pub fn grip_count(&self) -> usize {
        self.segments.iter().filter(|s| s.gripped).count()
    }

    /// Push the head position onto the bounded trail
    pub fn record_trail(&mut self) {
        let head = self.head_pos();
        if self.trail.len() >= TRAIL_LENGTH {
            self.trail.pop_front();
        }
        self.trail.push_back(head);
    }

    /// Per-segment circles with a color derived from hue, energy and state
    pub fn render_segments(&self) -> Vec<SegmentRenderData> {
        let vitality = if self.alive {
            0.45 + 0.55 * self.energy.ratio()
        } else {
            let fade = 1.0 - (self.corpse_ticks as f32 / RAGDOLL_FADE_TICKS as f32).min(1.0);
            0.25 * fade
        };
        let flash = if self.eat_flash > 0 { 0.25 } else { 0.0 };
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let shade = if i == 0 { 1.0 } else { 0.85 };
                let [r, g, b] = hue_to_rgb(self.hue, (vitality * shade + flash).min(1.0));
                SegmentRenderData {
                    position: s.pos,
                    radius: s.radius,
                    color: [r, g, b, 255],
                }
            })
            .collect()
    }
}

/// Fully saturated hue at the given brightness
fn hue_to_rgb(hue: f32, value: f32) -> [u8; 3] {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let v = value.clamp(0.0, 1.0) * 255.0;
    [(r * v) as u8, (g * v) as u8, (b * v) as u8]
}
