//! Species-specific locomotion
//!
//! Each gait adds velocity impulses after grid collision, so it reads this
//! tick's contact flags (`gripped`, `grounded`, `in_water`). All oscillators
//! are driven by the body's phase, keeping the step deterministic.

use glam::Vec2;

use crate::body::Body;
use crate::physics::{chain_normal, chain_tangent};
use crate::plan::Gait;

const UNDULATE_FREQ: f32 = 0.15;
const UNDULATE_AMP: f32 = 0.03;
const UNDULATE_LAG: f32 = 0.8;
const GRIP_THRUST: f32 = 0.04;

const TETRAPOD_FREQ: f32 = 0.18;
const TETRAPOD_PUSH: f32 = 0.09;
const TETRAPOD_LIFT: f32 = 0.05;

const METACHRONAL_FREQ: f32 = 0.2;
const METACHRONAL_LAG: f32 = 0.6;
const METACHRONAL_THRUST: f32 = 0.05;
const METACHRONAL_SWING: f32 = 0.01;

const PERISTALTIC_FREQ: f32 = 0.08;
const PERISTALTIC_THRUST: f32 = 0.06;
const PERISTALTIC_ANCHOR: f32 = 0.5;
const PERISTALTIC_ARCH: f32 = 0.04;

const BELL_FREQ: f32 = 0.05;
const BELL_CONTRACT: f32 = 0.02;
const BELL_THRUST: f32 = 0.06;
const BELL_RELAX: f32 = 0.01;

const TAIL_FREQ: f32 = 0.2;
const TAIL_AMP: f32 = 0.04;
const TAIL_THRUST: f32 = 0.025;
const FLOP_FREQ: f32 = 0.03;
const FLOP_HOP: f32 = 0.2;

const FLAP_FREQ: f32 = 0.12;
const FLAP_LIFT: f32 = 0.012;
const FLAP_THRUST: f32 = 0.02;
const GLIDE_SINK: f32 = 0.004;
const GLIDE_FORWARD: f32 = 0.01;

const WAVE_FREQ: f32 = 0.12;
const WAVE_AMP: f32 = 0.025;
const WAVE_LAG: f32 = 0.7;

/// Oscillator value for a frequency in radians per tick
fn oscillator(body: &Body, freq: f32, lag: f32) -> f32 {
    (freq * body.phase * 60.0 - lag).sin()
}

/// Apply the gait selected by the body's species. Bodies with fewer than two segments are skipped.
pub fn apply_gait(body: &mut Body) {
    if body.segments.len() < 2 {
        return;
    }
    match body.plan.species.gait() {
        Gait::Undulate => undulate(body),
        Gait::Tetrapod => tetrapod(body),
        Gait::Metachronal => metachronal(body),
        Gait::Peristaltic => peristaltic(body),
        Gait::Bell => bell(body),
        Gait::TailBeat => tail_beat(body),
        Gait::FlapGlide => flap_glide(body),
        Gait::TravelingWave => traveling_wave(body),
    }
}

/// Perpendicular traveling wave, stronger toward the tail, plus grip thrust
fn undulate(body: &mut Body) {
    let n = body.segments.len();
    let facing = body.facing;
    for i in 0..n {
        let t = i as f32 / (n - 1) as f32;
        let amp = UNDULATE_AMP * (0.3 + 0.7 * t);
        let wave = oscillator(body, UNDULATE_FREQ, i as f32 * UNDULATE_LAG);
        let normal = chain_normal(chain_tangent(&body.segments, i, facing, false), facing);
        let seg = &mut body.segments[i];
        seg.vel += normal * amp * wave;
        if seg.gripped {
            seg.vel.x += GRIP_THRUST * facing;
        }
    }
}

/// Grip points split into two alternating groups on one oscillator
fn tetrapod(body: &mut Body) {
    let osc = oscillator(body, TETRAPOD_FREQ, 0.0);
    let active_group = if osc >= 0.0 { 0 } else { 1 };
    let facing = body.facing;
    let strength = osc.abs();

    let mut stance = 0;
    for (k, &idx) in body.plan.grip_indices.iter().enumerate() {
        if k % 2 != active_group {
            continue;
        }
        if let Some(seg) = body.segments.get_mut(idx) {
            if seg.gripped {
                stance += 1;
                seg.vel.x += TETRAPOD_PUSH * 0.3 * facing * strength;
            } else {
                // Swing leg reaches forward
                seg.vel.x += TETRAPOD_PUSH * 0.2 * facing * strength;
            }
        }
    }
    if stance == 0 {
        return;
    }
    let n = body.segments.len();
    body.segments[0].vel.x += TETRAPOD_PUSH * facing * strength;
    body.segments[n - 1].vel.y -= TETRAPOD_LIFT * strength;
}

/// Each leg's power stroke lags the previous one, so a wave runs down the body
fn metachronal(body: &mut Body) {
    let facing = body.facing;
    let grips = body.plan.grip_indices.clone();
    for (k, idx) in grips.into_iter().enumerate() {
        let s = oscillator(body, METACHRONAL_FREQ, k as f32 * METACHRONAL_LAG);
        let Some(seg) = body.segments.get_mut(idx) else {
            continue;
        };
        if s > 0.0 {
            if seg.gripped {
                seg.vel.x += METACHRONAL_THRUST * s * facing;
            }
        } else {
            seg.vel.y -= METACHRONAL_SWING * -s;
        }
    }
}

/// Front and back halves alternate between anchored and driven, with a mid-body arch
fn peristaltic(body: &mut Body) {
    let n = body.segments.len();
    let mid = n / 2;
    let osc = oscillator(body, PERISTALTIC_FREQ, 0.0);
    let facing = body.facing;
    let front_anchored = osc > 0.0;
    let drive = PERISTALTIC_THRUST * osc.abs();

    for (i, seg) in body.segments.iter_mut().enumerate() {
        let in_front = i < mid;
        if in_front == front_anchored {
            if seg.grounded {
                seg.vel.x *= PERISTALTIC_ANCHOR;
            }
        } else {
            seg.vel.x += drive * facing;
        }
    }
    body.segments[mid].vel.y -= PERISTALTIC_ARCH * osc.abs();
}

/// Contract toward the center of mass and thrust on the positive half, relax on the negative
fn bell(body: &mut Body) {
    let osc = oscillator(body, BELL_FREQ, 0.0);
    let com = body.center_of_mass();
    let facing = body.facing;
    let submerged = body.segments.iter().any(|s| s.in_water);

    for seg in body.segments.iter_mut() {
        let to_center = com - seg.pos;
        if osc > 0.0 {
            seg.vel += to_center * BELL_CONTRACT * osc;
            if submerged {
                seg.vel.y -= BELL_THRUST * osc;
                seg.vel.x += BELL_THRUST * 0.3 * osc * facing;
            }
        } else {
            seg.vel -= to_center.normalize_or_zero() * BELL_RELAX * -osc;
        }
    }
}

/// Traveling tail-beat in water; a passive flop on land
fn tail_beat(body: &mut Body) {
    let n = body.segments.len();
    let facing = body.facing;
    let submerged = body.segments.iter().any(|s| s.in_water);

    if submerged {
        let half = n / 2;
        let tail_len = (n - half).max(1) as f32;
        for i in half..n {
            let k = (i - half) as f32;
            let scale = 1.0 + k / tail_len;
            let wave = (TAIL_FREQ * scale * body.phase * 60.0 - k * 0.9).sin();
            let normal = chain_normal(chain_tangent(&body.segments, i, facing, false), facing);
            body.segments[i].vel += normal * TAIL_AMP * scale * wave;
        }
        for seg in body.segments.iter_mut() {
            seg.vel.x += TAIL_THRUST * facing;
        }
    } else {
        let flop = oscillator(body, FLOP_FREQ, 0.0);
        if flop > 0.97 && body.segments.iter().any(|s| s.grounded) {
            for (i, seg) in body.segments.iter_mut().enumerate() {
                let side = if i % 2 == 0 { 1.0 } else { 0.5 };
                seg.vel += Vec2::new(0.05 * facing, -FLOP_HOP * side);
            }
        }
    }
}

/// Lift and thrust on the downstroke, sinking glide otherwise
fn flap_glide(body: &mut Body) {
    let osc = oscillator(body, FLAP_FREQ, 0.0);
    let facing = body.facing;
    for seg in body.segments.iter_mut() {
        if osc > 0.0 {
            seg.vel.y -= FLAP_LIFT * osc;
            seg.vel.x += FLAP_THRUST * osc * facing;
        } else {
            seg.vel.y += GLIDE_SINK * -osc;
            seg.vel.x += GLIDE_FORWARD * facing;
        }
    }
}

/// Fallback for species without a dedicated gait
fn traveling_wave(body: &mut Body) {
    let n = body.segments.len();
    let facing = body.facing;
    for i in 0..n {
        let wave = oscillator(body, WAVE_FREQ, i as f32 * WAVE_LAG);
        let normal = chain_normal(chain_tangent(&body.segments, i, facing, false), facing);
        let seg = &mut body.segments[i];
        seg.vel += normal * WAVE_AMP * wave;
        if seg.gripped {
            seg.vel.x += GRIP_THRUST * facing;
        }
    }
}
