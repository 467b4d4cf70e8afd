//! Central pattern generator
//!
//! Maps a flat controller vector and the body's phase to one force scalar per
//! segment. Layout of the vector:
//!
//! ```text
//! [omega, phase_offset, tilt_gain, amp_0, dc_0, amp_1, dc_1, ...]
//! ```
//!
//! Segments are split into up to four contiguous zones, each with its own
//! amplitude/offset pair. The evaluator holds no state and draws no randomness.

use crate::body::Body;
use crate::plan::BodyPlan;

pub const OMEGA: usize = 0;
pub const PHASE_OFFSET: usize = 1;
pub const TILT_GAIN: usize = 2;
/// Index of the first per-zone parameter
pub const ZONE_BASE: usize = 3;

const MAX_ZONES: usize = 4;

/// Number of CPG zones for a chain of `segments`
pub fn zone_count(segments: usize) -> usize {
    if segments < 2 {
        return 0;
    }
    (segments - 1).div_ceil(3).min(MAX_ZONES)
}

/// Length of the controller vector for a plan
pub fn param_count(plan: &BodyPlan) -> usize {
    ZONE_BASE + 2 * zone_count(plan.segment_count())
}

/// Zone that segment `index` belongs to
pub fn zone_of(index: usize, segments: usize, zones: usize) -> usize {
    if zones == 0 || segments == 0 {
        return 0;
    }
    (index * zones / segments).min(zones - 1)
}

/// Hand-tuned starting point: gentle wave, mild tilt damping
pub fn default_params(plan: &BodyPlan) -> Vec<f32> {
    let zones = zone_count(plan.segment_count());
    let mut params = vec![0.12, 0.7, 0.4];
    for _ in 0..zones {
        params.push(0.8);
        params.push(0.0);
    }
    params
}

/// Inclusive `(min, max)` range of every controller parameter
pub fn param_bounds(plan: &BodyPlan) -> Vec<(f32, f32)> {
    let zones = zone_count(plan.segment_count());
    let mut bounds = vec![
        (0.02, 0.4),
        (-std::f32::consts::PI, std::f32::consts::PI),
        (0.0, 2.0),
    ];
    for _ in 0..zones {
        bounds.push((0.0, 3.0));
        bounds.push((-1.5, 1.5));
    }
    bounds
}

/// Clamp each parameter into its bound, replacing non-finite values with the default
pub fn clamp_params(params: &mut [f32], plan: &BodyPlan) {
    let bounds = param_bounds(plan);
    let defaults = default_params(plan);
    for (i, p) in params.iter_mut().enumerate() {
        let Some(&(lo, hi)) = bounds.get(i) else {
            break;
        };
        if !p.is_finite() {
            *p = defaults[i];
        }
        *p = p.clamp(lo, hi);
    }
}

/// Force on a single segment.
///
/// `mass * (dc_zone + amp_zone * sin(omega * phase * 60 + index * phase_offset) - tilt_gain * tilt)`
pub fn segment_force(
    params: &[f32],
    phase: f32,
    index: usize,
    mass: f32,
    tilt: f32,
    zone: usize,
) -> f32 {
    let amp_idx = ZONE_BASE + 2 * zone;
    if params.len() <= amp_idx + 1 {
        return 0.0;
    }
    let omega = params[OMEGA];
    let offset = params[PHASE_OFFSET];
    let tilt_correction = -params[TILT_GAIN] * tilt;
    let amp = params[amp_idx];
    let dc = params[amp_idx + 1];
    let wave = (omega * phase * 60.0 + index as f32 * offset).sin();
    let force = mass * (dc + amp * wave + tilt_correction);
    if force.is_finite() {
        force
    } else {
        0.0
    }
}

/// Evaluate the controller for every segment of `body`
pub fn eval_cpg(params: &[f32], body: &Body) -> Vec<f32> {
    let mut forces = Vec::with_capacity(body.segments.len());
    eval_cpg_into(params, body, &mut forces);
    forces
}

/// Allocation-free variant of [`eval_cpg`] reusing `out`
pub fn eval_cpg_into(params: &[f32], body: &Body, out: &mut Vec<f32>) {
    let n = body.segments.len();
    out.clear();
    out.resize(n, 0.0);
    if n < 2 {
        return;
    }
    let zones = zone_count(n);
    let tilt = body.tilt();
    for (i, (force, seg)) in out.iter_mut().zip(&body.segments).enumerate() {
        *force = segment_force(params, body.phase, i, seg.mass, tilt, zone_of(i, n, zones));
    }
}
