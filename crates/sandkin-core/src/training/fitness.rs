//! Task-specific fitness for trainer rollouts
//!
//! Every task adds the same flat bonus for finishing alive and a small term
//! for how many segments are gripping the ground at the end of the rollout.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use sandkin_creature::Body;
use sandkin_simulation::ParseNameError;

const ALIVE_BONUS: f32 = 10.0;
const GRIP_WEIGHT: f32 = 2.0;
const ENERGY_WEIGHT: f32 = 5.0;
/// Ticks per second of simulated time
const TICKS_PER_SECOND: f32 = 60.0;
const FORAGE_ENERGY_WEIGHT: f32 = 0.5;
const FORAGE_PROGRESS_WEIGHT: f32 = 0.3;
const CLIMB_WEIGHT: f32 = 2.0;

/// What a trainer optimizes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Travel horizontally and stay healthy
    #[default]
    Survive,
    /// Gain energy by eating
    Forage,
    /// Gain height
    Climb,
}

impl Task {
    pub fn all() -> &'static [Task] {
        &[Task::Survive, Task::Forage, Task::Climb]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::Survive => "survive",
            Task::Forage => "forage",
            Task::Climb => "climb",
        }
    }

    /// Score a finished rollout that lasted `ticks` steps
    pub fn score(&self, body: &Body, start: &RolloutStart, ticks: u32) -> f32 {
        let center = body.center_of_mass();
        let energy_ratio = body.energy.ratio();
        let task_score = match self {
            Task::Survive => {
                let progress = (center.x - start.center.x).abs();
                progress + ticks as f32 / TICKS_PER_SECOND + energy_ratio * ENERGY_WEIGHT
            }
            Task::Forage => {
                let gained = body.energy.current - start.energy;
                let progress = (center.x - start.center.x).abs();
                gained * FORAGE_ENERGY_WEIGHT + progress * FORAGE_PROGRESS_WEIGHT
            }
            Task::Climb => {
                let climbed = start.center.y - center.y;
                climbed * CLIMB_WEIGHT + energy_ratio * ENERGY_WEIGHT
            }
        };

        let alive = if body.alive { ALIVE_BONUS } else { 0.0 };
        task_score + alive + grip_term(body)
    }
}

/// Positive when most segments grip, negative when few do
fn grip_term(body: &Body) -> f32 {
    if body.is_empty() {
        return 0.0;
    }
    let ratio = body.grip_count() as f32 / body.len() as f32;
    (ratio - 0.5) * GRIP_WEIGHT
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Task::all()
            .iter()
            .copied()
            .find(|task| task.name() == lower)
            .ok_or_else(|| ParseNameError::new("task", s, &["survive", "forage", "climb"]))
    }
}

/// Body state captured when a rollout begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutStart {
    pub center: Vec2,
    pub energy: f32,
}

impl RolloutStart {
    pub fn of(body: &Body) -> Self {
        Self {
            center: body.center_of_mass(),
            energy: body.energy.current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandkin_creature::BodyPlan;
    use std::sync::Arc;

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Arc::new(BodyPlan::serpent()), Vec2::new(x, y), 1.0, Vec::new())
    }

    fn moved(body: &Body, delta: Vec2) -> Body {
        let mut moved = body.clone();
        moved.segments.iter_mut().for_each(|s| s.pos += delta);
        moved
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Forage".parse::<Task>(), Ok(Task::Forage));
        assert_eq!(Task::Climb.to_string(), "climb");
        let err = "dance".parse::<Task>().unwrap_err();
        assert!(err.to_string().contains("survive"));
    }

    #[test]
    fn test_survive_rewards_distance_either_way() {
        let body = body_at(50.0, 30.0);
        let start = RolloutStart::of(&body);
        let still = Task::Survive.score(&body, &start, 100);
        let left = Task::Survive.score(&moved(&body, Vec2::new(-8.0, 0.0)), &start, 100);
        let right = Task::Survive.score(&moved(&body, Vec2::new(8.0, 0.0)), &start, 100);
        assert!(left > still);
        assert!((left - right).abs() < 1e-3);
    }

    #[test]
    fn test_dead_bodies_lose_alive_bonus() {
        let body = body_at(50.0, 30.0);
        let start = RolloutStart::of(&body);
        let mut dead = body.clone();
        dead.alive = false;
        let diff = Task::Survive.score(&body, &start, 10) - Task::Survive.score(&dead, &start, 10);
        assert!((diff - ALIVE_BONUS).abs() < 1e-4);
    }

    #[test]
    fn test_forage_rewards_energy_gain() {
        let body = body_at(50.0, 30.0);
        let start = RolloutStart::of(&body);
        let mut fed = body.clone();
        fed.energy.gain(40.0);
        let gain = Task::Forage.score(&fed, &start, 10) - Task::Forage.score(&body, &start, 10);
        assert!((gain - 40.0 * FORAGE_ENERGY_WEIGHT).abs() < 1e-4);
    }

    #[test]
    fn test_climb_rewards_height_not_depth() {
        let body = body_at(50.0, 30.0);
        let start = RolloutStart::of(&body);
        let up = Task::Climb.score(&moved(&body, Vec2::new(0.0, -5.0)), &start, 10);
        let down = Task::Climb.score(&moved(&body, Vec2::new(0.0, 5.0)), &start, 10);
        let still = Task::Climb.score(&body, &start, 10);
        assert!(up > still && still > down);
    }

    #[test]
    fn test_grip_term_bounds() {
        let mut body = body_at(50.0, 30.0);
        assert!((grip_term(&body) + 1.0).abs() < 1e-6);
        body.segments.iter_mut().for_each(|s| s.gripped = true);
        assert!((grip_term(&body) - 1.0).abs() < 1e-6);
    }
}
