//! Cross-entropy method trainer for CPG controllers
//!
//! The trainer evaluates one candidate body at a time against a grid it is
//! handed on every [`Trainer::step`] call, and does as many physics ticks as
//! fit in a wall-clock budget before returning. A round ends once every
//! candidate has been scored; the sampling distribution is then refit to the
//! elite fraction and the next population is drawn.

use glam::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use std::sync::Arc;
use std::time::Duration;
use web_time::Instant;

use sandkin_creature::physics::DEFAULT_GRAVITY;
use sandkin_creature::{
    clamp_params, default_params, eval_cpg_into, param_bounds, spawn_creature, step_creature,
    Body, BodyPlan, GridMutAccess,
};
use sandkin_simulation::WorldRng;

use super::fitness::{RolloutStart, Task};

/// Default per-call wall-clock budget
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(8);
/// Rollout ends after this many ticks without the body moving
pub const STUCK_PATIENCE: u32 = 150;
const STUCK_DISTANCE: f32 = 1.0;
const TICKS_PER_SECOND: f32 = 60.0;

const ELITE_FRACTION: f32 = 0.25;
const MIN_ELITES: usize = 2;
/// Elite spread is widened by this factor
const STD_SCALE: f32 = 1.1;
/// Minimum std as a fraction of each parameter's range
const STD_FLOOR: f32 = 0.02;
/// Initial std as a fraction of each parameter's range
const INITIAL_STD: f32 = 0.25;
const MIN_POPULATION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    /// Evaluating candidates of the current population
    RoundRunning,
    /// The distribution was just refit; the next round starts on the next step
    RoundComplete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub params: Vec<f32>,
    /// `None` until the rollout has finished
    pub score: Option<f32>,
}

/// Snapshot of trainer progress for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerStats {
    pub generation: u32,
    pub best_score: f32,
    pub avg_score: f32,
    pub candidate_index: usize,
    pub pop_size: usize,
    pub running: bool,
}

/// The body currently being evaluated and its bookkeeping
struct Rollout {
    body: Body,
    start: RolloutStart,
    ticks: u32,
    anchor: Vec2,
    still_ticks: u32,
}

impl Rollout {
    fn new(body: Body) -> Self {
        let start = RolloutStart::of(&body);
        Self {
            anchor: start.center,
            start,
            body,
            ticks: 0,
            still_ticks: 0,
        }
    }

    /// Track movement of the center of mass; true once it has stalled too long
    fn update_stuck(&mut self) -> bool {
        let center = self.body.center_of_mass();
        if !center.is_finite() || center.distance(self.anchor) >= STUCK_DISTANCE {
            self.anchor = center;
            self.still_ticks = 0;
        } else {
            self.still_ticks += 1;
        }
        self.still_ticks >= STUCK_PATIENCE
    }
}

pub struct Trainer {
    plan: Arc<BodyPlan>,
    spawn: Vec2,
    task: Task,
    gravity: f32,
    time_budget: Duration,

    bounds: Vec<(f32, f32)>,
    mean: Vec<f32>,
    std: Vec<f32>,
    candidates: Vec<Candidate>,
    candidate_index: usize,
    eval_ticks: u32,
    rollout: Option<Rollout>,

    state: TrainerState,
    generation: u32,
    best_score: f32,
    best_params: Option<Vec<f32>>,
    avg_score: f32,

    forces: Vec<f32>,
    rng: Xoshiro256StarStar,
}

impl Trainer {
    pub fn new(plan: Arc<BodyPlan>, spawn_x: f32, spawn_y: f32, task: Task) -> Self {
        Self::with_seed(plan, spawn_x, spawn_y, task, 0)
    }

    pub fn with_seed(plan: Arc<BodyPlan>, spawn_x: f32, spawn_y: f32, task: Task, seed: u64) -> Self {
        let bounds = param_bounds(&plan);
        let mean = default_params(&plan);
        let spread = bounds.iter().map(|(lo, hi)| (hi - lo) * INITIAL_STD).collect();
        Self {
            plan,
            spawn: Vec2::new(spawn_x, spawn_y),
            task,
            gravity: DEFAULT_GRAVITY,
            time_budget: DEFAULT_TIME_BUDGET,
            bounds,
            mean,
            std: spread,
            candidates: Vec::new(),
            candidate_index: 0,
            eval_ticks: 0,
            rollout: None,
            state: TrainerState::Idle,
            generation: 0,
            best_score: f32::NEG_INFINITY,
            best_params: None,
            avg_score: 0.0,
            forces: Vec::new(),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    pub fn set_time_budget(&mut self, budget: Duration) {
        self.time_budget = budget;
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        if gravity.is_finite() {
            self.gravity = gravity;
        }
    }

    pub fn plan(&self) -> &Arc<BodyPlan> {
        &self.plan
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != TrainerState::Idle
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Current mean of the sampling distribution
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Current per-parameter standard deviation of the sampling distribution
    pub fn std(&self) -> &[f32] {
        &self.std
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Best score seen across all generations, `-inf` before the first rollout ends
    pub fn best_score(&self) -> f32 {
        self.best_score
    }

    pub fn best_params(&self) -> Option<&[f32]> {
        self.best_params.as_deref()
    }

    /// Body of the candidate under evaluation
    pub fn current_body(&self) -> Option<&Body> {
        self.rollout.as_ref().map(|r| &r.body)
    }

    pub fn stats(&self) -> TrainerStats {
        TrainerStats {
            generation: self.generation,
            best_score: self.best_score,
            avg_score: self.avg_score,
            candidate_index: self.candidate_index,
            pop_size: self.candidates.len(),
            running: self.is_running(),
        }
    }

    /// Sample a fresh population and begin evaluating it.
    ///
    /// The distribution and the best-ever record carry over from earlier runs.
    pub fn start(&mut self, pop_size: usize, eval_seconds: f32) {
        let pop_size = pop_size.max(MIN_POPULATION);
        let seconds = if eval_seconds.is_finite() {
            eval_seconds.max(0.0)
        } else {
            0.0
        };
        self.eval_ticks = ((seconds * TICKS_PER_SECOND).round() as u32).max(1);
        self.sample_population(pop_size);
        self.state = TrainerState::RoundRunning;
        self.begin_candidate();
        log::info!(
            "Training {} ({}) started: population {}, {} ticks per candidate",
            self.plan.name,
            self.task,
            pop_size,
            self.eval_ticks
        );
    }

    pub fn stop(&mut self) {
        if self.state == TrainerState::Idle {
            return;
        }
        self.state = TrainerState::Idle;
        self.rollout = None;
        log::info!(
            "Training stopped at generation {} (best {:.2})",
            self.generation,
            self.best_score
        );
    }

    /// Run rollouts until the time budget is spent or a round completes.
    ///
    /// Always advances at least one physics tick while running.
    pub fn step<G: GridMutAccess + ?Sized>(&mut self, grid: &mut G) {
        match self.state {
            TrainerState::Idle => return,
            TrainerState::RoundComplete => self.state = TrainerState::RoundRunning,
            TrainerState::RoundRunning => {}
        }

        let started = Instant::now();
        loop {
            if self.rollout.is_none() {
                self.begin_candidate();
            }
            let Some(rollout) = self.rollout.as_mut() else {
                return;
            };

            eval_cpg_into(&rollout.body.params, &rollout.body, &mut self.forces);
            step_creature(&mut rollout.body, &self.forces, grid, self.gravity);
            rollout.ticks += 1;

            let stuck = rollout.update_stuck();
            if !rollout.body.alive || stuck || rollout.ticks >= self.eval_ticks {
                self.finish_candidate();
                if self.state == TrainerState::RoundComplete {
                    return;
                }
            }

            if started.elapsed() >= self.time_budget {
                return;
            }
        }
    }

    /// Spawn the best-ever controller as a live body at the trainer's spawn point
    pub fn spawn_champion(&mut self) -> Option<Body> {
        let params = self.best_params.clone()?;
        Some(spawn_creature(&self.plan, self.spawn, Some(params), &mut self.rng))
    }

    fn sample_population(&mut self, pop_size: usize) {
        let mut candidates = Vec::with_capacity(pop_size);
        for _ in 0..pop_size {
            let mut params: Vec<f32> = self
                .mean
                .iter()
                .zip(&self.std)
                .map(|(m, s)| m + s * self.rng.gen_gaussian())
                .collect();
            clamp_params(&mut params, &self.plan);
            candidates.push(Candidate {
                params,
                score: None,
            });
        }
        self.candidates = candidates;
        self.candidate_index = 0;
        self.rollout = None;
    }

    fn begin_candidate(&mut self) {
        let Some(candidate) = self.candidates.get(self.candidate_index) else {
            return;
        };
        let body = spawn_creature(
            &self.plan,
            self.spawn,
            Some(candidate.params.clone()),
            &mut self.rng,
        );
        self.rollout = Some(Rollout::new(body));
    }

    fn finish_candidate(&mut self) {
        let Some(rollout) = self.rollout.take() else {
            return;
        };
        let score = self.task.score(&rollout.body, &rollout.start, rollout.ticks);
        let Some(candidate) = self.candidates.get_mut(self.candidate_index) else {
            return;
        };
        candidate.score = Some(score);
        if score.is_finite() && score > self.best_score {
            self.best_score = score;
            self.best_params = Some(candidate.params.clone());
        }

        self.candidate_index += 1;
        if self.candidate_index >= self.candidates.len() {
            self.finish_round();
        }
    }

    fn finish_round(&mut self) {
        let mut scored: Vec<(f32, &[f32])> = self
            .candidates
            .iter()
            .filter_map(|c| match c.score {
                Some(s) if s.is_finite() => Some((s, c.params.as_slice())),
                _ => None,
            })
            .collect();

        if scored.is_empty() {
            log::warn!(
                "Generation {}: no finite scores, keeping the previous distribution",
                self.generation
            );
        } else {
            self.avg_score = scored.iter().map(|(s, _)| s).sum::<f32>() / scored.len() as f32;
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));

            let pop = self.candidates.len();
            let elite_count = ((pop as f32 * ELITE_FRACTION).ceil() as usize)
                .max(MIN_ELITES)
                .min(scored.len());
            let elites = &scored[..elite_count];
            let n = elite_count as f32;

            for (i, (lo, hi)) in self.bounds.iter().enumerate() {
                let mean = elites.iter().map(|(_, p)| p[i]).sum::<f32>() / n;
                let var = elites.iter().map(|(_, p)| (p[i] - mean).powi(2)).sum::<f32>() / n;
                self.mean[i] = mean.clamp(*lo, *hi);
                self.std[i] = var.sqrt() * STD_SCALE + (hi - lo) * STD_FLOOR;
            }
            log::info!(
                "Generation {}: best {:.2}, avg {:.2}, elite {:.2}",
                self.generation,
                self.best_score,
                self.avg_score,
                elites[0].0
            );
        }

        self.generation += 1;
        self.state = TrainerState::RoundComplete;
        let pop = self.candidates.len();
        self.sample_population(pop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use sandkin_simulation::CellType;

    fn floor_grid() -> Grid {
        let mut grid = Grid::new(120, 50);
        grid.fill(0, 40, 119, 49, CellType::Wall);
        grid
    }

    fn trainer() -> Trainer {
        let plan = Arc::new(BodyPlan::crawler());
        let y = 40.0 - plan.radii[0] - 0.5;
        let mut trainer = Trainer::with_seed(plan, 60.0, y, Task::Survive, 3);
        trainer.set_time_budget(Duration::ZERO);
        trainer
    }

    #[test]
    fn test_idle_step_does_nothing() {
        let mut grid = floor_grid();
        let mut trainer = trainer();
        trainer.step(&mut grid);
        assert_eq!(trainer.state(), TrainerState::Idle);
        assert!(trainer.current_body().is_none());
        assert_eq!(trainer.best_score(), f32::NEG_INFINITY);
        assert!(trainer.spawn_champion().is_none());
    }

    #[test]
    fn test_start_samples_within_bounds() {
        let mut trainer = trainer();
        trainer.start(6, 0.5);
        assert_eq!(trainer.state(), TrainerState::RoundRunning);
        assert_eq!(trainer.candidates().len(), 6);
        assert!(trainer.current_body().is_some());
        let bounds = param_bounds(trainer.plan());
        for c in trainer.candidates() {
            assert_eq!(c.params.len(), bounds.len());
            for (p, (lo, hi)) in c.params.iter().zip(&bounds) {
                assert!(*p >= *lo && *p <= *hi);
            }
        }
    }

    #[test]
    fn test_population_floor() {
        let mut trainer = trainer();
        trainer.start(0, 0.5);
        assert_eq!(trainer.stats().pop_size, MIN_POPULATION);
    }

    #[test]
    fn test_round_completes_and_refits() {
        let mut grid = floor_grid();
        let mut trainer = trainer();
        trainer.start(4, 0.25);
        let std_before = trainer.std().to_vec();

        let mut steps = 0;
        while trainer.generation() == 0 {
            trainer.step(&mut grid);
            steps += 1;
            assert!(steps < 10_000, "round never completed");
        }

        assert_eq!(trainer.state(), TrainerState::RoundComplete);
        assert!(trainer.best_score().is_finite());
        assert!(trainer.best_params().is_some());
        assert_eq!(trainer.stats().candidate_index, 0);
        assert!(trainer.mean().iter().all(|m| m.is_finite()));
        assert!(trainer.std().iter().all(|s| s.is_finite() && *s > 0.0));
        assert_ne!(trainer.std(), std_before.as_slice());

        trainer.step(&mut grid);
        assert_eq!(trainer.state(), TrainerState::RoundRunning);
    }

    #[test]
    fn test_best_score_never_decreases() {
        let mut grid = floor_grid();
        let mut trainer = trainer();
        trainer.start(4, 0.25);
        let mut best = trainer.best_score();
        for _ in 0..400 {
            trainer.step(&mut grid);
            assert!(trainer.best_score() >= best);
            best = trainer.best_score();
        }
        assert!(trainer.generation() >= 1);
    }

    #[test]
    fn test_stop_and_champion() {
        let mut grid = floor_grid();
        let mut trainer = trainer();
        trainer.start(2, 0.1);
        while trainer.generation() == 0 {
            trainer.step(&mut grid);
        }
        trainer.stop();
        assert_eq!(trainer.state(), TrainerState::Idle);
        assert!(trainer.current_body().is_none());
        assert!(!trainer.stats().running);

        let champion = trainer.spawn_champion().expect("a candidate was scored");
        assert!(champion.alive);
        assert_eq!(champion.params.as_slice(), trainer.best_params().unwrap_or(&[]));
    }

    #[test]
    fn test_all_non_finite_scores_keep_distribution() {
        let mut trainer = trainer();
        trainer.start(3, 0.1);
        let mean = trainer.mean().to_vec();
        let std = trainer.std().to_vec();
        for c in trainer.candidates.iter_mut() {
            c.score = Some(f32::NAN);
        }
        trainer.finish_round();
        assert_eq!(trainer.mean(), mean.as_slice());
        assert_eq!(trainer.std(), std.as_slice());
        assert_eq!(trainer.generation(), 1);
    }
}
