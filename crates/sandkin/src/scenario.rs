//! Terrain presets for headless runs

use glam::Vec2;
use std::fmt;
use std::str::FromStr;

use sandkin_core::creature::BodyPlan;
use sandkin_core::simulation::{CellType, ParseNameError};
use sandkin_core::Grid;

/// Rows of solid ground below the open area
const FLOOR_DEPTH: i32 = 12;
const HILL_STEPS: i32 = 6;
const HILL_STEP_HEIGHT: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Level floor with scattered food
    #[default]
    Flat,
    /// Floor with a water basin in the middle
    Pond,
    /// Staircase rising to the right, for climbing
    Hill,
}

impl Scenario {
    pub fn all() -> &'static [Scenario] {
        &[Scenario::Flat, Scenario::Pond, Scenario::Hill]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Flat => "flat",
            Scenario::Pond => "pond",
            Scenario::Hill => "hill",
        }
    }

    /// Paint the terrain into an empty grid
    pub fn build(&self, grid: &mut Grid) {
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        let floor = h - FLOOR_DEPTH;
        grid.fill(0, floor, w - 1, h - 1, CellType::Wall);

        match self {
            Scenario::Flat => {}
            Scenario::Pond => {
                let (left, right) = (w / 3, 2 * w / 3);
                let depth = (FLOOR_DEPTH - 2).max(1);
                grid.fill(left, floor, right, floor + depth - 1, CellType::Water);
                grid.fill(left - 3, floor - 2, left - 1, floor - 1, CellType::Sand);
                grid.fill(right + 1, floor - 2, right + 3, floor - 1, CellType::Sand);
            }
            Scenario::Hill => {
                let start = w / 2;
                let step_width = ((w - start) / HILL_STEPS).max(1);
                for i in 0..HILL_STEPS {
                    let x0 = start + i * step_width;
                    let top = floor - (i + 1) * HILL_STEP_HEIGHT;
                    grid.fill(x0, top, w - 1, floor - 1, CellType::Wall);
                }
            }
        }
        log::debug!("Built {} terrain on a {}x{} grid", self.name(), w, h);
    }

    /// Head position for a body of `plan` resting on the ground at column `x`
    pub fn spawn_point(&self, grid: &Grid, plan: &BodyPlan, x: f32) -> Vec2 {
        let ground = ground_y(grid, x.floor() as i32);
        let radius = plan.radii.first().copied().unwrap_or(1.0);
        Vec2::new(x, ground as f32 - radius - 0.5)
    }

    /// Column where training candidates start
    pub fn training_x(&self, grid: &Grid) -> f32 {
        match self {
            Scenario::Flat | Scenario::Pond => grid.width() as f32 * 0.2,
            Scenario::Hill => grid.width() as f32 * 0.4,
        }
    }
}

/// First row from the top at column `x` that creatures can stand on
pub fn ground_y(grid: &Grid, x: i32) -> i32 {
    (0..grid.height() as i32)
        .find(|&y| grid.is_solid(x, y) || grid.get(x, y) == CellType::Water)
        .unwrap_or(grid.height() as i32)
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Scenario::all()
            .iter()
            .copied()
            .find(|scenario| scenario.name() == lower)
            .ok_or_else(|| ParseNameError::new("scenario", s, &["flat", "pond", "hill"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenarios() {
        assert_eq!("Pond".parse::<Scenario>(), Ok(Scenario::Pond));
        assert!("volcano".parse::<Scenario>().is_err());
        assert_eq!(Scenario::Hill.to_string(), "hill");
    }

    #[test]
    fn test_flat_floor_height() {
        let mut grid = Grid::new(100, 60);
        Scenario::Flat.build(&mut grid);
        for x in [0, 50, 99] {
            assert_eq!(ground_y(&grid, x), 60 - FLOOR_DEPTH);
        }
    }

    #[test]
    fn test_pond_holds_water() {
        let mut grid = Grid::new(120, 60);
        Scenario::Pond.build(&mut grid);
        assert!(grid.count_type(CellType::Water) > 0);
        let water = grid.count_type(CellType::Water);
        for _ in 0..100 {
            grid.update();
        }
        assert_eq!(grid.count_type(CellType::Water), water);
    }

    #[test]
    fn test_hill_rises_to_the_right() {
        let mut grid = Grid::new(120, 60);
        Scenario::Hill.build(&mut grid);
        let left = ground_y(&grid, 10);
        let middle = ground_y(&grid, 80);
        let right = ground_y(&grid, 118);
        assert!(left > middle && middle > right);
    }

    #[test]
    fn test_spawn_point_is_above_ground() {
        let mut grid = Grid::new(100, 60);
        Scenario::Flat.build(&mut grid);
        let plan = BodyPlan::serpent();
        let p = Scenario::Flat.spawn_point(&grid, &plan, 30.0);
        assert!(p.y + plan.radii[0] <= (60 - FLOOR_DEPTH) as f32);
        assert!(grid.is_passable(p.x as i32, p.y as i32));
    }
}
