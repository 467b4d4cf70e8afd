//! Cellular automata update logic - the per-tick pass and material movement

use sandkin_simulation::{CellType, MaterialType, WorldRng};

use super::Grid;

/// Chance per tick that a liquid tries to spread sideways
const WATER_FLOW: f32 = 0.9;
const OIL_FLOW: f32 = 0.5;
const ACID_FLOW: f32 = 0.8;
const MAGMA_FLOW: f32 = 0.15;
/// Magma only moves at all on this fraction of ticks
const MAGMA_MOBILITY: f32 = 0.5;

/// Water column height at which pressure starts to matter
const PRESSURE_MIN_COLUMN: usize = 3;
/// Column heights beyond this add no more pressure
const PRESSURE_MAX_COLUMN: usize = 8;
/// Extra lateral spread chance per stacked water cell
const PRESSURE_SPREAD_BONUS: f32 = 0.02;
/// Jet chance at full column height
const PRESSURE_JET_CHANCE: f32 = 0.5;

impl Grid {
    /// Run one simulation pass.
    ///
    /// Rows are scanned bottom to top so falling material is not processed
    /// twice; the horizontal direction alternates every pass.
    pub fn update(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        self.updated.fill(false);
        let left_to_right = self.frame % 2 == 0;

        for y in (0..self.height).rev() {
            for i in 0..self.width {
                let x = if left_to_right { i } else { self.width - 1 - i };
                let idx = y * self.width + x;
                if self.updated[idx] {
                    continue;
                }
                let cell = self.cells[idx];
                self.update_cell(x as i32, y as i32, cell);
            }
        }
    }

    fn update_cell(&mut self, x: i32, y: i32, cell: CellType) {
        match cell {
            CellType::Empty | CellType::Wall | CellType::Metal => {}
            CellType::Sand | CellType::Powder | CellType::Gunpowder | CellType::Food => {
                self.update_granular(x, y);
            }
            CellType::Salt => self.update_salt(x, y),
            CellType::Snow => self.update_snow(x, y),
            CellType::Seed => self.update_seed(x, y),
            CellType::Water => self.update_water(x, y),
            CellType::Oil => {
                self.update_liquid(x, y, OIL_FLOW);
            }
            CellType::Acid => self.update_acid(x, y),
            CellType::Magma => self.update_magma(x, y),
            CellType::Fire => self.update_fire(x, y),
            CellType::Steam => self.update_steam(x, y),
            CellType::Gas => self.update_gas(x, y),
            CellType::Ice => self.update_ice(x, y),
            CellType::Wood => self.update_wood(x, y),
            CellType::Vine => self.update_vine(x, y),
            CellType::Cloner => self.update_cloner(x, y),
            CellType::Bomb => self.update_bomb(x, y),
        }
    }

    /// Move a cell by swapping it with its destination.
    ///
    /// Succeeds when the destination is empty, or a liquid or gas lighter than the mover.
    pub(super) fn try_move(&mut self, x: i32, y: i32, to_x: i32, to_y: i32) -> bool {
        let (Some(from), Some(to)) = (self.index(x, y), self.index(to_x, to_y)) else {
            return false;
        };
        if !self.materials.can_displace(self.cells[from], self.cells[to]) {
            return false;
        }
        self.swap(from, to);
        true
    }

    /// Move a buoyant cell upward through empty space or any denser fluid
    pub(super) fn try_rise(&mut self, x: i32, y: i32, to_x: i32, to_y: i32) -> bool {
        let (Some(from), Some(to)) = (self.index(x, y), self.index(to_x, to_y)) else {
            return false;
        };
        let target = self.cells[to];
        let can_rise = target == CellType::Empty || {
            let mover = self.materials.get(self.cells[from]);
            let target = self.materials.get(target);
            matches!(
                target.material_type,
                MaterialType::Liquid | MaterialType::Gas
            ) && target.density > mover.density
        };
        if !can_rise {
            return false;
        }
        self.swap(from, to);
        true
    }

    /// Fall straight down, else slide diagonally with a random tie-break.
    ///
    /// Returns false when the cell stayed where it was.
    pub(super) fn update_granular(&mut self, x: i32, y: i32) -> bool {
        if self.try_move(x, y, x, y + 1) {
            return true;
        }
        let dx = self.rng.gen_sign();
        self.try_move(x, y, x + dx, y + 1) || self.try_move(x, y, x - dx, y + 1)
    }

    /// Fall, slide diagonally, then spread sideways with probability `flow`.
    ///
    /// Returns false when the cell stayed where it was.
    pub(super) fn update_liquid(&mut self, x: i32, y: i32, flow: f32) -> bool {
        if self.try_move(x, y, x, y + 1) {
            return true;
        }
        let dx = self.rng.gen_sign();
        if self.try_move(x, y, x + dx, y + 1) || self.try_move(x, y, x - dx, y + 1) {
            return true;
        }
        if !self.rng.check_probability(flow) {
            return false;
        }
        self.try_move(x, y, x + dx, y) || self.try_move(x, y, x - dx, y)
    }

    /// Water spreads further under a tall column and can jet two cells sideways
    fn update_water(&mut self, x: i32, y: i32) {
        if self.try_move(x, y, x, y + 1) {
            return;
        }
        let dx = self.rng.gen_sign();
        if self.try_move(x, y, x + dx, y + 1) || self.try_move(x, y, x - dx, y + 1) {
            return;
        }

        let column = self.water_column_above(x, y);
        if column >= PRESSURE_MIN_COLUMN {
            let pressure = column as f32 / PRESSURE_MAX_COLUMN as f32;
            if self.rng.check_probability(pressure * PRESSURE_JET_CHANCE)
                && (self.try_jet(x, y, dx) || self.try_jet(x, y, -dx))
            {
                return;
            }
        }

        let flow = (WATER_FLOW + PRESSURE_SPREAD_BONUS * column as f32).min(1.0);
        if self.rng.check_probability(flow) {
            let _ = self.try_move(x, y, x + dx, y) || self.try_move(x, y, x - dx, y);
        }
    }

    /// Stacked water cells directly above `(x, y)`, capped
    fn water_column_above(&self, x: i32, y: i32) -> usize {
        let mut column = 0;
        while column < PRESSURE_MAX_COLUMN && self.get(x, y - 1 - column as i32) == CellType::Water {
            column += 1;
        }
        column
    }

    /// Shoot two cells sideways when both cells in that direction are empty
    fn try_jet(&mut self, x: i32, y: i32, dx: i32) -> bool {
        if self.get(x + dx, y) != CellType::Empty || self.get(x + 2 * dx, y) != CellType::Empty {
            return false;
        }
        self.try_move(x, y, x + 2 * dx, y)
    }

    pub(super) fn update_slow_liquid(&mut self, x: i32, y: i32) -> bool {
        if !self.rng.check_probability(MAGMA_MOBILITY) {
            return false;
        }
        self.update_liquid(x, y, MAGMA_FLOW)
    }

    pub(super) fn update_acid_flow(&mut self, x: i32, y: i32) -> bool {
        self.update_liquid(x, y, ACID_FLOW)
    }

    /// Rise with a random lateral drift, then drift sideways when blocked
    pub(super) fn update_rising(&mut self, x: i32, y: i32) -> bool {
        let drift = (self.rng.gen_f32() * 3.0) as i32 - 1;
        if self.try_rise(x, y, x + drift, y - 1) || self.try_rise(x, y, x, y - 1) {
            return true;
        }
        let dx = self.rng.gen_sign();
        self.try_rise(x, y, x + dx, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(grid: &Grid) -> Vec<usize> {
        CellType::ALL.iter().map(|c| grid.count_type(*c)).collect()
    }

    #[test]
    fn test_sand_falls_one_cell_per_pass() {
        let mut grid = Grid::new(10, 10);
        grid.set(5, 2, CellType::Sand);
        grid.update();
        assert_eq!(grid.get(5, 2), CellType::Empty);
        assert_eq!(grid.get(5, 3), CellType::Sand);
    }

    #[test]
    fn test_sand_rests_on_floor_and_slides_off_edges() {
        let mut grid = Grid::new(10, 10);
        grid.fill(0, 9, 9, 9, CellType::Wall);
        grid.set(5, 8, CellType::Sand);
        grid.set(5, 7, CellType::Sand);
        grid.update();
        assert_eq!(grid.get(5, 8), CellType::Sand);
        // The upper grain cannot fall straight so it slides to a diagonal
        assert_eq!(grid.get(5, 7), CellType::Empty);
        assert!(grid.get(4, 8) == CellType::Sand || grid.get(6, 8) == CellType::Sand);
    }

    #[test]
    fn test_blocked_sand_stays() {
        let mut grid = Grid::new(10, 10);
        grid.fill(4, 6, 6, 6, CellType::Wall);
        grid.set(5, 5, CellType::Sand);
        for _ in 0..5 {
            grid.update();
        }
        assert_eq!(grid.get(5, 5), CellType::Sand);
    }

    #[test]
    fn test_sand_sinks_through_water() {
        let mut grid = Grid::new(5, 5);
        grid.fill(0, 0, 4, 4, CellType::Water);
        grid.set(2, 0, CellType::Sand);
        for _ in 0..10 {
            grid.update();
        }
        assert_eq!(grid.count_type(CellType::Sand), 1);
        assert!((0..5).any(|x| grid.get(x, 4) == CellType::Sand));
    }

    #[test]
    fn test_oil_floats_on_water() {
        let mut grid = Grid::with_seed(6, 10, 2);
        grid.fill(0, 0, 5, 2, CellType::Water);
        grid.fill(0, 7, 5, 9, CellType::Oil);
        for _ in 0..200 {
            grid.update();
        }
        for x in 0..6 {
            for y in 7..10 {
                assert_eq!(grid.get(x, y), CellType::Water);
            }
            for y in 4..7 {
                assert_eq!(grid.get(x, y), CellType::Oil);
            }
        }
    }

    #[test]
    fn test_water_levels_out() {
        let mut grid = Grid::with_seed(20, 10, 4);
        grid.fill(0, 0, 1, 9, CellType::Water);
        for _ in 0..400 {
            grid.update();
        }
        assert_eq!(grid.count_type(CellType::Water), 20);
        for x in 0..20 {
            assert_eq!(grid.get(x, 9), CellType::Water, "column {x} is dry");
        }
    }

    #[test]
    fn test_water_column_height() {
        let mut grid = Grid::new(5, 20);
        grid.fill(2, 5, 2, 19, CellType::Water);
        assert_eq!(grid.water_column_above(2, 19), PRESSURE_MAX_COLUMN);
        assert_eq!(grid.water_column_above(2, 7), 2);
        assert_eq!(grid.water_column_above(2, 5), 0);
    }

    #[test]
    fn test_jet_needs_two_empty_cells() {
        let mut grid = Grid::new(10, 3);
        grid.set(5, 1, CellType::Water);
        grid.set(7, 1, CellType::Sand);
        assert!(!grid.try_jet(5, 1, 1));
        assert!(grid.try_jet(5, 1, -1));
        assert_eq!(grid.get(3, 1), CellType::Water);
        assert_eq!(grid.get(5, 1), CellType::Empty);
    }

    #[test]
    fn test_steam_rises() {
        let mut grid = Grid::new(10, 20);
        grid.set(5, 15, CellType::Steam);
        for _ in 0..5 {
            grid.update();
        }
        let y = (0..20)
            .find(|&y| (0..10).any(|x| grid.get(x, y) == CellType::Steam))
            .unwrap_or(20);
        assert!(y < 15);
    }

    #[test]
    fn test_movement_conserves_material() {
        let mut grid = Grid::with_seed(40, 30, 9);
        grid.fill(0, 29, 39, 29, CellType::Wall);
        grid.paint(10, 8, 5, CellType::Sand, 0.8);
        grid.paint(25, 8, 5, CellType::Water, 0.8);
        grid.paint(32, 15, 3, CellType::Oil, 1.0);
        grid.paint(18, 18, 3, CellType::Salt, 1.0);
        grid.paint(5, 20, 2, CellType::Snow, 1.0);
        let before = counts(&grid);
        for _ in 0..50 {
            grid.update();
            assert_eq!(counts(&grid), before);
        }
    }
}
