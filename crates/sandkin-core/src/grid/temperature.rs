//! Heat diffusion between neighboring cells

use sandkin_simulation::CellType;

use super::grid::MAGMA_HEAT;
use super::Grid;

/// Temperature a timer cell radiates into its neighbors
fn radiated_heat(cell: CellType) -> f32 {
    match cell {
        CellType::Fire => 1.0,
        CellType::Steam => 0.4,
        _ => 0.0,
    }
}

impl Grid {
    /// One explicit diffusion step over the whole grid.
    ///
    /// Every cell's effective temperature is snapshotted first, so the result
    /// does not depend on scan order. Timer cells (fire, steam, gas, seeds,
    /// vines, empty space) keep their `heat` untouched but still radiate a
    /// fixed temperature. Conducting cells move toward the average of their
    /// in-bounds neighbors, scaled by `strength` and their own conductivity.
    pub fn diffuse_heat(&mut self, strength: f32) {
        let strength = if strength.is_finite() {
            strength.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if strength == 0.0 {
            return;
        }

        for idx in 0..self.cells.len() {
            let cell = self.cells[idx];
            self.heat_scratch[idx] = if self.materials.get(cell).heat_is_timer {
                radiated_heat(cell)
            } else {
                self.heat[idx]
            };
        }

        let (w, h) = (self.width as i32, self.height as i32);
        for y in 0..h {
            for x in 0..w {
                let idx = (y * w + x) as usize;
                let def = self.materials.get(self.cells[idx]);
                if def.heat_is_timer || def.conductivity <= 0.0 {
                    continue;
                }
                if self.cells[idx] == CellType::Magma {
                    self.heat[idx] = MAGMA_HEAT;
                    continue;
                }

                let own = self.heat_scratch[idx];
                let mut sum = 0.0;
                let mut count = 0;
                for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
                    if let Some(n) = self.index(x + dx, y + dy) {
                        sum += self.heat_scratch[n];
                        count += 1;
                    }
                }
                if count == 0 {
                    continue;
                }
                let avg = sum / count as f32;
                let next = own + strength * def.conductivity * (avg - own);
                self.heat[idx] = next.clamp(0.0, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_spreads_through_metal() {
        let mut grid = Grid::new(12, 3);
        grid.fill(0, 1, 11, 1, CellType::Metal);
        grid.set_with_heat(0, 1, CellType::Metal, 1.0);

        for _ in 0..40 {
            grid.set_with_heat(0, 1, CellType::Metal, 1.0);
            grid.diffuse_heat(1.0);
        }

        assert!(grid.heat(1, 1) > grid.heat(3, 1));
        assert!(grid.heat(3, 1) > grid.heat(6, 1));
        assert!(grid.heat(3, 1) > 0.0);
        // Empty neighbors radiate nothing, so the far end stays cooler
        assert!(grid.heat(11, 1) < grid.heat(1, 1));
    }

    #[test]
    fn test_hot_metal_melts_enclosed_ice() {
        let mut grid = Grid::new(5, 5);
        grid.set(2, 2, CellType::Ice);
        for (x, y) in [(2, 1), (3, 2), (2, 3), (1, 2)] {
            grid.set_with_heat(x, y, CellType::Metal, 1.0);
        }

        grid.diffuse_heat(1.0);
        assert!((grid.heat(2, 2) - 0.6).abs() < 1e-5, "ice heat {}", grid.heat(2, 2));

        grid.update();
        assert_eq!(grid.get(2, 2), CellType::Water);
    }

    #[test]
    fn test_timer_cells_keep_their_heat() {
        let mut grid = Grid::new(6, 6);
        grid.set_with_heat(2, 2, CellType::Seed, 0.25);
        grid.set_with_heat(3, 2, CellType::Metal, 1.0);
        grid.set_with_heat(2, 3, CellType::Gas, 0.7);

        grid.diffuse_heat(1.0);

        assert_eq!(grid.heat(2, 2), 0.25);
        assert_eq!(grid.heat(2, 3), 0.7);
        assert_eq!(grid.heat(0, 0), 0.0);
    }

    #[test]
    fn test_fire_warms_neighbors() {
        let mut grid = Grid::new(5, 5);
        grid.set(2, 2, CellType::Fire);
        grid.set(3, 2, CellType::Sand);
        grid.diffuse_heat(1.0);
        assert!(grid.heat(3, 2) > 0.0);
    }

    #[test]
    fn test_zero_or_invalid_strength_is_noop() {
        let mut grid = Grid::new(5, 5);
        grid.set_with_heat(1, 1, CellType::Metal, 1.0);
        grid.set(2, 1, CellType::Metal);
        grid.diffuse_heat(0.0);
        grid.diffuse_heat(f32::NAN);
        assert_eq!(grid.heat(2, 1), 0.0);
        assert_eq!(grid.heat(1, 1), 1.0);
    }
}
