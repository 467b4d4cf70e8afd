//! Spatial queries used by creatures, and the creature trait impls for [`Grid`]

use glam::Vec2;

use sandkin_creature::{GridAccess, GridMutAccess};
use sandkin_simulation::CellType;

use super::Grid;

impl Grid {
    /// Cells a creature segment cannot enter (walls, solids, settled powders)
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.materials.get(self.get(x, y)).supports_creatures
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        !self.is_solid(x, y)
    }

    /// Inclusive cell range covering a disc, clipped to the grid
    fn disc_bounds(&self, x: f32, y: f32, radius: f32) -> Option<(i32, i32, i32, i32)> {
        if !x.is_finite() || !y.is_finite() || !radius.is_finite() || radius < 0.0 {
            return None;
        }
        let min_x = ((x - radius).floor() as i32).max(0);
        let max_x = ((x + radius).ceil() as i32).min(self.width as i32 - 1);
        let min_y = ((y - radius).floor() as i32).max(0);
        let max_y = ((y + radius).ceil() as i32).min(self.height as i32 - 1);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some((min_x, min_y, max_x, max_y))
    }

    /// Center of the closest food cell within `radius` of `(x, y)`
    pub fn nearest_food(&self, x: f32, y: f32, radius: f32) -> Option<Vec2> {
        let (min_x, min_y, max_x, max_y) = self.disc_bounds(x, y, radius)?;
        let origin = Vec2::new(x, y);
        let mut best: Option<(f32, Vec2)> = None;
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                if self.get(cx, cy) != CellType::Food {
                    continue;
                }
                let center = Vec2::new(cx as f32 + 0.5, cy as f32 + 0.5);
                let d = center.distance(origin);
                if d <= radius && best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, center));
                }
            }
        }
        best.map(|(_, center)| center)
    }

    /// Remove every food cell whose center lies within `radius`; returns the amount eaten
    pub fn consume(&mut self, x: f32, y: f32, radius: f32) -> u32 {
        let Some((min_x, min_y, max_x, max_y)) = self.disc_bounds(x, y, radius) else {
            return 0;
        };
        let origin = Vec2::new(x, y);
        let mut eaten = 0;
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                if self.get(cx, cy) != CellType::Food {
                    continue;
                }
                let center = Vec2::new(cx as f32 + 0.5, cy as f32 + 0.5);
                if center.distance(origin) <= radius {
                    self.set(cx, cy, CellType::Empty);
                    eaten += 1;
                }
            }
        }
        eaten
    }
}

impl GridAccess for Grid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn cell(&self, x: i32, y: i32) -> CellType {
        self.get(x, y)
    }

    fn is_solid(&self, x: i32, y: i32) -> bool {
        Grid::is_solid(self, x, y)
    }

    fn is_passable(&self, x: i32, y: i32) -> bool {
        Grid::is_passable(self, x, y)
    }

    fn is_hazard(&self, x: i32, y: i32) -> bool {
        self.materials.get(self.get(x, y)).hazardous
    }

    fn nearest_food(&self, x: f32, y: f32, radius: f32) -> Option<Vec2> {
        Grid::nearest_food(self, x, y, radius)
    }
}

impl GridMutAccess for Grid {
    fn consume(&mut self, x: f32, y: f32, radius: f32) -> u32 {
        Grid::consume(self, x, y, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_food_picks_closest_center() {
        let mut grid = Grid::new(40, 40);
        grid.set(10, 10, CellType::Food);
        grid.set(20, 10, CellType::Food);
        let found = grid.nearest_food(18.0, 10.0, 15.0);
        assert_eq!(found, Some(Vec2::new(20.5, 10.5)));
        assert_eq!(grid.nearest_food(30.0, 30.0, 5.0), None);
    }

    #[test]
    fn test_nearest_food_near_edges_and_invalid_input() {
        let mut grid = Grid::new(10, 10);
        grid.set(0, 0, CellType::Food);
        assert_eq!(grid.nearest_food(-2.0, -2.0, 5.0), Some(Vec2::new(0.5, 0.5)));
        assert_eq!(grid.nearest_food(f32::NAN, 1.0, 5.0), None);
        assert_eq!(grid.nearest_food(1.0, 1.0, -1.0), None);
    }

    #[test]
    fn test_consume_removes_food_in_radius() {
        let mut grid = Grid::new(20, 20);
        grid.set(5, 5, CellType::Food);
        grid.set(6, 5, CellType::Food);
        grid.set(15, 15, CellType::Food);
        grid.set(5, 6, CellType::Sand);

        let eaten = grid.consume(6.0, 6.0, 1.5);

        assert_eq!(eaten, 2);
        assert_eq!(grid.get(5, 5), CellType::Empty);
        assert_eq!(grid.get(5, 6), CellType::Sand);
        assert_eq!(grid.count_type(CellType::Food), 1);
        assert_eq!(grid.consume(6.0, 6.0, 1.5), 0);
    }

    #[test]
    fn test_solidity_follows_material_table() {
        let mut grid = Grid::new(10, 10);
        grid.set(1, 1, CellType::Wall);
        grid.set(2, 1, CellType::Water);
        assert!(grid.is_solid(1, 1));
        assert!(grid.is_passable(2, 1));
        assert!(grid.is_passable(3, 3));
        assert!(grid.is_solid(-1, 3));
    }

    #[test]
    fn test_trait_view_matches_inherent_queries() {
        let mut grid = Grid::new(10, 10);
        grid.set(4, 4, CellType::Magma);
        grid.set(5, 4, CellType::Water);
        let view: &dyn GridAccess = &grid;
        assert_eq!(view.width(), 10);
        assert_eq!(view.cell(4, 4), CellType::Magma);
        assert!(view.is_hazard(4, 4));
        assert!(view.is_water(5, 4));
        assert!(!view.is_hazard(5, 4));
        assert_eq!(view.cell(20, 0), CellType::Wall);
    }
}
