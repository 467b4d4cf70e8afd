//! Minimal in-memory grid for unit tests

use glam::Vec2;
use sandkin_simulation::{CellType, Materials};

use crate::traits::{GridAccess, GridMutAccess};

pub struct TestGrid {
    width: usize,
    height: usize,
    floor_y: usize,
    cells: Vec<CellType>,
    materials: Materials,
}

impl TestGrid {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            floor_y: height,
            cells: vec![CellType::Empty; width * height],
            materials: Materials::new(),
        }
    }

    /// Wall from row `floor_y` down to the bottom edge
    pub fn with_floor(width: usize, height: usize, floor_y: usize) -> Self {
        let mut grid = Self::empty(width, height);
        grid.floor_y = floor_y;
        for y in floor_y..height {
            for x in 0..width {
                grid.set(x as i32, y as i32, CellType::Wall);
            }
        }
        grid
    }

    pub fn floor_y(&self) -> usize {
        self.floor_y
    }

    pub fn set(&mut self, x: i32, y: i32, cell: CellType) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    pub fn count(&self, cell: CellType) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }
}

impl GridAccess for TestGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn cell(&self, x: i32, y: i32) -> CellType {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return CellType::Wall;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    fn is_solid(&self, x: i32, y: i32) -> bool {
        self.materials.get(self.cell(x, y)).supports_creatures
    }

    fn nearest_food(&self, x: f32, y: f32, radius: f32) -> Option<Vec2> {
        let mut best: Option<(f32, Vec2)> = None;
        for (i, cell) in self.cells.iter().enumerate() {
            if *cell != CellType::Food {
                continue;
            }
            let center = Vec2::new((i % self.width) as f32 + 0.5, (i / self.width) as f32 + 0.5);
            let d = center.distance(Vec2::new(x, y));
            if d <= radius && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, center));
            }
        }
        best.map(|(_, c)| c)
    }
}

impl GridMutAccess for TestGrid {
    fn consume(&mut self, x: f32, y: f32, radius: f32) -> u32 {
        let mut eaten = 0;
        for i in 0..self.cells.len() {
            if self.cells[i] != CellType::Food {
                continue;
            }
            let center = Vec2::new((i % self.width) as f32 + 0.5, (i / self.width) as f32 + 0.5);
            if center.distance(Vec2::new(x, y)) <= radius {
                self.cells[i] = CellType::Empty;
                eaten += 1;
            }
        }
        eaten
    }
}
