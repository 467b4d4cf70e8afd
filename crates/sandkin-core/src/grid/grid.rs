//! Grid - fixed-size material grid with per-cell heat and auxiliary state

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use sandkin_simulation::{CellType, Materials, WorldRng};

/// Lifespan range given to freshly placed fire
pub const FIRE_LIFE_MIN: f32 = 0.8;
pub const FIRE_LIFE_MAX: f32 = 1.0;
/// Temperature magma holds itself at
pub const MAGMA_HEAT: f32 = 1.0;

/// The material cellular automaton.
///
/// Three parallel buffers describe each cell: its tag, a `heat` value whose
/// meaning depends on the tag (temperature, lifespan or growth budget) and an
/// `extra` value (bomb fuse, wood growth budget, cloner source).
pub struct Grid {
    pub(super) width: usize,
    pub(super) height: usize,
    pub(super) cells: Vec<CellType>,
    pub(super) heat: Vec<f32>,
    pub(super) extra: Vec<f32>,
    /// Cells already moved or created during the current pass
    pub(super) updated: Vec<bool>,
    /// Snapshot buffer for heat diffusion
    pub(super) heat_scratch: Vec<f32>,
    pub(super) materials: Materials,
    pub(super) rng: Xoshiro256StarStar,
    /// Number of completed update passes
    pub(super) frame: u64,
    pub(super) explosions: u64,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_seed(width, height, 0)
    }

    pub fn with_seed(width: usize, height: usize, seed: u64) -> Self {
        let area = width * height;
        Self {
            width,
            height,
            cells: vec![CellType::Empty; area],
            heat: vec![0.0; area],
            extra: vec![0.0; area],
            updated: vec![false; area],
            heat_scratch: vec![0.0; area],
            materials: Materials::new(),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            frame: 0,
            explosions: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    /// Number of `update` passes run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of explosions since creation
    pub fn explosions(&self) -> u64 {
        self.explosions
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub(super) fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Cell tag at `(x, y)`; everything outside the grid reads as wall
    pub fn get(&self, x: i32, y: i32) -> CellType {
        match self.index(x, y) {
            Some(idx) => self.cells[idx],
            None => CellType::Wall,
        }
    }

    /// Cell containing the point `(x, y)` in continuous coordinates
    pub fn cell_at(&self, x: f32, y: f32) -> CellType {
        if !x.is_finite() || !y.is_finite() {
            return CellType::Wall;
        }
        self.get(x.floor() as i32, y.floor() as i32)
    }

    pub fn heat(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(0.0, |idx| self.heat[idx])
    }

    pub fn extra(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(0.0, |idx| self.extra[idx])
    }

    /// Overwrite a cell, resetting heat and extra to the type's defaults.
    ///
    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, cell: CellType) {
        if let Some(idx) = self.index(x, y) {
            let heat = self.default_heat(cell);
            self.place(idx, cell, heat);
        }
    }

    /// Overwrite a cell with an explicit heat value
    pub fn set_with_heat(&mut self, x: i32, y: i32, cell: CellType, heat: f32) {
        if let Some(idx) = self.index(x, y) {
            let heat = if heat.is_finite() { heat } else { 0.0 };
            self.place(idx, cell, heat);
        }
    }

    pub(super) fn place(&mut self, idx: usize, cell: CellType, heat: f32) {
        self.cells[idx] = cell;
        self.heat[idx] = heat;
        self.extra[idx] = 0.0;
        self.updated[idx] = true;
    }

    /// Heat a freshly created cell starts with
    pub(super) fn default_heat(&mut self, cell: CellType) -> f32 {
        match cell {
            CellType::Fire => self.rng.gen_range_f32(FIRE_LIFE_MIN, FIRE_LIFE_MAX),
            CellType::Steam | CellType::Gas | CellType::Vine => 1.0,
            CellType::Magma => MAGMA_HEAT,
            _ => 0.0,
        }
    }

    /// Stochastically stamp a filled circle; `density` is the chance per cell
    pub fn paint(&mut self, cx: i32, cy: i32, radius: i32, cell: CellType, density: f32) {
        let radius = radius.max(0);
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > r2 || !self.in_bounds(cx + dx, cy + dy) {
                    continue;
                }
                if self.rng.check_probability(density) {
                    self.set(cx + dx, cy + dy, cell);
                }
            }
        }
    }

    /// Fill the inclusive rectangle spanned by two corners, clipped to the grid
    pub fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, cell: CellType) {
        let (min_x, max_x) = (x0.min(x1).max(0), x0.max(x1).min(self.width as i32 - 1));
        let (min_y, max_y) = (y0.min(y1).max(0), y0.max(y1).min(self.height as i32 - 1));
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.set(x, y, cell);
            }
        }
    }

    /// Scatter up to `count` food cells into random empty cells; returns how many were placed
    pub fn spawn_food(&mut self, count: usize) -> usize {
        if self.cells.is_empty() {
            return 0;
        }
        let mut placed = 0;
        let mut attempts = count * 20;
        while placed < count && attempts > 0 {
            attempts -= 1;
            let x = (self.rng.gen_f32() * self.width as f32) as i32;
            let y = (self.rng.gen_f32() * self.height as f32) as i32;
            if self.get(x, y) == CellType::Empty {
                self.set(x, y, CellType::Food);
                placed += 1;
            }
        }
        placed
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells.fill(CellType::Empty);
        self.heat.fill(0.0);
        self.extra.fill(0.0);
        self.updated.fill(false);
    }

    pub fn count_type(&self, cell: CellType) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Swap two cells with their heat and extra state, marking the destination as updated
    pub(super) fn swap(&mut self, from: usize, to: usize) {
        self.cells.swap(from, to);
        self.heat.swap(from, to);
        self.extra.swap(from, to);
        self.updated[to] = true;
    }
}
