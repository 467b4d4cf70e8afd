//! Grid access traits for creature-grid interaction
//!
//! These traits define the interface between creatures and the material grid,
//! allowing the creature crate to be decoupled from the Grid implementation.

use glam::Vec2;
use sandkin_simulation::CellType;

/// Read-only access to the grid for creature sensing and collision
pub trait GridAccess {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Cell at grid coordinates; out-of-bounds reads are `Wall`
    fn cell(&self, x: i32, y: i32) -> CellType;

    /// Check if a cell blocks segment movement
    fn is_solid(&self, x: i32, y: i32) -> bool;

    /// Check if a segment may occupy a cell
    fn is_passable(&self, x: i32, y: i32) -> bool {
        !self.is_solid(x, y)
    }

    fn is_water(&self, x: i32, y: i32) -> bool {
        self.cell(x, y) == CellType::Water
    }

    /// Fire, magma and acid drain energy on contact
    fn is_hazard(&self, x: i32, y: i32) -> bool {
        matches!(
            self.cell(x, y),
            CellType::Fire | CellType::Magma | CellType::Acid
        )
    }

    /// Center of the nearest food cell within `radius` of `(x, y)`
    fn nearest_food(&self, x: f32, y: f32, radius: f32) -> Option<Vec2>;
}

/// Mutable access to the grid for creature actions (eating)
pub trait GridMutAccess: GridAccess {
    /// Remove food cells within `radius` of `(x, y)`, returning how many were eaten
    fn consume(&mut self, x: f32, y: f32, radius: f32) -> u32;
}
