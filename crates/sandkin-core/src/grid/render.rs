//! RGBA render hook for presentation layers

use sandkin_simulation::CellType;

use super::Grid;

const HEAT_TINT: f32 = 110.0;
const ARMED_BOMB: [u8; 4] = [255, 230, 80, 255];

fn tint(channel: u8, amount: f32) -> u8 {
    (channel as f32 + amount).clamp(0.0, 255.0) as u8
}

fn scale(color: [u8; 4], factor: f32) -> [u8; 4] {
    let f = factor.clamp(0.0, 1.0);
    [
        (color[0] as f32 * f) as u8,
        (color[1] as f32 * f) as u8,
        (color[2] as f32 * f) as u8,
        color[3],
    ]
}

impl Grid {
    /// Color of a single cell, taking heat and auxiliary state into account
    pub fn cell_color(&self, x: i32, y: i32) -> [u8; 4] {
        let Some(idx) = self.index(x, y) else {
            return self.materials.get_color(CellType::Wall);
        };
        let cell = self.cells[idx];
        let def = self.materials.get(cell);
        let heat = self.heat[idx];
        match cell {
            // Fading flames darken toward smoke
            CellType::Fire => scale(def.color, 0.45 + 0.55 * heat),
            CellType::Steam | CellType::Gas => {
                let mut color = def.color;
                color[3] = (color[3] as f32 * heat.clamp(0.2, 1.0)) as u8;
                color
            }
            CellType::Bomb if self.extra[idx] > 0.0 && (self.extra[idx] as u32) % 4 < 2 => ARMED_BOMB,
            _ if !def.heat_is_timer && heat > 0.0 => [
                tint(def.color[0], heat * HEAT_TINT),
                tint(def.color[1], heat * HEAT_TINT * 0.3),
                tint(def.color[2], -heat * HEAT_TINT * 0.5),
                def.color[3],
            ],
            _ => def.color,
        }
    }

    /// Write the grid as row-major RGBA8 into `buffer`.
    ///
    /// A short buffer receives as many whole pixels as fit.
    pub fn render_rgba(&self, buffer: &mut [u8]) {
        for (i, pixel) in buffer.chunks_exact_mut(4).take(self.cells.len()).enumerate() {
            let x = (i % self.width) as i32;
            let y = (i / self.width) as i32;
            pixel.copy_from_slice(&self.cell_color(x, y));
        }
    }

    pub fn render_rgba_vec(&self) -> Vec<u8> {
        let mut buffer = vec![0; self.cells.len() * 4];
        self.render_rgba(&mut buffer);
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_uses_material_colors() {
        let mut grid = Grid::new(4, 3);
        grid.set(1, 0, CellType::Sand);
        let buffer = grid.render_rgba_vec();
        assert_eq!(buffer.len(), 4 * 3 * 4);
        let sand = grid.materials().get_color(CellType::Sand);
        assert_eq!(&buffer[4..8], &sand);
        let empty = grid.materials().get_color(CellType::Empty);
        assert_eq!(&buffer[0..4], &empty);
    }

    #[test]
    fn test_hot_cells_are_redder() {
        let mut grid = Grid::new(4, 1);
        grid.set(0, 0, CellType::Metal);
        grid.set_with_heat(1, 0, CellType::Metal, 1.0);
        let cold = grid.cell_color(0, 0);
        let hot = grid.cell_color(1, 0);
        assert!(hot[0] >= cold[0]);
        assert!(hot[2] <= cold[2]);
        assert_ne!(hot, cold);
    }

    #[test]
    fn test_dying_fire_is_darker() {
        let mut grid = Grid::new(4, 1);
        grid.set_with_heat(0, 0, CellType::Fire, 1.0);
        grid.set_with_heat(1, 0, CellType::Fire, 0.1);
        let bright = grid.cell_color(0, 0);
        let dim = grid.cell_color(1, 0);
        assert!(dim[0] < bright[0] || dim[1] < bright[1]);
    }

    #[test]
    fn test_short_buffer_is_not_overrun() {
        let mut grid = Grid::new(4, 4);
        grid.fill(0, 0, 3, 3, CellType::Wall);
        let mut buffer = vec![0u8; 10];
        grid.render_rgba(&mut buffer);
        let wall = grid.materials().get_color(CellType::Wall);
        assert_eq!(&buffer[0..4], &wall);
        assert_eq!(&buffer[8..10], &[0, 0]);
    }

    #[test]
    fn test_render_does_not_mutate() {
        let mut grid = Grid::with_seed(8, 8, 2);
        grid.paint(4, 4, 3, CellType::Fire, 1.0);
        let before: Vec<f32> = (0..8).map(|x| grid.heat(x, 4)).collect();
        let _ = grid.render_rgba_vec();
        let after: Vec<f32> = (0..8).map(|x| grid.heat(x, 4)).collect();
        assert_eq!(before, after);
        assert_eq!(grid.frame(), 0);
    }
}
