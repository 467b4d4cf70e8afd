//! PNG capture of the grid and every visible body

use anyhow::Result;
use std::path::Path;

use sandkin_core::creature::SegmentRenderData;
use sandkin_core::World;

/// RGBA frame of the world, each cell drawn as a `scale`x`scale` block
pub fn render_frame(world: &World, scale: usize) -> (Vec<u8>, usize, usize) {
    let scale = scale.max(1);
    let grid = world.grid();
    let (gw, gh) = (grid.width(), grid.height());
    let cells = grid.render_rgba_vec();

    let (width, height) = (gw * scale, gh * scale);
    let mut pixels = vec![0u8; width * height * 4];
    for y in 0..height {
        let row = (y / scale) * gw;
        for x in 0..width {
            let src = (row + x / scale) * 4;
            let dst = (y * width + x) * 4;
            pixels[dst..dst + 4].copy_from_slice(&cells[src..src + 4]);
        }
    }

    let bodies = world
        .corpses()
        .iter()
        .chain(world.creatures())
        .chain(world.trainer().and_then(|t| t.current_body()));
    for body in bodies {
        // Head last so it stays on top
        for segment in body.render_segments().iter().rev() {
            draw_disc(&mut pixels, width, height, scale as f32, segment);
        }
    }

    (pixels, width, height)
}

fn draw_disc(pixels: &mut [u8], width: usize, height: usize, scale: f32, segment: &SegmentRenderData) {
    let center = segment.position * scale;
    let radius = (segment.radius * scale).max(1.0);
    let x0 = (center.x - radius).floor().max(0.0) as usize;
    let y0 = (center.y - radius).floor().max(0.0) as usize;
    let x1 = ((center.x + radius).ceil().max(0.0) as usize).min(width);
    let y1 = ((center.y + radius).ceil().max(0.0) as usize).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= radius * radius {
                let i = (y * width + x) * 4;
                pixels[i..i + 4].copy_from_slice(&segment.color);
            }
        }
    }
}

/// Render the world and save it as a PNG
pub fn write_png(world: &World, path: impl AsRef<Path>, scale: usize) -> Result<()> {
    let (pixels, width, height) = render_frame(world, scale);
    save_buffer_as_png(&pixels, width, height, path.as_ref())?;
    log::info!("Snapshot saved to {}", path.as_ref().display());
    Ok(())
}

fn save_buffer_as_png(buffer: &[u8], width: usize, height: usize, path: &Path) -> Result<()> {
    use image::{ImageBuffer, Rgba};

    let img: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(width as u32, height as u32, buffer.to_vec())
            .ok_or_else(|| anyhow::anyhow!("Failed to create image buffer"))?;

    img.save(path)?;
    Ok(())
}
