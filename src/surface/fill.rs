use image::RgbaImage;

use crate::geometry::{Color, ToolPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillOutcome {
    /// Pixels recolored by the fill.
    pub filled: usize,
}

/// Stack-based 4-connected flood fill with exact RGBA matching.
///
/// The target color is read at `start`; a fill with the same color, or a start
/// outside the buffer, is a no-op. Filled pixels are written fully opaque.
pub fn flood_fill(buffer: &mut RgbaImage, start: ToolPoint, fill: Color) -> FillOutcome {
    let (width, height) = buffer.dimensions();
    if start.x < 0 || start.y < 0 || start.x as u32 >= width || start.y as u32 >= height {
        tracing::debug!(?start, "flood fill start outside surface");
        return FillOutcome::default();
    }

    let fill = fill.opaque().to_rgba();
    let target = *buffer.get_pixel(start.x as u32, start.y as u32);
    if target == fill {
        return FillOutcome::default();
    }

    let mut visited = vec![false; (width as usize) * (height as usize)];
    let mut stack: Vec<(u32, u32)> = Vec::with_capacity(1024);
    let mut filled = 0usize;
    stack.push((start.x as u32, start.y as u32));

    while let Some((x, y)) = stack.pop() {
        let index = (y as usize) * (width as usize) + (x as usize);
        if visited[index] {
            continue;
        }
        visited[index] = true;

        let pixel = buffer.get_pixel_mut(x, y);
        if *pixel != target {
            continue;
        }
        *pixel = fill;
        filled += 1;

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    tracing::debug!(?start, filled, "flood fill complete");
    FillOutcome { filled }
}
