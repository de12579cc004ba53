use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};

use super::{blend_pixel, effective_alpha, Dirty, PixelSurface};
use crate::geometry::{Color, ToolPoint};

const FALLBACK_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    /// Pixel height of the em box.
    pub size: f32,
    pub opacity: u8,
}

/// Loads the configured font, falling back to well-known system fonts.
pub fn load_font(configured: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = configured {
        match std::fs::read(path).map(FontArc::try_from_vec) {
            Ok(Ok(font)) => return Some(font),
            Ok(Err(err)) => tracing::warn!(?path, %err, "configured font is not a valid font file"),
            Err(err) => tracing::warn!(?path, ?err, "failed to read configured font"),
        }
    }

    FALLBACK_FONT_PATHS.iter().find_map(|path| {
        let data = std::fs::read(path).ok()?;
        let font = FontArc::try_from_vec(data).ok()?;
        tracing::debug!(path, "using fallback font");
        Some(font)
    })
}

impl PixelSurface {
    /// Stamps a single line of text with its baseline at `origin.y`.
    pub fn draw_text(
        &mut self,
        content: &str,
        origin: ToolPoint,
        style: &TextStyle,
        font: &FontArc,
    ) -> Option<Dirty> {
        if content.is_empty() {
            return None;
        }

        let scale = PxScale::from(style.size.max(1.0));
        let scaled = font.as_scaled(scale);
        let alpha = effective_alpha(style.color, style.opacity);
        let (width, height) = (self.width() as i32, self.height() as i32);
        let mut cursor_x = origin.x as f32;
        let baseline = origin.y as f32;
        let mut previous = None;
        let mut touched = false;

        for ch in content.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                cursor_x += scaled.kern(previous, glyph_id);
            }
            let glyph =
                glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline));
            cursor_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let pixels = self.pixels_mut();
            outlined.draw(|px, py, coverage| {
                let x = bounds.min.x as i32 + px as i32;
                let y = bounds.min.y as i32 + py as i32;
                if x < 0 || y < 0 || x >= width || y >= height || coverage <= 0.0 {
                    return;
                }
                let pixel = pixels.get_pixel_mut(x as u32, y as u32);
                blend_pixel(pixel, style.color, alpha * coverage);
                touched = true;
            });
        }

        touched.then(Dirty::new)
    }
}
