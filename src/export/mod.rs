//! Merges the surface and sticker layer into one raster and encodes it.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::filter::FilterState;
use crate::sticker::StickerLayer;
use crate::surface::PixelSurface;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no source image has been loaded")]
    SurfaceUnavailable,
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// External collaborator that persists exported images ("save & use").
pub trait ExportSink {
    fn persist(&self, png: &[u8]) -> anyhow::Result<()>;
}

/// Surface pixels with every ready sticker painted on top, bottom first.
///
/// Selection outlines and handles are never part of the composite.
pub fn composite(surface: &PixelSurface, stickers: &StickerLayer) -> RgbaImage {
    let mut output = surface.pixels().clone();
    stickers.composite_onto(&mut output);
    output
}

/// Composite with the filter applied, as written to disk or handed to a sink.
pub fn render_export(
    surface: &PixelSurface,
    stickers: &StickerLayer,
    filter: &FilterState,
) -> RgbaImage {
    filter.apply(&composite(surface, stickers))
}

/// On-screen rendering: the export image plus the selection overlay.
pub fn render_preview(
    surface: &PixelSurface,
    stickers: &StickerLayer,
    filter: &FilterState,
) -> RgbaImage {
    let mut output = render_export(surface, stickers, filter);
    stickers.draw_selection_overlay(&mut output);
    output
}

pub fn encode_png(image: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPreset;
    use crate::geometry::{Color, ToolBounds};

    fn fixture() -> (PixelSurface, StickerLayer, u64) {
        let surface = PixelSurface::new(100, 100, Color::WHITE);
        let mut stickers = StickerLayer::default();
        let id = stickers.add_ready(
            RgbaImage::from_pixel(40, 40, image::Rgba([0, 255, 0, 255])),
            ToolBounds::new(20, 20, 40, 40),
        );
        (surface, stickers, id)
    }

    #[test]
    fn export_never_contains_selection_overlay() {
        let (surface, mut stickers, id) = fixture();
        let unselected = render_export(&surface, &stickers, &FilterState::default());
        stickers.select(id);
        let selected = render_export(&surface, &stickers, &FilterState::default());
        assert_eq!(selected, unselected);

        let preview = render_preview(&surface, &stickers, &FilterState::default());
        assert_ne!(preview, selected);
    }

    #[test]
    fn composite_keeps_surface_size_and_leaves_surface_untouched() {
        let (surface, stickers, _) = fixture();
        let before = surface.pixels().clone();
        let output = composite(&surface, &stickers);
        assert_eq!(output.dimensions(), (100, 100));
        assert_eq!(output.get_pixel(30, 30).0, [0, 255, 0, 255]);
        assert_eq!(surface.pixels(), &before);
    }

    #[test]
    fn export_applies_filter_over_merged_layers() {
        let (surface, stickers, _) = fixture();
        let mut filter = FilterState::default();
        filter.apply_preset(FilterPreset::Grayscale);
        let output = render_export(&surface, &stickers, &filter);
        let [r, g, b, _] = output.get_pixel(30, 30).0;
        assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
    }

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let (surface, stickers, _) = fixture();
        let output = composite(&surface, &stickers);
        let png = encode_png(&output).expect("png should encode");
        let decoded = image::load_from_memory(&png)
            .expect("png should decode")
            .to_rgba8();
        assert_eq!(decoded, output);
    }
}
