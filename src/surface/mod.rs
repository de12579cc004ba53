//! The editable base raster and its drawing primitives.

mod fill;
pub(crate) mod raster;
mod text;

use image::{imageops, DynamicImage, RgbaImage};
use rand::Rng;

use crate::geometry::{Color, ImageBounds, ToolPoint};
use crate::history::Snapshot;
use raster::{Cap, Coverage};

pub use fill::{flood_fill, FillOutcome};
pub use text::{load_font, TextStyle};

/// Marker returned by every mutating primitive.
///
/// The editor session folds these into the active gesture and commits one history
/// snapshot per finished gesture.
#[must_use = "surface edits must be committed to history"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dirty(());

impl Dirty {
    pub(crate) const fn new() -> Self {
        Self(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushShape {
    #[default]
    Round,
    Square,
    /// Scattered single pixels; drawn through [`PixelSurface::spray`].
    Spray,
}

impl BrushShape {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Square => "square",
            Self::Spray => "spray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: u32,
    /// Percent, `0..=100`.
    pub opacity: u8,
    pub shape: BrushShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Circle,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeStyle {
    pub color: Color,
    pub width: u32,
    pub opacity: u8,
    /// Closed shapes are filled instead of outlined. Lines ignore it.
    pub fill: bool,
}

#[derive(Debug, Clone)]
pub struct PixelSurface {
    pixels: RgbaImage,
    background: Color,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let pixels = RgbaImage::from_pixel(width.max(1), height.max(1), background.to_rgba());
        Self { pixels, background }
    }

    /// Builds a surface from a decoded source image, downscaled to `max_width`
    /// with proportional height.
    pub fn from_source(source: &DynamicImage, max_width: u32, background: Color) -> Self {
        let mut surface = Self::new(1, 1, background);
        surface.pixels = fit_source(source, max_width);
        surface.paint_background_under();
        surface
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn bounds(&self) -> ImageBounds {
        ImageBounds::new(
            i32::try_from(self.width()).unwrap_or(i32::MAX),
            i32::try_from(self.height()).unwrap_or(i32::MAX),
        )
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Reads the pixel under `point`; `None` outside the surface.
    pub fn sample_color(&self, point: ToolPoint) -> Option<Color> {
        if !self.bounds().contains(point) {
            return None;
        }
        let pixel = *self.pixels.get_pixel(point.x as u32, point.y as u32);
        Some(Color::from_rgba(pixel))
    }

    pub fn draw_stroke(&mut self, points: &[ToolPoint], style: &StrokeStyle) -> Option<Dirty> {
        let cap = match style.shape {
            BrushShape::Square => Cap::Square,
            BrushShape::Round | BrushShape::Spray => Cap::Round,
        };
        let mut mask = self.coverage();
        raster::stroke_polyline(&mut mask, points, style.width, cap);
        self.blend_coverage(&mask, style.color, style.opacity)
    }

    /// Scatters `dots` single pixels uniformly inside a disc of `radius` around `center`.
    pub fn spray<R: Rng>(
        &mut self,
        center: ToolPoint,
        radius: u32,
        dots: u32,
        color: Color,
        opacity: u8,
        rng: &mut R,
    ) -> Option<Dirty> {
        let radius = radius.max(1) as f32;
        let mut mask = self.coverage();
        for _ in 0..dots {
            let angle = rng.random_range(0.0f32..std::f32::consts::TAU);
            let distance = rng.random_range(0.0f32..=radius);
            let x = center.x as f32 + angle.cos() * distance;
            let y = center.y as f32 + angle.sin() * distance;
            mask.mark(x.round() as i64, y.round() as i64);
        }
        self.blend_coverage(&mask, color, opacity)
    }

    pub fn draw_shape(
        &mut self,
        kind: ShapeKind,
        start: ToolPoint,
        end: ToolPoint,
        style: &ShapeStyle,
    ) -> Option<Dirty> {
        let mut mask = self.coverage();
        match (kind, style.fill) {
            (ShapeKind::Line, _) => {
                raster::stroke_segment(&mut mask, start, end, style.width, Cap::Round)
            }
            (ShapeKind::Rectangle, true) => raster::fill_rect(&mut mask, start, end),
            (ShapeKind::Rectangle, false) => {
                raster::stroke_rect(&mut mask, start, end, style.width)
            }
            (ShapeKind::Circle, true) => {
                raster::fill_circle(&mut mask, start, start.distance_to(end))
            }
            (ShapeKind::Circle, false) => {
                raster::stroke_circle(&mut mask, start, start.distance_to(end), style.width)
            }
            (ShapeKind::Triangle, true) => {
                raster::fill_triangle(&mut mask, raster::triangle_vertices(start, end))
            }
            (ShapeKind::Triangle, false) => {
                let vertices = raster::triangle_vertices(start, end);
                raster::stroke_triangle(&mut mask, vertices, style.width)
            }
        }
        self.blend_coverage(&mask, style.color, style.opacity)
    }

    /// Replaces the region reachable from `start` with `color`; see [`flood_fill`].
    pub fn flood_fill(&mut self, start: ToolPoint, color: Color) -> Option<Dirty> {
        let outcome = flood_fill(&mut self.pixels, start, color);
        (outcome.filled > 0).then(Dirty::new)
    }

    pub fn clear(&mut self) -> Dirty {
        let background = self.background.to_rgba();
        self.pixels.pixels_mut().for_each(|pixel| *pixel = background);
        Dirty::new()
    }

    /// Redraws the source image over the whole surface, keeping the surface size.
    pub fn reload_from(&mut self, source: &DynamicImage) -> Dirty {
        let fitted = source.to_rgba8();
        self.pixels = imageops::resize(
            &fitted,
            self.width(),
            self.height(),
            imageops::FilterType::Triangle,
        );
        self.paint_background_under();
        Dirty::new()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.pixels)
    }

    /// Restores a snapshot; mismatched dimensions are ignored.
    pub fn restore(&mut self, snapshot: &Snapshot) -> bool {
        if snapshot.dimensions() != self.pixels.dimensions() {
            tracing::warn!(
                snapshot = ?snapshot.dimensions(),
                surface = ?self.pixels.dimensions(),
                "ignoring snapshot with mismatched dimensions"
            );
            return false;
        }
        self.pixels.copy_from_slice(snapshot.bytes());
        true
    }

    fn coverage(&self) -> Coverage {
        Coverage::new(self.width(), self.height())
    }

    pub(crate) fn blend_coverage(
        &mut self,
        mask: &Coverage,
        color: Color,
        opacity: u8,
    ) -> Option<Dirty> {
        if mask.is_empty() {
            return None;
        }
        let alpha = effective_alpha(color, opacity);
        for (x, y) in mask.pixels() {
            blend_pixel(self.pixels.get_pixel_mut(x, y), color, alpha);
        }
        Some(Dirty::new())
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    fn paint_background_under(&mut self) {
        let background = self.background;
        for pixel in self.pixels.pixels_mut() {
            let source = Color::from_rgba(*pixel);
            let mut under = background.to_rgba();
            blend_pixel(&mut under, source, f32::from(source.a) / 255.0);
            *pixel = under;
        }
    }
}

pub(crate) fn fit_source(source: &DynamicImage, max_width: u32) -> RgbaImage {
    let rgba = source.to_rgba8();
    let (width, height) = rgba.dimensions();
    let max_width = max_width.max(1);
    if width <= max_width {
        return rgba;
    }
    let scaled_height =
        ((u64::from(height) * u64::from(max_width)) / u64::from(width.max(1))).max(1);
    let scaled_height = u32::try_from(scaled_height).unwrap_or(u32::MAX);
    imageops::resize(&rgba, max_width, scaled_height, imageops::FilterType::Triangle)
}

pub(crate) fn effective_alpha(color: Color, opacity: u8) -> f32 {
    let opacity = f32::from(opacity.min(100)) / 100.0;
    (f32::from(color.a) / 255.0) * opacity
}

/// Source-over blend of a straight-alpha color into `dst`.
pub(crate) fn blend_pixel(dst: &mut image::Rgba<u8>, color: Color, alpha: f32) {
    let src_a = alpha.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    if src_a >= 1.0 {
        *dst = color.opaque().to_rgba();
        return;
    }
    let [dr, dg, db, da] = dst.0;
    let dst_a = f32::from(da) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = image::Rgba([0, 0, 0, 0]);
        return;
    }
    let channel = |src: u8, dst: u8| {
        let value = (f32::from(src) * src_a + f32::from(dst) * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    *dst = image::Rgba([
        channel(color.r, dr),
        channel(color.g, dg),
        channel(color.b, db),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]);
}
