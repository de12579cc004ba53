//! Positioned image objects composited above the base surface.
//!
//! Stickers paint in insertion order: the first sticker is the bottom-most and the
//! last one added is on top. There is no other z-ordering.

mod handles;

use image::{imageops, RgbaImage};

use crate::geometry::{Color, ToolBounds, ToolPoint};
use crate::surface::blend_pixel;

pub use handles::{handle_at, handle_rect, resize_bounds, ResizeHandle, STICKER_MIN_SIZE};

const SELECTION_OUTLINE_COLOR: Color = Color::new(59, 130, 246);
const SELECTION_OUTLINE_WIDTH: i32 = 2;
const HANDLE_FILL_COLOR: Color = Color::WHITE;

/// Load state of a sticker's image resource.
#[derive(Debug, Clone, PartialEq)]
pub enum StickerImage {
    Loading,
    Ready(RgbaImage),
    Failed,
}

impl StickerImage {
    pub fn decode(bytes: &[u8]) -> Self {
        match image::load_from_memory(bytes) {
            Ok(decoded) => Self::Ready(decoded.to_rgba8()),
            Err(err) => {
                tracing::warn!(%err, "sticker image failed to decode");
                Self::Failed
            }
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sticker {
    pub id: u64,
    pub image: StickerImage,
    pub bounds: ToolBounds,
    /// Percent, `0..=100`.
    pub opacity: u8,
}

impl Sticker {
    pub const fn is_ready(&self) -> bool {
        self.image.is_ready()
    }
}

/// Result of hit-testing the layer under a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickerHit {
    Handle { id: u64, handle: ResizeHandle },
    Body { id: u64 },
}

#[derive(Debug, Clone)]
pub struct StickerLayer {
    stickers: Vec<Sticker>,
    selected: Option<u64>,
    next_id: u64,
    handle_size: u32,
    handle_tolerance: u32,
}

impl Default for StickerLayer {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_HANDLE_SIZE,
            crate::config::DEFAULT_HANDLE_TOLERANCE,
        )
    }
}

impl StickerLayer {
    pub fn new(handle_size: u32, handle_tolerance: u32) -> Self {
        Self {
            stickers: Vec::new(),
            selected: None,
            next_id: 1,
            handle_size: handle_size.max(1),
            handle_tolerance,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Sticker> {
        self.stickers.iter_mut().find(|sticker| sticker.id == id)
    }

    /// Adds a sticker on top of the stack and returns its id.
    pub fn add(&mut self, image: StickerImage, bounds: ToolBounds) -> u64 {
        let id = self.allocate_id();
        let bounds = ToolBounds::new(
            bounds.x,
            bounds.y,
            bounds.width.max(STICKER_MIN_SIZE),
            bounds.height.max(STICKER_MIN_SIZE),
        );
        self.stickers.push(Sticker {
            id,
            image,
            bounds,
            opacity: 100,
        });
        tracing::debug!(id, ?bounds, "sticker added");
        id
    }

    pub fn add_ready(&mut self, image: RgbaImage, bounds: ToolBounds) -> u64 {
        self.add(StickerImage::Ready(image), bounds)
    }

    /// Adds a sticker whose image is still loading; it stays invisible and
    /// non-interactive until [`StickerLayer::resolve_image`] succeeds.
    pub fn add_pending(&mut self, bounds: ToolBounds) -> u64 {
        self.add(StickerImage::Loading, bounds)
    }

    /// Decodes the loaded bytes for a pending sticker. Returns whether it became ready.
    pub fn resolve_image(&mut self, id: u64, bytes: &[u8]) -> bool {
        let Some(sticker) = self.get_mut(id) else {
            tracing::debug!(id, "image resolved for removed sticker");
            return false;
        };
        sticker.image = StickerImage::decode(bytes);
        sticker.is_ready()
    }

    pub fn fail_image(&mut self, id: u64) -> bool {
        let Some(sticker) = self.get_mut(id) else {
            return false;
        };
        sticker.image = StickerImage::Failed;
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    pub fn get(&self, id: u64) -> Option<&Sticker> {
        self.stickers.iter().find(|sticker| sticker.id == id)
    }

    /// Stickers in paint order, bottom first.
    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Sticker> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selected == Some(id)
    }

    /// Selects a ready sticker, replacing any previous selection.
    pub fn select(&mut self, id: u64) -> bool {
        if !self.get(id).is_some_and(Sticker::is_ready) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn translate(&mut self, id: u64, delta_x: i32, delta_y: i32) -> bool {
        let Some(sticker) = self.get_mut(id).filter(|sticker| sticker.is_ready()) else {
            return false;
        };
        sticker.bounds.x = sticker.bounds.x.saturating_add(delta_x);
        sticker.bounds.y = sticker.bounds.y.saturating_add(delta_y);
        true
    }

    /// Resizes from the sticker's current bounds; see [`resize_bounds`].
    pub fn resize(&mut self, id: u64, handle: ResizeHandle, delta_x: i32, delta_y: i32) -> bool {
        let Some(sticker) = self.get_mut(id).filter(|sticker| sticker.is_ready()) else {
            return false;
        };
        sticker.bounds = resize_bounds(sticker.bounds, handle, delta_x, delta_y);
        true
    }

    pub(crate) fn set_bounds(&mut self, id: u64, bounds: ToolBounds) -> bool {
        let Some(sticker) = self.get_mut(id).filter(|sticker| sticker.is_ready()) else {
            return false;
        };
        sticker.bounds = ToolBounds::new(
            bounds.x,
            bounds.y,
            bounds.width.max(STICKER_MIN_SIZE),
            bounds.height.max(STICKER_MIN_SIZE),
        );
        true
    }

    pub fn set_opacity(&mut self, id: u64, opacity: u8) -> bool {
        let Some(sticker) = self.get_mut(id) else {
            return false;
        };
        sticker.opacity = opacity.min(100);
        true
    }

    pub fn remove(&mut self, id: u64) -> Option<Sticker> {
        let index = self.stickers.iter().position(|sticker| sticker.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(id, "sticker removed");
        Some(self.stickers.remove(index))
    }

    /// Hit-tests in priority order: handles of the selected sticker, then the
    /// top-most ready sticker body.
    pub fn hit_test(&self, point: ToolPoint) -> Option<StickerHit> {
        if let Some(selected) = self.selected().filter(|sticker| sticker.is_ready()) {
            if let Some(handle) =
                handle_at(selected.bounds, point, self.handle_size, self.handle_tolerance)
            {
                return Some(StickerHit::Handle {
                    id: selected.id,
                    handle,
                });
            }
        }

        self.stickers
            .iter()
            .rev()
            .find(|sticker| sticker.is_ready() && sticker.bounds.contains(point))
            .map(|sticker| StickerHit::Body { id: sticker.id })
    }

    /// Paints every ready sticker onto `target`, scaled into its bounds, bottom first.
    pub fn composite_onto(&self, target: &mut RgbaImage) {
        for sticker in &self.stickers {
            let StickerImage::Ready(image) = &sticker.image else {
                continue;
            };
            paint_scaled(target, image, sticker.bounds, sticker.opacity);
        }
    }

    /// Draws the highlight outline and corner handles of the selected sticker.
    pub fn draw_selection_overlay(&self, target: &mut RgbaImage) {
        let Some(sticker) = self.selected().filter(|sticker| sticker.is_ready()) else {
            return;
        };
        let bounds = sticker.bounds;
        let width = SELECTION_OUTLINE_WIDTH;
        let (left, top, right, bottom) = (bounds.x, bounds.y, bounds.right(), bounds.bottom());
        let edges = [
            (left, top, right, top.saturating_add(width)),
            (left, bottom.saturating_sub(width), right, bottom),
            (left, top, left.saturating_add(width), bottom),
            (right.saturating_sub(width), top, right, bottom),
        ];
        for (left, top, right, bottom) in edges {
            fill_box(target, (left, top, right, bottom), SELECTION_OUTLINE_COLOR);
        }

        for handle in ResizeHandle::ALL {
            let rect = handle_rect(bounds, handle, self.handle_size);
            fill_box(
                target,
                (rect.x, rect.y, rect.right(), rect.bottom()),
                SELECTION_OUTLINE_COLOR,
            );
            fill_box(
                target,
                (
                    rect.x.saturating_add(2),
                    rect.y.saturating_add(2),
                    rect.right().saturating_sub(2),
                    rect.bottom().saturating_sub(2),
                ),
                HANDLE_FILL_COLOR,
            );
        }
    }
}

fn paint_scaled(target: &mut RgbaImage, image: &RgbaImage, bounds: ToolBounds, opacity: u8) {
    if bounds.width == 0 || bounds.height == 0 || opacity == 0 {
        return;
    }
    let scaled;
    let source = if image.dimensions() == (bounds.width, bounds.height) {
        image
    } else {
        scaled = imageops::resize(
            image,
            bounds.width,
            bounds.height,
            imageops::FilterType::Triangle,
        );
        &scaled
    };

    let opacity = f32::from(opacity.min(100)) / 100.0;
    let (target_width, target_height) = (i64::from(target.width()), i64::from(target.height()));
    for (sx, sy, pixel) in source.enumerate_pixels() {
        let x = i64::from(bounds.x) + i64::from(sx);
        let y = i64::from(bounds.y) + i64::from(sy);
        if x < 0 || y < 0 || x >= target_width || y >= target_height {
            continue;
        }
        let color = Color::from_rgba(*pixel);
        let alpha = f32::from(color.a) / 255.0 * opacity;
        blend_pixel(target.get_pixel_mut(x as u32, y as u32), color, alpha);
    }
}

fn fill_box(
    target: &mut RgbaImage,
    (left, top, right, bottom): (i32, i32, i32, i32),
    color: Color,
) {
    let left = left.max(0);
    let top = top.max(0);
    let right = right.min(i32::try_from(target.width()).unwrap_or(i32::MAX));
    let bottom = bottom.min(i32::try_from(target.height()).unwrap_or(i32::MAX));
    let pixel = color.to_rgba();
    for y in top..bottom {
        for x in left..right {
            target.put_pixel(x as u32, y as u32, pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: image::Rgba<u8> = image::Rgba([255, 0, 0, 255]);

    fn red_image(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, RED)
    }

    fn layer_with_sticker(bounds: ToolBounds) -> (StickerLayer, u64) {
        let mut layer = StickerLayer::default();
        let id = layer.add_ready(red_image(10), bounds);
        (layer, id)
    }

    #[test]
    fn add_enforces_minimum_size_and_full_opacity() {
        let mut layer = StickerLayer::default();
        let id = layer.add_ready(red_image(4), ToolBounds::new(0, 0, 5, 100));
        let sticker = layer.get(id).expect("sticker should exist");
        assert_eq!(sticker.bounds, ToolBounds::new(0, 0, 30, 100));
        assert_eq!(sticker.opacity, 100);
    }

    #[test]
    fn only_one_sticker_is_selected_at_a_time() {
        let mut layer = StickerLayer::default();
        let first = layer.add_ready(red_image(2), ToolBounds::new(0, 0, 40, 40));
        let second = layer.add_ready(red_image(2), ToolBounds::new(50, 50, 40, 40));
        assert!(layer.select(first));
        assert!(layer.select(second));
        assert!(!layer.is_selected(first));
        assert_eq!(layer.selected_id(), Some(second));
        layer.deselect();
        assert_eq!(layer.selected_id(), None);
    }

    #[test]
    fn pending_sticker_is_not_selectable_or_hit_until_resolved() {
        let mut layer = StickerLayer::default();
        let id = layer.add_pending(ToolBounds::new(0, 0, 50, 50));
        assert!(!layer.select(id));
        assert_eq!(layer.hit_test(ToolPoint::new(10, 10)), None);
        assert!(!layer.translate(id, 5, 5));

        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(red_image(3))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .expect("png should encode");
        assert!(layer.resolve_image(id, &png));
        assert!(layer.select(id));
        assert_eq!(layer.hit_test(ToolPoint::new(25, 25)), Some(StickerHit::Body { id }));
        assert_eq!(
            layer.hit_test(ToolPoint::new(10, 10)),
            Some(StickerHit::Handle {
                id,
                handle: ResizeHandle::TopLeft
            })
        );
    }

    #[test]
    fn undecodable_image_marks_sticker_failed_but_keeps_it() {
        let mut layer = StickerLayer::default();
        let id = layer.add_pending(ToolBounds::new(0, 0, 50, 50));
        assert!(!layer.resolve_image(id, b"not an image"));
        let sticker = layer.get(id).expect("failed sticker should remain");
        assert_eq!(sticker.image, StickerImage::Failed);
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn hit_test_prefers_last_inserted_on_overlap() {
        let mut layer = StickerLayer::default();
        let _bottom = layer.add_ready(red_image(2), ToolBounds::new(0, 0, 100, 100));
        let top = layer.add_ready(red_image(2), ToolBounds::new(50, 50, 100, 100));
        assert_eq!(
            layer.hit_test(ToolPoint::new(60, 60)),
            Some(StickerHit::Body { id: top })
        );
    }

    #[test]
    fn hit_test_prefers_selected_handles_over_bodies() {
        let mut layer = StickerLayer::default();
        let bottom = layer.add_ready(red_image(2), ToolBounds::new(0, 0, 100, 100));
        let _top = layer.add_ready(red_image(2), ToolBounds::new(95, 95, 100, 100));
        assert!(layer.select(bottom));
        assert_eq!(
            layer.hit_test(ToolPoint::new(100, 100)),
            Some(StickerHit::Handle {
                id: bottom,
                handle: ResizeHandle::BottomRight
            })
        );
    }

    #[test]
    fn resize_and_translate_update_bounds() {
        let (mut layer, id) = layer_with_sticker(ToolBounds::new(50, 50, 150, 150));
        assert!(layer.resize(id, ResizeHandle::BottomRight, 20, 10));
        assert!(layer.translate(id, -10, 5));
        assert_eq!(
            layer.get(id).map(|sticker| sticker.bounds),
            Some(ToolBounds::new(40, 55, 170, 160))
        );
    }

    #[test]
    fn set_opacity_clamps_to_percent_range() {
        let (mut layer, id) = layer_with_sticker(ToolBounds::new(0, 0, 40, 40));
        assert!(layer.set_opacity(id, 250));
        assert_eq!(layer.get(id).map(|sticker| sticker.opacity), Some(100));
        assert!(!layer.set_opacity(999, 10));
    }

    #[test]
    fn remove_clears_selection() {
        let (mut layer, id) = layer_with_sticker(ToolBounds::new(0, 0, 40, 40));
        layer.select(id);
        assert!(layer.remove(id).is_some());
        assert_eq!(layer.selected_id(), None);
        assert!(layer.remove(id).is_none());
    }

    #[test]
    fn composite_scales_into_bounds() {
        let (layer, _) = layer_with_sticker(ToolBounds::new(10, 10, 40, 40));
        let white = image::Rgba([255, 255, 255, 255]);
        let mut target = RgbaImage::from_pixel(100, 100, white);
        layer.composite_onto(&mut target);
        for (x, y) in [(10, 10), (30, 30), (49, 49)] {
            let [r, g, b, _] = target.get_pixel(x, y).0;
            assert!(r >= 250 && g <= 5 && b <= 5, "({x},{y}) should be red");
        }
        assert_eq!(*target.get_pixel(50, 50), white);
        assert_eq!(*target.get_pixel(9, 9), white);
    }

    #[test]
    fn composite_honors_sticker_opacity() {
        let mut layer = StickerLayer::default();
        let id = layer.add_ready(red_image(40), ToolBounds::new(10, 10, 40, 40));
        layer.set_opacity(id, 50);
        let mut target = RgbaImage::from_pixel(100, 100, image::Rgba([255, 255, 255, 255]));
        layer.composite_onto(&mut target);
        assert_eq!(*target.get_pixel(20, 20), image::Rgba([255, 128, 128, 255]));
    }

    #[test]
    fn composite_paints_in_insertion_order() {
        let mut layer = StickerLayer::default();
        layer.add_ready(red_image(40), ToolBounds::new(0, 0, 40, 40));
        let blue = image::Rgba([0, 0, 255, 255]);
        layer.add_ready(RgbaImage::from_pixel(40, 40, blue), ToolBounds::new(20, 20, 40, 40));
        let mut target = RgbaImage::from_pixel(100, 100, image::Rgba([255, 255, 255, 255]));
        layer.composite_onto(&mut target);
        assert_eq!(*target.get_pixel(30, 30), blue);
        assert_eq!(*target.get_pixel(5, 5), RED);
    }

    #[test]
    fn composite_skips_unresolved_and_failed_images() {
        let mut layer = StickerLayer::default();
        layer.add_pending(ToolBounds::new(0, 0, 40, 40));
        let failed = layer.add_pending(ToolBounds::new(0, 0, 40, 40));
        layer.fail_image(failed);
        let blank = RgbaImage::from_pixel(50, 50, image::Rgba([255, 255, 255, 255]));
        let mut target = blank.clone();
        layer.composite_onto(&mut target);
        assert_eq!(target, blank);
    }

    #[test]
    fn selection_overlay_draws_outline_and_handles() {
        let (mut layer, id) = layer_with_sticker(ToolBounds::new(20, 20, 40, 40));
        let mut target = RgbaImage::from_pixel(100, 100, image::Rgba([0, 0, 0, 255]));
        layer.draw_selection_overlay(&mut target);
        assert_eq!(*target.get_pixel(30, 20), image::Rgba([0, 0, 0, 255]));

        layer.select(id);
        layer.draw_selection_overlay(&mut target);
        assert_eq!(*target.get_pixel(40, 20), SELECTION_OUTLINE_COLOR.to_rgba());
        assert_eq!(*target.get_pixel(60, 60), HANDLE_FILL_COLOR.to_rgba());
    }

    #[test]
    fn sticker_pushed_to_coordinate_limits_renders_and_hit_tests_safely() {
        let (mut layer, id) = layer_with_sticker(ToolBounds::new(20, 20, 40, 40));
        layer.select(id);
        let mut target = RgbaImage::from_pixel(60, 60, image::Rgba([0, 0, 0, 255]));
        let blank = target.clone();

        assert!(layer.translate(id, i32::MAX, i32::MAX));
        assert_eq!(
            layer.get(id).map(|sticker| (sticker.bounds.x, sticker.bounds.y)),
            Some((i32::MAX, i32::MAX))
        );
        layer.composite_onto(&mut target);
        layer.draw_selection_overlay(&mut target);
        assert_eq!(target, blank);
        assert!(layer.hit_test(ToolPoint::new(i32::MAX, i32::MAX)).is_some());
        assert_eq!(layer.hit_test(ToolPoint::new(10, 10)), None);

        assert!(layer.translate(id, i32::MIN, i32::MIN));
        assert!(layer.translate(id, i32::MIN, i32::MIN));
        layer.draw_selection_overlay(&mut target);
        assert_eq!(target, blank);
        assert!(layer.hit_test(ToolPoint::new(i32::MIN, i32::MIN)).is_some());
    }
}
