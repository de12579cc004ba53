//! Editing session: owns the surface, history, stickers, tool and filter state.

mod pointer;
pub mod tools;

use std::path::PathBuf;

use ab_glyph::FontArc;
use image::{DynamicImage, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::export::{self, ExportError, ExportSink};
use crate::filter::{FilterPreset, FilterState};
use crate::geometry::ToolPoint;
use crate::history::HistoryStack;
use crate::sticker::StickerLayer;
use crate::storage::DownloadStorage;
use crate::surface::{load_font, Dirty, PixelSurface};

pub use tools::{ToolKind, ToolOptionVisibility, ToolState};
use tools::Gesture;

/// External "generate image from text prompt" collaborator.
pub trait StickerGenerator {
    /// Returns encoded image bytes (PNG, JPEG or WebP).
    fn generate(&self, prompt: &str) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    source: Option<DynamicImage>,
    surface: Option<PixelSurface>,
    history: HistoryStack,
    active_tool: ToolKind,
    tool_state: ToolState,
    gesture: Gesture,
    pending_text_point: Option<ToolPoint>,
    pending: Option<Dirty>,
    stickers: StickerLayer,
    filter: FilterState,
    font: Option<FontArc>,
    rng: StdRng,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let seed = rand::rng().random();
        Self::with_seed(config, seed)
    }

    /// Session with a fixed spray seed.
    pub fn with_seed(config: EditorConfig, seed: u64) -> Self {
        let font = load_font(config.font_path.as_deref());
        if font.is_none() {
            tracing::warn!("no usable font found; text tool is disabled");
        }
        Self {
            history: HistoryStack::with_limit(config.history_limit),
            stickers: StickerLayer::new(config.handle_size, config.handle_tolerance),
            config,
            source: None,
            surface: None,
            active_tool: ToolKind::Select,
            tool_state: ToolState::default(),
            gesture: Gesture::Idle,
            pending_text_point: None,
            pending: None,
            filter: FilterState::default(),
            font,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Decodes the source image and initializes the surface from it.
    pub fn load_source(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let decoded = image::load_from_memory(bytes)?;
        self.load_image(decoded);
        Ok(())
    }

    /// Initializes the surface from an already decoded image and seeds the history.
    pub fn load_image(&mut self, source: DynamicImage) {
        let surface = PixelSurface::from_source(
            &source,
            self.config.max_surface_width,
            self.config.background_color,
        );
        tracing::info!(
            source_width = source.width(),
            source_height = source.height(),
            width = surface.width(),
            height = surface.height(),
            "editor surface loaded"
        );
        self.history.clear();
        self.history.push(surface.snapshot());
        self.surface = Some(surface);
        self.source = Some(source);
        self.gesture = Gesture::Idle;
        self.pending = None;
        self.pending_text_point = None;
    }

    pub fn surface(&self) -> Option<&PixelSurface> {
        self.surface.as_ref()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn set_font(&mut self, font: FontArc) {
        self.font = Some(font);
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    /// Switches tools, finishing any gesture the previous tool had in progress.
    pub fn select_tool(&mut self, tool: ToolKind) {
        if tool == self.active_tool {
            return;
        }
        self.pointer_leave();
        tracing::debug!(from = ?self.active_tool, to = ?tool, "tool changed");
        self.active_tool = tool;
    }

    /// Selects a tool by toolbar id. Unknown ids keep the current tool.
    pub fn select_tool_id(&mut self, id: &str) -> bool {
        match ToolKind::from_id(id) {
            Some(tool) => {
                self.select_tool(tool);
                true
            }
            None => {
                tracing::debug!(id, "ignoring unknown tool id");
                false
            }
        }
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tool_state
    }

    pub fn tool_state_mut(&mut self) -> &mut ToolState {
        &mut self.tool_state
    }

    /// Insertion point recorded by the last text-tool click.
    pub fn pending_text_point(&self) -> Option<ToolPoint> {
        self.pending_text_point
    }

    /// Stamps the configured text at the pending insertion point and commits it.
    pub fn add_text(&mut self) -> bool {
        let Some(point) = self.pending_text_point else {
            tracing::debug!("add text requested without an insertion point");
            return false;
        };
        let Some(font) = self.font.as_ref() else {
            tracing::warn!("add text requested but no font is loaded");
            return false;
        };
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let style = self.tool_state.text_style();
        let dirty = surface.draw_text(&self.tool_state.text, point, &style, font);
        self.mark(dirty);
        self.commit()
    }

    /// Paints the whole surface with the background color and commits it.
    pub fn clear_surface(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let dirty = surface.clear();
        self.mark(Some(dirty));
        self.commit()
    }

    /// Redraws the originally loaded image over the surface and commits it.
    pub fn reload_source(&mut self) -> bool {
        let (Some(surface), Some(source)) = (self.surface.as_mut(), self.source.as_ref()) else {
            return false;
        };
        let dirty = surface.reload_from(source);
        self.mark(Some(dirty));
        self.commit()
    }

    fn mark(&mut self, dirty: Option<Dirty>) {
        if dirty.is_some() {
            self.pending = dirty;
        }
    }

    /// Pushes one snapshot if anything changed since the last commit.
    pub fn commit(&mut self) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        let Some(surface) = self.surface.as_ref() else {
            return false;
        };
        self.history.push(surface.snapshot());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.pointer_leave();
        let (Some(surface), Some(snapshot)) = (self.surface.as_mut(), self.history.undo()) else {
            return false;
        };
        surface.restore(snapshot)
    }

    pub fn redo(&mut self) -> bool {
        self.pointer_leave();
        let (Some(surface), Some(snapshot)) = (self.surface.as_mut(), self.history.redo()) else {
            return false;
        };
        surface.restore(snapshot)
    }

    pub fn stickers(&self) -> &StickerLayer {
        &self.stickers
    }

    pub fn stickers_mut(&mut self) -> &mut StickerLayer {
        &mut self.stickers
    }

    /// Adds a decoded image as a sticker at the default placement and selects it.
    pub fn add_sticker(&mut self, image: RgbaImage) -> u64 {
        let id = self.stickers.add_ready(image, self.config.sticker_default.bounds());
        self.stickers.select(id);
        id
    }

    /// Reserves a sticker slot for an image that is still loading.
    pub fn begin_sticker_load(&mut self) -> u64 {
        self.stickers.add_pending(self.config.sticker_default.bounds())
    }

    pub fn finish_sticker_load(&mut self, id: u64, bytes: &[u8]) -> bool {
        self.stickers.resolve_image(id, bytes)
    }

    pub fn fail_sticker_load(&mut self, id: u64) -> bool {
        self.stickers.fail_image(id)
    }

    /// Asks the generator for an image and places the result as a selected sticker.
    pub fn request_ai_sticker(
        &mut self,
        generator: &dyn StickerGenerator,
        prompt: &str,
    ) -> EditorResult<u64> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(EditorError::EmptyPrompt);
        }
        let bytes = generator.generate(prompt).map_err(EditorError::StickerGeneration)?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        let id = self.add_sticker(image);
        tracing::info!(id, "generated sticker added");
        Ok(id)
    }

    pub fn remove_selected_sticker(&mut self) -> bool {
        let Some(id) = self.stickers.selected_id() else {
            return false;
        };
        self.gesture = Gesture::Idle;
        self.stickers.remove(id).is_some()
    }

    pub fn set_selected_sticker_opacity(&mut self, opacity: u8) -> bool {
        match self.stickers.selected_id() {
            Some(id) => self.stickers.set_opacity(id, opacity),
            None => false,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn apply_filter_preset(&mut self, label: &str) -> bool {
        let Some(preset) = FilterPreset::from_label(label) else {
            tracing::debug!(label, "ignoring unknown filter preset");
            return false;
        };
        self.filter.apply_preset(preset);
        true
    }

    /// Display image: filtered composite with the selection overlay on top.
    pub fn render(&self) -> Option<RgbaImage> {
        let surface = self.surface.as_ref()?;
        Some(export::render_preview(surface, &self.stickers, &self.filter))
    }

    /// Filtered composite without any selection decoration.
    pub fn export_image(&self) -> EditorResult<RgbaImage> {
        let surface = self.surface.as_ref().ok_or(ExportError::SurfaceUnavailable)?;
        Ok(export::render_export(surface, &self.stickers, &self.filter))
    }

    pub fn export_png(&self) -> EditorResult<Vec<u8>> {
        let image = self.export_image()?;
        let png = export::encode_png(&image)?;
        tracing::info!(
            width = image.width(),
            height = image.height(),
            bytes = png.len(),
            "editor image exported"
        );
        Ok(png)
    }

    /// Writes the export to `<download dir>/<name>.png`.
    pub fn download(&self, storage: &DownloadStorage, name: &str) -> EditorResult<PathBuf> {
        let png = self.export_png()?;
        Ok(storage.save_png(name, &png)?)
    }

    /// Hands the export to the persistence collaborator.
    pub fn save_and_use(&self, sink: &dyn ExportSink) -> EditorResult<()> {
        let png = self.export_png()?;
        sink.persist(&png).map_err(EditorError::Persist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, ToolBounds};
    use std::cell::RefCell;

    pub(super) fn session_with_surface(width: u32, height: u32) -> EditorSession {
        let mut session = EditorSession::with_seed(EditorConfig::default(), 11);
        let blank = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        session.load_image(DynamicImage::ImageRgba8(blank));
        session
    }

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        export::encode_png(image).expect("png should encode")
    }

    struct FixedGenerator(Vec<u8>);

    impl StickerGenerator for FixedGenerator {
        fn generate(&self, _prompt: &str) -> anyhow::Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingGenerator;

    impl StickerGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("quota exceeded")
        }
    }

    #[derive(Default)]
    struct RecordingSink(RefCell<Vec<Vec<u8>>>);

    impl ExportSink for RecordingSink {
        fn persist(&self, png: &[u8]) -> anyhow::Result<()> {
            self.0.borrow_mut().push(png.to_vec());
            Ok(())
        }
    }

    #[test]
    fn load_source_caps_width_and_seeds_history() {
        let mut session = EditorSession::with_seed(EditorConfig::default(), 1);
        let source = RgbaImage::from_pixel(1000, 500, image::Rgba([1, 2, 3, 255]));
        session
            .load_source(&png_bytes(&source))
            .expect("png source should load");
        let surface = session.surface().expect("surface should exist");
        assert_eq!((surface.width(), surface.height()), (800, 400));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().step(), Some(0));
        assert!(!session.can_undo());
    }

    #[test]
    fn load_source_rejects_undecodable_bytes() {
        let mut session = EditorSession::default();
        let err = session.load_source(b"definitely not an image");
        assert!(matches!(err, Err(EditorError::Image(_))));
        assert!(session.surface().is_none());
    }

    #[test]
    fn operations_without_surface_are_noops() {
        let mut session = EditorSession::with_seed(EditorConfig::default(), 1);
        session.select_tool(ToolKind::Fill);
        session.pointer_down(ToolPoint::new(1, 1));
        session.pointer_up(ToolPoint::new(1, 1));
        assert!(!session.undo());
        assert!(!session.clear_surface());
        assert!(session.render().is_none());
        assert!(matches!(
            session.export_png(),
            Err(EditorError::Export(ExportError::SurfaceUnavailable))
        ));
        assert!(session.history().is_empty());
    }

    #[test]
    fn unknown_tool_id_keeps_current_tool() {
        let mut session = session_with_surface(10, 10);
        assert!(session.select_tool_id("brush"));
        assert!(!session.select_tool_id("laser"));
        assert_eq!(session.active_tool(), ToolKind::Brush);
    }

    #[test]
    fn clear_then_undo_then_redo_is_bit_identical() {
        let mut session = session_with_surface(20, 20);
        session.tool_state_mut().set_color(Color::BLACK);
        session.select_tool(ToolKind::Rectangle);
        session.tool_state_mut().set_fill_shapes(true);
        session.pointer_down(ToolPoint::new(2, 2));
        session.pointer_up(ToolPoint::new(10, 10));
        let drawn = session.surface().map(PixelSurface::snapshot);

        assert!(session.clear_surface());
        assert!(session.undo());
        assert_eq!(session.surface().map(PixelSurface::snapshot), drawn);
        assert!(session.redo());
        let cleared = session.surface().expect("surface should exist");
        assert!(cleared.pixels().pixels().all(|pixel| pixel.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn reload_source_restores_original_pixels_as_new_history_entry() {
        let mut session = session_with_surface(20, 20);
        let original = session.surface().map(PixelSurface::snapshot);
        session.select_tool(ToolKind::Fill);
        session.tool_state_mut().set_color(Color::new(0, 0, 255));
        session.pointer_down(ToolPoint::new(5, 5));
        assert_eq!(session.history().len(), 2);

        assert!(session.reload_source());
        assert_eq!(session.surface().map(PixelSurface::snapshot), original);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn commit_without_changes_pushes_nothing() {
        let mut session = session_with_surface(10, 10);
        assert!(!session.commit());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn ai_sticker_is_added_at_default_placement_and_selected() {
        let mut session = session_with_surface(300, 300);
        let generator = FixedGenerator(png_bytes(&RgbaImage::from_pixel(
            64,
            64,
            image::Rgba([0, 200, 0, 255]),
        )));
        let id = session
            .request_ai_sticker(&generator, "a green square")
            .expect("generation should succeed");

        let sticker = session.stickers().get(id).expect("sticker should exist");
        assert_eq!(sticker.bounds, ToolBounds::new(50, 50, 150, 150));
        assert_eq!(sticker.opacity, 100);
        assert_eq!(session.stickers().selected_id(), Some(id));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn failed_or_empty_sticker_requests_leave_layer_unchanged() {
        let mut session = session_with_surface(100, 100);
        assert!(matches!(
            session.request_ai_sticker(&FailingGenerator, "cat"),
            Err(EditorError::StickerGeneration(_))
        ));
        assert!(matches!(
            session.request_ai_sticker(&FailingGenerator, "   "),
            Err(EditorError::EmptyPrompt)
        ));
        assert!(matches!(
            session.request_ai_sticker(&FixedGenerator(b"garbage".to_vec()), "cat"),
            Err(EditorError::Image(_))
        ));
        assert!(session.stickers().is_empty());
    }

    #[test]
    fn pending_sticker_appears_only_after_load_finishes() {
        let mut session = session_with_surface(100, 100);
        let before = session.export_image().expect("export should render");
        let id = session.begin_sticker_load();
        assert_eq!(session.export_image().expect("export should render"), before);

        let red = RgbaImage::from_pixel(150, 150, image::Rgba([255, 0, 0, 255]));
        assert!(session.finish_sticker_load(id, &png_bytes(&red)));
        let after = session.export_image().expect("export should render");
        assert_eq!(after.get_pixel(60, 60).0, [255, 0, 0, 255]);
    }

    #[test]
    fn remove_selected_sticker_and_opacity_require_selection() {
        let mut session = session_with_surface(100, 100);
        assert!(!session.remove_selected_sticker());
        assert!(!session.set_selected_sticker_opacity(40));

        let id = session.add_sticker(RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 0, 255])));
        assert!(session.set_selected_sticker_opacity(40));
        assert_eq!(session.stickers().get(id).map(|sticker| sticker.opacity), Some(40));
        assert!(session.remove_selected_sticker());
        assert!(session.stickers().is_empty());
    }

    #[test]
    fn sticker_edits_do_not_touch_history() {
        let mut session = session_with_surface(300, 300);
        let id = session.add_sticker(RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 0, 255])));
        session.stickers_mut().translate(id, 10, 10);
        session.set_selected_sticker_opacity(10);
        assert_eq!(session.history().len(), 1);
        assert!(!session.undo());
        assert_eq!(session.stickers().get(id).map(|sticker| sticker.bounds.x), Some(60));
    }

    #[test]
    fn render_shows_selection_but_export_does_not() {
        let mut session = session_with_surface(300, 300);
        session.add_sticker(RgbaImage::from_pixel(150, 150, image::Rgba([0, 0, 255, 255])));
        let rendered = session.render().expect("surface should render");
        let exported = session.export_image().expect("export should render");
        assert_ne!(rendered, exported);
        session.stickers_mut().deselect();
        assert_eq!(session.render(), Some(exported));
    }

    #[test]
    fn filter_preset_labels_are_applied_to_export_only() {
        let mut session = session_with_surface(10, 10);
        session.select_tool(ToolKind::Fill);
        session.tool_state_mut().set_color(Color::new(200, 30, 30));
        session.pointer_down(ToolPoint::new(0, 0));
        assert!(session.apply_filter_preset("grayscale"));
        assert!(!session.apply_filter_preset("sepia"));

        let [r, g, _, _] = session.export_image().expect("export").get_pixel(0, 0).0;
        assert!(r.abs_diff(g) <= 1);
        assert_eq!(
            session.surface().and_then(|surface| surface.sample_color(ToolPoint::new(0, 0))),
            Some(Color::new(200, 30, 30))
        );
    }

    #[test]
    fn download_writes_png_into_storage_directory() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let storage = DownloadStorage::with_path(dir.path().to_path_buf());
        let session = session_with_surface(12, 8);

        let path = session.download(&storage, "edited").expect("download should succeed");
        assert_eq!(path, dir.path().join("edited.png"));
        let written = image::open(&path).expect("written file should decode");
        assert_eq!((written.width(), written.height()), (12, 8));
    }

    #[test]
    fn save_and_use_hands_png_to_sink() {
        let session = session_with_surface(12, 8);
        let sink = RecordingSink::default();
        session.save_and_use(&sink).expect("sink should accept export");
        let saved = sink.0.borrow();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].starts_with(b"\x89PNG"));
    }
}
