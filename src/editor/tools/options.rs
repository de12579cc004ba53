use crate::geometry::Color;
use crate::surface::{BrushShape, ShapeStyle, StrokeStyle, TextStyle};

pub const STROKE_WIDTH_MIN: u32 = 1;
pub const STROKE_WIDTH_MAX: u32 = 100;
pub const FONT_SIZE_MIN: u32 = 8;
pub const FONT_SIZE_MAX: u32 = 200;

/// User-configurable drawing options shared by every tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolState {
    pub color: Color,
    pub width: u32,
    /// Percent, `0..=100`.
    pub opacity: u8,
    pub brush_shape: BrushShape,
    pub fill_shapes: bool,
    pub text: String,
    pub font_size: u32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5,
            opacity: 100,
            brush_shape: BrushShape::Round,
            fill_shapes: false,
            text: String::new(),
            font_size: 24,
        }
    }
}

impl ToolState {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Accepts `#rrggbb` or `#rrggbbaa`; anything else leaves the color unchanged.
    pub fn set_color_hex(&mut self, value: &str) -> bool {
        match Color::from_hex(value) {
            Some(color) => {
                self.color = color;
                true
            }
            None => {
                tracing::debug!(value, "ignoring malformed color");
                false
            }
        }
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width.clamp(STROKE_WIDTH_MIN, STROKE_WIDTH_MAX);
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity.min(100);
    }

    pub fn set_brush_shape(&mut self, shape: BrushShape) {
        self.brush_shape = shape;
    }

    pub fn set_fill_shapes(&mut self, fill: bool) {
        self.fill_shapes = fill;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
    }

    pub(crate) fn brush_style(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.color,
            width: self.width,
            opacity: self.opacity,
            shape: self.brush_shape,
        }
    }

    /// Eraser paints the opaque background color with a round tip.
    pub(crate) fn eraser_style(&self, background: Color) -> StrokeStyle {
        StrokeStyle {
            color: background.opaque(),
            width: self.width,
            opacity: 100,
            shape: BrushShape::Round,
        }
    }

    pub(crate) fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            color: self.color,
            width: self.width,
            opacity: self.opacity,
            fill: self.fill_shapes,
        }
    }

    pub(crate) fn text_style(&self) -> TextStyle {
        TextStyle {
            color: self.color,
            size: self.font_size as f32,
            opacity: self.opacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_to_supported_ranges() {
        let mut state = ToolState::default();
        state.set_width(0);
        assert_eq!(state.width, STROKE_WIDTH_MIN);
        state.set_width(5000);
        assert_eq!(state.width, STROKE_WIDTH_MAX);
        state.set_opacity(180);
        assert_eq!(state.opacity, 100);
        state.set_font_size(1);
        assert_eq!(state.font_size, FONT_SIZE_MIN);
    }

    #[test]
    fn malformed_hex_color_keeps_previous_color() {
        let mut state = ToolState::default();
        assert!(state.set_color_hex("#ff8000"));
        assert_eq!(state.color, Color::new(255, 128, 0));
        assert!(!state.set_color_hex("orange"));
        assert_eq!(state.color, Color::new(255, 128, 0));
    }

    #[test]
    fn eraser_ignores_brush_opacity_and_shape() {
        let mut state = ToolState::default();
        state.set_opacity(20);
        state.set_brush_shape(BrushShape::Spray);
        let style = state.eraser_style(Color::WHITE);
        assert_eq!(style.opacity, 100);
        assert_eq!(style.color, Color::WHITE);
        assert_eq!(style.shape, BrushShape::Round);
    }
}
