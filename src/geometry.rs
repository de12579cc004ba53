//! Shared geometric and color primitives used across surface, sticker and editor modules.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolPoint {
    pub x: i32,
    pub y: i32,
}

impl ToolPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: ToolPoint) -> f32 {
        let dx = other.x as f32 - self.x as f32;
        let dy = other.y as f32 - self.y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ToolBounds {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(i32::try_from(self.width).unwrap_or(i32::MAX))
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(i32::try_from(self.height).unwrap_or(i32::MAX))
    }

    pub fn contains(&self, point: ToolPoint) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: i32,
    pub height: i32,
}

impl ImageBounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: ToolPoint) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width && point.y < self.height
    }
}

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque_alpha")]
    pub a: u8,
}

const fn opaque_alpha() -> u8 {
    255
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    pub const fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    pub const fn from_rgba(pixel: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`; the leading `#` is optional.
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |index: usize| u8::from_str_radix(digits.get(index..index + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::with_alpha(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Maps a pointer position in displayed (CSS/device) units onto the canvas pixel grid.
///
/// Scaling is `canvas / displayed` per axis and the result is clamped to the canvas.
pub fn display_to_canvas(
    display_x: f64,
    display_y: f64,
    displayed_width: f64,
    displayed_height: f64,
    canvas: ImageBounds,
) -> ToolPoint {
    let displayed_width = displayed_width.max(1.0);
    let displayed_height = displayed_height.max(1.0);
    let scale_x = f64::from(canvas.width.max(1)) / displayed_width;
    let scale_y = f64::from(canvas.height.max(1)) / displayed_height;
    let x = (display_x.clamp(0.0, displayed_width) * scale_x).floor() as i32;
    let y = (display_y.clamp(0.0, displayed_height) * scale_y).floor() as i32;
    clamp_tool_point(ToolPoint::new(x, y), canvas)
}

pub fn clamp_tool_point(mut point: ToolPoint, canvas: ImageBounds) -> ToolPoint {
    let max_x = canvas.width.saturating_sub(1).max(0);
    let max_y = canvas.height.saturating_sub(1).max(0);
    point.x = point.x.clamp(0, max_x);
    point.y = point.y.clamp(0, max_y);
    point
}
