//! Display/export-time color adjustments. Never written back into the surface.

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPreset {
    None,
    Grayscale,
    Vintage,
    Vivid,
    Dramatic,
    Soft,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 6] = [
        Self::None,
        Self::Grayscale,
        Self::Vintage,
        Self::Vivid,
        Self::Dramatic,
        Self::Soft,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Vintage => "vintage",
            Self::Vivid => "vivid",
            Self::Dramatic => "dramatic",
            Self::Soft => "soft",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.label() == label)
    }

    /// `(brightness, contrast, saturation, blur)` for the preset.
    pub const fn parameters(self) -> (u16, u16, u16, f32) {
        match self {
            Self::None => (100, 100, 100, 0.0),
            Self::Grayscale => (100, 110, 0, 0.0),
            Self::Vintage => (110, 90, 80, 0.0),
            Self::Vivid => (105, 120, 140, 0.0),
            Self::Dramatic => (90, 140, 110, 0.0),
            Self::Soft => (105, 90, 90, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Percent; 100 leaves the image unchanged.
    brightness: u16,
    contrast: u16,
    saturation: u16,
    /// Gaussian blur radius in pixels.
    blur: f32,
    preset: Option<FilterPreset>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
            blur: 0.0,
            preset: None,
        }
    }
}

pub const MAX_PERCENT: u16 = 200;
pub const MAX_BLUR: f32 = 20.0;

impl FilterState {
    pub fn brightness(&self) -> u16 {
        self.brightness
    }

    pub fn contrast(&self) -> u16 {
        self.contrast
    }

    pub fn saturation(&self) -> u16 {
        self.saturation
    }

    pub fn blur(&self) -> f32 {
        self.blur
    }

    /// Preset label echoed by the UI; cleared by any manual slider change.
    pub fn active_preset(&self) -> Option<FilterPreset> {
        self.preset
    }

    pub fn is_identity(&self) -> bool {
        self.brightness == 100 && self.contrast == 100 && self.saturation == 100 && self.blur <= 0.0
    }

    /// Sets all four parameters from the preset table at once.
    pub fn apply_preset(&mut self, preset: FilterPreset) {
        let (brightness, contrast, saturation, blur) = preset.parameters();
        self.brightness = brightness;
        self.contrast = contrast;
        self.saturation = saturation;
        self.blur = blur;
        self.preset = Some(preset);
        tracing::debug!(preset = preset.label(), "filter preset applied");
    }

    pub fn set_brightness(&mut self, value: u16) {
        self.brightness = value.min(MAX_PERCENT);
        self.preset = None;
    }

    pub fn set_contrast(&mut self, value: u16) {
        self.contrast = value.min(MAX_PERCENT);
        self.preset = None;
    }

    pub fn set_saturation(&mut self, value: u16) {
        self.saturation = value.min(MAX_PERCENT);
        self.preset = None;
    }

    pub fn set_blur(&mut self, value: f32) {
        self.blur = if value.is_finite() {
            value.clamp(0.0, MAX_BLUR)
        } else {
            0.0
        };
        self.preset = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns a filtered copy; `source` is left untouched.
    ///
    /// Order follows the CSS filter chain `brightness contrast saturate blur`.
    pub fn apply(&self, source: &RgbaImage) -> RgbaImage {
        if self.is_identity() {
            return source.clone();
        }

        let brightness = f32::from(self.brightness) / 100.0;
        let contrast = f32::from(self.contrast) / 100.0;
        let saturation = f32::from(self.saturation) / 100.0;
        let matrix = saturation_matrix(saturation);

        let mut output = source.clone();
        for pixel in output.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let mut rgb = [r, g, b].map(|channel| f32::from(channel) / 255.0);
            for channel in &mut rgb {
                *channel *= brightness;
                *channel = (*channel - 0.5) * contrast + 0.5;
                *channel = channel.clamp(0.0, 1.0);
            }
            let saturated = [0, 1, 2].map(|row| {
                (matrix[row][0] * rgb[0] + matrix[row][1] * rgb[1] + matrix[row][2] * rgb[2])
                    .clamp(0.0, 1.0)
            });
            let [r, g, b] = saturated.map(|channel| (channel * 255.0).round() as u8);
            pixel.0 = [r, g, b, a];
        }

        if self.blur > 0.0 {
            output = imageops::blur(&output, self.blur);
        }
        output
    }
}

/// Filter Effects `saturate()` color matrix.
fn saturation_matrix(s: f32) -> [[f32; 3]; 3] {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}
