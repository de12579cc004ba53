mod gesture;
mod options;

pub use crate::geometry::{Color, ImageBounds, ToolBounds, ToolPoint};
pub use crate::surface::{BrushShape, ShapeKind};
pub(crate) use gesture::Gesture;
pub use options::{
    ToolState, FONT_SIZE_MAX, FONT_SIZE_MIN, STROKE_WIDTH_MAX, STROKE_WIDTH_MIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOptionVisibility {
    pub has_color: bool,
    pub has_stroke_width: bool,
    pub has_opacity: bool,
    pub has_brush_shape: bool,
    pub has_fill_toggle: bool,
    pub has_text_size: bool,
}

impl ToolOptionVisibility {
    const NONE: Self = Self {
        has_color: false,
        has_stroke_width: false,
        has_opacity: false,
        has_brush_shape: false,
        has_fill_toggle: false,
        has_text_size: false,
    };

    pub const fn has_any(&self) -> bool {
        let Self {
            has_color,
            has_stroke_width,
            has_opacity,
            has_brush_shape,
            has_fill_toggle,
            has_text_size,
        } = *self;
        has_color
            || has_stroke_width
            || has_opacity
            || has_brush_shape
            || has_fill_toggle
            || has_text_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    Brush,
    Eraser,
    Fill,
    Eyedropper,
    Text,
    Line,
    Rectangle,
    Circle,
    Triangle,
    Adjust,
    AiSticker,
}

impl ToolKind {
    pub const ALL: [ToolKind; 12] = [
        Self::Select,
        Self::Brush,
        Self::Eraser,
        Self::Fill,
        Self::Eyedropper,
        Self::Text,
        Self::Line,
        Self::Rectangle,
        Self::Circle,
        Self::Triangle,
        Self::Adjust,
        Self::AiSticker,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Brush => "brush",
            Self::Eraser => "eraser",
            Self::Fill => "fill",
            Self::Eyedropper => "eyedropper",
            Self::Text => "text",
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Adjust => "adjust",
            Self::AiSticker => "ai-sticker",
        }
    }

    /// Parses a toolbar id; unknown ids yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.id() == id)
    }

    /// Shape stamped by a drag with this tool, if any.
    pub const fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Self::Line => Some(ShapeKind::Line),
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Triangle => Some(ShapeKind::Triangle),
            _ => None,
        }
    }

    pub const fn option_visibility(self) -> ToolOptionVisibility {
        match self {
            Self::Brush => ToolOptionVisibility {
                has_color: true,
                has_stroke_width: true,
                has_opacity: true,
                has_brush_shape: true,
                ..ToolOptionVisibility::NONE
            },
            Self::Eraser => ToolOptionVisibility {
                has_stroke_width: true,
                ..ToolOptionVisibility::NONE
            },
            Self::Fill | Self::Eyedropper => ToolOptionVisibility {
                has_color: true,
                ..ToolOptionVisibility::NONE
            },
            Self::Text => ToolOptionVisibility {
                has_color: true,
                has_opacity: true,
                has_text_size: true,
                ..ToolOptionVisibility::NONE
            },
            Self::Line => ToolOptionVisibility {
                has_color: true,
                has_stroke_width: true,
                has_opacity: true,
                ..ToolOptionVisibility::NONE
            },
            Self::Rectangle | Self::Circle | Self::Triangle => ToolOptionVisibility {
                has_color: true,
                has_stroke_width: true,
                has_opacity: true,
                has_fill_toggle: true,
                ..ToolOptionVisibility::NONE
            },
            Self::Select | Self::Adjust | Self::AiSticker => ToolOptionVisibility::NONE,
        }
    }
}
