use super::{ShapeKind, ToolBounds, ToolPoint};
use crate::sticker::ResizeHandle;

/// Transient state of the pointer gesture in progress. Only one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    Stroke {
        last: ToolPoint,
        erase: bool,
    },
    Shape {
        kind: ShapeKind,
        start: ToolPoint,
    },
    StickerDrag {
        id: u64,
        /// Pointer offset from the sticker's top-left corner at grab time.
        grab_x: i32,
        grab_y: i32,
    },
    StickerResize {
        id: u64,
        handle: ResizeHandle,
        origin: ToolPoint,
        original: ToolBounds,
    },
}

impl Gesture {
    pub(crate) const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
