use crate::geometry::{ToolBounds, ToolPoint};

/// Smallest width or height a sticker can be resized to.
pub const STICKER_MIN_SIZE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Whether dragging this handle moves the left (`x`) edge.
    const fn drags_left_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    const fn drags_top_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    pub fn corner(self, bounds: ToolBounds) -> ToolPoint {
        let x = if self.drags_left_edge() {
            bounds.x
        } else {
            bounds.right()
        };
        let y = if self.drags_top_edge() {
            bounds.y
        } else {
            bounds.bottom()
        };
        ToolPoint::new(x, y)
    }
}

/// Square of side `size` centered on the handle's corner.
pub fn handle_rect(bounds: ToolBounds, handle: ResizeHandle, size: u32) -> ToolBounds {
    let corner = handle.corner(bounds);
    let half = i32::try_from(size / 2).unwrap_or(i32::MAX);
    ToolBounds::new(corner.x.saturating_sub(half), corner.y.saturating_sub(half), size, size)
}

/// Returns the handle whose square, grown by `tolerance` on every side, contains `point`.
pub fn handle_at(
    bounds: ToolBounds,
    point: ToolPoint,
    size: u32,
    tolerance: u32,
) -> Option<ResizeHandle> {
    let tolerance = i32::try_from(tolerance).unwrap_or(0);
    ResizeHandle::ALL.into_iter().find(|handle| {
        let rect = handle_rect(bounds, *handle, size);
        point.x >= rect.x.saturating_sub(tolerance)
            && point.x <= rect.right().saturating_add(tolerance)
            && point.y >= rect.y.saturating_sub(tolerance)
            && point.y <= rect.bottom().saturating_add(tolerance)
    })
}

/// Recomputes bounds for a corner drag of `(delta_x, delta_y)` from `original`.
///
/// Width and height never drop below [`STICKER_MIN_SIZE`]; when clamped, the edge
/// opposite the dragged one stays where it was.
pub fn resize_bounds(
    original: ToolBounds,
    handle: ResizeHandle,
    delta_x: i32,
    delta_y: i32,
) -> ToolBounds {
    let (x, width) = resize_axis(
        original.x,
        original.width,
        delta_x,
        handle.drags_left_edge(),
    );
    let (y, height) = resize_axis(original.y, original.height, delta_y, handle.drags_top_edge());
    ToolBounds::new(x, y, width, height)
}

fn resize_axis(position: i32, size: u32, delta: i32, drags_near_edge: bool) -> (i32, u32) {
    let position = i64::from(position);
    let size = i64::from(size);
    let delta = i64::from(delta);
    let min = i64::from(STICKER_MIN_SIZE);

    let (mut next_position, mut next_size) = if drags_near_edge {
        (position + delta, size - delta)
    } else {
        (position, size + delta)
    };
    if next_size < min {
        next_size = min;
        if drags_near_edge {
            next_position = position + size - min;
        }
    }

    let next_position = next_position.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    (
        i32::try_from(next_position).unwrap_or(i32::MAX),
        u32::try_from(next_size).unwrap_or(u32::MAX),
    )
}
