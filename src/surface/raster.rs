//! Aliased coverage rasterization for strokes and shapes.
//!
//! Every primitive first marks the pixels it covers in a [`Coverage`] mask and the
//! surface blends each covered pixel exactly once, so overlapping stamps within one
//! primitive never darken a translucent stroke.

use crate::geometry::ToolPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cap {
    Round,
    Square,
}

#[derive(Debug, Clone)]
pub(crate) struct Coverage {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    count: usize,
}

impl Coverage {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            bits: vec![false; len],
            count: 0,
        }
    }

    pub(crate) fn mark(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        if !self.bits[index] {
            self.bits[index] = true;
            self.count += 1;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width.max(1);
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, covered)| **covered)
            .map(move |(index, _)| ((index as u32) % width, (index as u32) / width))
    }

    /// Clipped pixel range `[min, max]` on both axes for a float box.
    fn clip_box(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Option<(i64, i64, i64, i64)> {
        let x0 = (min_x.floor() as i64).max(0);
        let y0 = (min_y.floor() as i64).max(0);
        let x1 = (max_x.ceil() as i64).min(i64::from(self.width) - 1);
        let y1 = (max_y.ceil() as i64).min(i64::from(self.height) - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    fn mark_where(&mut self, bbox: (f32, f32, f32, f32), covers: impl Fn(f32, f32) -> bool) {
        let Some((x0, y0, x1, y1)) = self.clip_box(bbox.0, bbox.1, bbox.2, bbox.3) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                if covers(x as f32 + 0.5, y as f32 + 0.5) {
                    self.mark(x, y);
                }
            }
        }
    }
}

fn center(point: ToolPoint) -> (f32, f32) {
    (point.x as f32 + 0.5, point.y as f32 + 0.5)
}

fn half_width(width: u32) -> f32 {
    (width.max(1) as f32 / 2.0).max(0.5)
}

fn distance_to_segment(px: f32, py: f32, a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        (((px - a.0) * dx + (py - a.1) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

pub(crate) fn stroke_segment(
    mask: &mut Coverage,
    from: ToolPoint,
    to: ToolPoint,
    width: u32,
    cap: Cap,
) {
    let half = half_width(width);
    let (a, b) = (center(from), center(to));
    let bbox = (
        a.0.min(b.0) - half,
        a.1.min(b.1) - half,
        a.0.max(b.0) + half,
        a.1.max(b.1) + half,
    );
    match cap {
        Cap::Round => mask.mark_where(bbox, |px, py| distance_to_segment(px, py, a, b) <= half),
        Cap::Square => {
            let steps = from.distance_to(to).ceil().max(1.0) as u32 * 2;
            for step in 0..=steps {
                let t = step as f32 / steps as f32;
                let (sx, sy) = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
                mask.mark_where((sx - half, sy - half, sx + half, sy + half), |px, py| {
                    (px - sx).abs() <= half && (py - sy).abs() <= half
                });
            }
        }
    }
}

pub(crate) fn stroke_polyline(mask: &mut Coverage, points: &[ToolPoint], width: u32, cap: Cap) {
    match points {
        [] => {}
        [single] => stroke_segment(mask, *single, *single, width, cap),
        _ => {
            for pair in points.windows(2) {
                stroke_segment(mask, pair[0], pair[1], width, cap);
            }
        }
    }
}

/// Normalized `(left, top, right, bottom)` of a drag, right/bottom exclusive.
pub(crate) fn drag_box(start: ToolPoint, end: ToolPoint) -> (i32, i32, i32, i32) {
    (
        start.x.min(end.x),
        start.y.min(end.y),
        start.x.max(end.x),
        start.y.max(end.y),
    )
}

pub(crate) fn fill_rect(mask: &mut Coverage, start: ToolPoint, end: ToolPoint) {
    let (left, top, right, bottom) = drag_box(start, end);
    for y in top..bottom {
        for x in left..right {
            mask.mark(i64::from(x), i64::from(y));
        }
    }
}

pub(crate) fn stroke_rect(mask: &mut Coverage, start: ToolPoint, end: ToolPoint, width: u32) {
    let (left, top, right, bottom) = drag_box(start, end);
    let corners = [
        ToolPoint::new(left, top),
        ToolPoint::new(right, top),
        ToolPoint::new(right, bottom),
        ToolPoint::new(left, bottom),
        ToolPoint::new(left, top),
    ];
    stroke_polyline(mask, &corners, width, Cap::Square);
}

pub(crate) fn fill_circle(mask: &mut Coverage, origin: ToolPoint, radius: f32) {
    let c = center(origin);
    let bbox = (c.0 - radius, c.1 - radius, c.0 + radius, c.1 + radius);
    mask.mark_where(bbox, |px, py| {
        ((px - c.0).powi(2) + (py - c.1).powi(2)).sqrt() <= radius
    });
}

pub(crate) fn stroke_circle(mask: &mut Coverage, origin: ToolPoint, radius: f32, width: u32) {
    let half = half_width(width);
    let c = center(origin);
    let reach = radius + half;
    let bbox = (c.0 - reach, c.1 - reach, c.0 + reach, c.1 + reach);
    mask.mark_where(bbox, |px, py| {
        let distance = ((px - c.0).powi(2) + (py - c.1).powi(2)).sqrt();
        (distance - radius).abs() <= half
    });
}

/// Isoceles triangle inscribed in the drag box: apex at the horizontal midpoint of
/// the start row, base along the release row.
pub(crate) fn triangle_vertices(start: ToolPoint, end: ToolPoint) -> [ToolPoint; 3] {
    let apex_x = start.x + (end.x - start.x) / 2;
    [
        ToolPoint::new(apex_x, start.y),
        ToolPoint::new(end.x, end.y),
        ToolPoint::new(start.x, end.y),
    ]
}

pub(crate) fn fill_triangle(mask: &mut Coverage, vertices: [ToolPoint; 3]) {
    let [a, b, c] = vertices.map(center);
    let edge = |p: (f32, f32), q: (f32, f32), x: f32, y: f32| {
        (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
    };
    let bbox = (
        a.0.min(b.0).min(c.0),
        a.1.min(b.1).min(c.1),
        a.0.max(b.0).max(c.0),
        a.1.max(b.1).max(c.1),
    );
    mask.mark_where(bbox, |px, py| {
        let e0 = edge(a, b, px, py);
        let e1 = edge(b, c, px, py);
        let e2 = edge(c, a, px, py);
        (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0)
    });
}

pub(crate) fn stroke_triangle(mask: &mut Coverage, vertices: [ToolPoint; 3], width: u32) {
    let [a, b, c] = vertices;
    stroke_polyline(mask, &[a, b, c, a], width, Cap::Round);
}
