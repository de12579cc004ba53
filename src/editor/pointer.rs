use super::{EditorSession, Gesture, ToolKind};
use crate::geometry::ToolPoint;
use crate::sticker::{resize_bounds, StickerHit};
use crate::surface::BrushShape;

impl EditorSession {
    pub fn pointer_down(&mut self, point: ToolPoint) {
        if self.surface.is_none() {
            tracing::debug!(tool = ?self.active_tool, "pointer down ignored without surface");
            return;
        }
        if !self.gesture.is_idle() {
            self.pointer_leave();
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match self.active_tool {
            ToolKind::Select => self.begin_sticker_gesture(point),
            ToolKind::Brush | ToolKind::Eraser => {
                self.gesture = Gesture::Stroke {
                    last: point,
                    erase: self.active_tool == ToolKind::Eraser,
                };
            }
            ToolKind::Fill => {
                let dirty = surface.flood_fill(point, self.tool_state.color);
                self.mark(dirty);
                self.commit();
            }
            ToolKind::Eyedropper => {
                if let Some(color) = surface.sample_color(point) {
                    tracing::debug!(color = %color.to_hex(), "eyedropper sampled color");
                    self.tool_state.set_color(color);
                }
            }
            ToolKind::Text => {
                self.pending_text_point = Some(point);
            }
            ToolKind::Line | ToolKind::Rectangle | ToolKind::Circle | ToolKind::Triangle => {
                if let Some(kind) = self.active_tool.shape_kind() {
                    self.gesture = Gesture::Shape { kind, start: point };
                }
            }
            ToolKind::Adjust | ToolKind::AiSticker => {}
        }
    }

    pub fn pointer_move(&mut self, point: ToolPoint) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match self.gesture {
            Gesture::Idle | Gesture::Shape { .. } => {}
            Gesture::Stroke { last, erase } => {
                let dirty = if erase {
                    let style = self.tool_state.eraser_style(surface.background());
                    surface.draw_stroke(&[last, point], &style)
                } else if self.tool_state.brush_shape == BrushShape::Spray {
                    let state = &self.tool_state;
                    surface.spray(
                        point,
                        state.width,
                        self.config.spray_dot_count,
                        state.color,
                        state.opacity,
                        &mut self.rng,
                    )
                } else {
                    surface.draw_stroke(&[last, point], &self.tool_state.brush_style())
                };
                self.mark(dirty);
                self.gesture = Gesture::Stroke { last: point, erase };
            }
            Gesture::StickerDrag { id, grab_x, grab_y } => {
                let Some(bounds) = self.stickers.get(id).map(|sticker| sticker.bounds) else {
                    self.gesture = Gesture::Idle;
                    return;
                };
                let delta_x = point.x.saturating_sub(grab_x).saturating_sub(bounds.x);
                let delta_y = point.y.saturating_sub(grab_y).saturating_sub(bounds.y);
                self.stickers.translate(id, delta_x, delta_y);
            }
            Gesture::StickerResize {
                id,
                handle,
                origin,
                original,
            } => {
                let resized = resize_bounds(
                    original,
                    handle,
                    point.x.saturating_sub(origin.x),
                    point.y.saturating_sub(origin.y),
                );
                if !self.stickers.set_bounds(id, resized) {
                    self.gesture = Gesture::Idle;
                }
            }
        }
    }

    pub fn pointer_up(&mut self, point: ToolPoint) {
        let gesture = std::mem::take(&mut self.gesture);
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match gesture {
            Gesture::Stroke { .. } => {
                self.commit();
            }
            Gesture::Shape { kind, start } => {
                let dirty = surface.draw_shape(kind, start, point, &self.tool_state.shape_style());
                self.mark(dirty);
                self.commit();
            }
            Gesture::StickerDrag { id, .. } | Gesture::StickerResize { id, .. } => {
                let bounds = self.stickers.get(id).map(|sticker| sticker.bounds);
                tracing::debug!(id, ?bounds, "sticker gesture finished");
            }
            Gesture::Idle => {}
        }
    }

    /// Pointer left the canvas: keeps a stroke drawn so far, drops an unfinished shape.
    pub fn pointer_leave(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Stroke { .. } => {
                self.commit();
            }
            Gesture::Shape { kind, .. } => {
                tracing::debug!(?kind, "shape abandoned on pointer leave");
            }
            Gesture::StickerDrag { .. } | Gesture::StickerResize { .. } | Gesture::Idle => {}
        }
    }

    fn begin_sticker_gesture(&mut self, point: ToolPoint) {
        match self.stickers.hit_test(point) {
            Some(StickerHit::Handle { id, handle }) => {
                let Some(original) = self.stickers.get(id).map(|sticker| sticker.bounds) else {
                    return;
                };
                self.gesture = Gesture::StickerResize {
                    id,
                    handle,
                    origin: point,
                    original,
                };
            }
            Some(StickerHit::Body { id }) => {
                let Some(bounds) = self.stickers.get(id).map(|sticker| sticker.bounds) else {
                    return;
                };
                self.stickers.select(id);
                self.gesture = Gesture::StickerDrag {
                    id,
                    grab_x: point.x.saturating_sub(bounds.x),
                    grab_y: point.y.saturating_sub(bounds.y),
                };
            }
            None => self.stickers.deselect(),
        }
    }
}
