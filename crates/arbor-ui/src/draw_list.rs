//! Retained draw output produced by the paint pass.
//!
//! Each widget paints into its own [`Scene`] in local coordinates. The scene is
//! cached in the arena and only rebuilt when the widget requests a repaint, so
//! a redraw after a pure reposition reuses every fragment. The paint pass then
//! stitches fragments into a [`DrawList`] of layers, each carrying the
//! widget's window transform. The draw list is API-agnostic; turning it into
//! pixels is the backend's job.

use crate::widget_id::WidgetId;
use arbor_core::geometry::Rect;
use arbor_core::math::{Affine2, Vec2};
use arbor_core::profiling::profile_function;

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

/// High-level draw command, in the painting widget's local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled rectangle, optionally rounded
    FillRect {
        rect: Rect<f32>,
        color: Color,
        corner_radius: f32,
    },
    /// Rectangle outline
    StrokeRect {
        rect: Rect<f32>,
        color: Color,
        width: f32,
    },
    /// Unshaped text run; the backend shapes it
    Text {
        origin: Vec2,
        text: String,
        font_size: f32,
        color: Color,
    },
}

/// The draw commands of one widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, rect: Rect<f32>, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            corner_radius: 0.0,
        });
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect<f32>, color: Color, corner_radius: f32) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            corner_radius,
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect<f32>, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeRect { rect, color, width });
    }

    pub fn draw_text(&mut self, origin: Vec2, text: impl Into<String>, font_size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            origin,
            text: text.into(),
            font_size,
            color,
        });
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// One entry of the exported draw list.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    /// A widget's fragment, to be drawn with `transform` (local to window).
    Layer {
        widget: WidgetId,
        transform: Affine2,
        scene: Scene,
    },
    /// Clip everything until the matching `PopClip` to `rect`, given in
    /// window coordinates.
    PushClip { widget: WidgetId, rect: Rect<f32> },
    PopClip,
}

/// Backend-agnostic output of the paint pass, in painter's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_layer(&mut self, widget: WidgetId, transform: Affine2, scene: &Scene) {
        if scene.is_empty() {
            return;
        }
        self.items.push(DrawItem::Layer {
            widget,
            transform,
            scene: scene.clone(),
        });
    }

    pub(crate) fn push_clip(&mut self, widget: WidgetId, rect: Rect<f32>) {
        self.items.push(DrawItem::PushClip { widget, rect });
    }

    pub(crate) fn pop_clip(&mut self) {
        self.items.push(DrawItem::PopClip);
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Widgets with at least one command, in painter's order.
    pub fn painted_widgets(&self) -> Vec<WidgetId> {
        self.items
            .iter()
            .filter_map(|item| match item {
                DrawItem::Layer { widget, .. } => Some(*widget),
                _ => None,
            })
            .collect()
    }

    /// Every command with its transform applied to rect origins and text
    /// positions, for backends that do not handle per-layer transforms.
    pub fn flatten(&self) -> Vec<(WidgetId, DrawCommand)> {
        profile_function!();
        let mut out = Vec::new();
        for item in &self.items {
            let DrawItem::Layer {
                widget,
                transform,
                scene,
            } = item
            else {
                continue;
            };
            for command in scene.commands() {
                let placed = match command.clone() {
                    DrawCommand::FillRect {
                        rect,
                        color,
                        corner_radius,
                    } => DrawCommand::FillRect {
                        rect: rect.transform_bbox(*transform),
                        color,
                        corner_radius,
                    },
                    DrawCommand::StrokeRect { rect, color, width } => DrawCommand::StrokeRect {
                        rect: rect.transform_bbox(*transform),
                        color,
                        width,
                    },
                    DrawCommand::Text {
                        origin,
                        text,
                        font_size,
                        color,
                    } => DrawCommand::Text {
                        origin: transform.transform_point2(origin),
                        text,
                        font_size,
                        color,
                    },
                };
                out.push((*widget, placed));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scene_is_not_layered() {
        let mut list = DrawList::new();
        list.push_layer(WidgetId::next(), Affine2::IDENTITY, &Scene::new());
        assert!(list.is_empty());
    }

    #[test]
    fn test_flatten_applies_transform() {
        let id = WidgetId::next();
        let mut scene = Scene::new();
        scene.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
        scene.draw_text(Vec2::new(1.0, 2.0), "hi", 12.0, Color::WHITE);

        let mut list = DrawList::new();
        list.push_layer(id, Affine2::from_translation(Vec2::new(5.0, 5.0)), &scene);

        let flat = list.flatten();
        assert_eq!(flat.len(), 2);
        match &flat[0].1 {
            DrawCommand::FillRect { rect, .. } => assert_eq!(*rect, Rect::new(5.0, 5.0, 10.0, 10.0)),
            other => panic!("unexpected command {other:?}"),
        }
        match &flat[1].1 {
            DrawCommand::Text { origin, .. } => assert_eq!(*origin, Vec2::new(6.0, 7.0)),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(list.painted_widgets(), vec![id]);
    }

    #[test]
    fn test_color_from_u8() {
        let c = Color::from_rgb_u8(255, 0, 51);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.b, 0.2);
        assert!(c.is_opaque());
        assert!(!c.with_alpha(0.5).is_opaque());
    }
}
