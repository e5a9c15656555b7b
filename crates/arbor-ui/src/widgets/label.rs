use crate::access::{AccessNode, Role};
use crate::contexts::{AccessCtx, LayoutCtx, PaintCtx, RegisterCtx};
use crate::draw_list::{Color, Scene};
use crate::layout::BoxConstraints;
use crate::widget::{ChildrenIds, Widget, WidgetMut};
use arbor_core::geometry::Size;
use arbor_core::math::Vec2;

/// Label widget - displays a single run of text.
///
/// Text is measured with a fixed per-character estimate; shaping belongs to
/// the rendering backend.
#[derive(Debug, Clone)]
pub struct Label {
    text: String,
    font_size: f32,
    color: Color,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 16.0,
            color: Color::WHITE,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Estimated extent of the text at the current font size.
    pub fn measure(&self) -> Size<f32> {
        let char_count = self.text.chars().count() as f32;
        Size::new(char_count * self.font_size * 0.6, self.font_size * 1.2)
    }

    pub fn set_text(this: &mut WidgetMut<'_, Self>, text: impl Into<String>) {
        let text = text.into();
        if this.widget.text == text {
            return;
        }
        this.widget.text = text;
        this.ctx.request_layout();
        this.ctx.request_render();
    }

    pub fn set_font_size(this: &mut WidgetMut<'_, Self>, size: f32) {
        if this.widget.font_size != size {
            this.widget.font_size = size;
            this.ctx.request_layout();
            this.ctx.request_paint();
        }
    }

    pub fn set_color(this: &mut WidgetMut<'_, Self>, color: Color) {
        if this.widget.color != color {
            this.widget.color = color;
            this.ctx.request_paint();
        }
    }
}

impl Widget for Label {
    fn register_children(&mut self, _ctx: &mut RegisterCtx<'_>) {}

    fn layout(&mut self, _ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32> {
        bc.constrain(self.measure())
    }

    fn paint(&mut self, _ctx: &mut PaintCtx<'_>, scene: &mut Scene) {
        if !self.text.is_empty() {
            scene.draw_text(Vec2::ZERO, self.text.clone(), self.font_size, self.color);
        }
    }

    fn accessibility_role(&self) -> Role {
        Role::Label
    }

    fn accessibility(&mut self, _ctx: &mut AccessCtx<'_>, node: &mut AccessNode) {
        node.set_label(self.text.clone());
    }

    fn children_ids(&self) -> ChildrenIds {
        ChildrenIds::new()
    }

    fn accepts_pointer_interaction(&self) -> bool {
        false
    }

    fn get_debug_text(&self) -> Option<String> {
        Some(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_scales_with_font_size() {
        let label = Label::new("abcd").size(10.0);
        assert_eq!(label.measure(), Size::new(24.0, 12.0));
        assert_eq!(Label::new("").measure().width, 0.0);
    }
}
