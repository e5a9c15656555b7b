use crate::access::{AccessNode, Role};
use crate::contexts::{AccessCtx, LayoutCtx, PaintCtx, RegisterCtx};
use crate::draw_list::{Color, Scene};
use crate::layout::BoxConstraints;
use crate::widget::{ChildrenIds, Widget, WidgetMut, WidgetPod};
use crate::widget_id::WidgetId;
use arbor_core::geometry::Size;
use arbor_core::math::Vec2;

/// A box with an optional fixed size, background and single child.
pub struct SizedBox {
    child: Option<WidgetPod<dyn Widget>>,
    width: Option<f32>,
    height: Option<f32>,
    background: Option<Color>,
}

impl SizedBox {
    pub fn new(child: impl Widget) -> Self {
        Self {
            child: Some(WidgetPod::new(child).erased()),
            ..Self::empty()
        }
    }

    pub fn new_pod<W: Widget + ?Sized>(child: WidgetPod<W>) -> Self {
        Self {
            child: Some(child.erased()),
            ..Self::empty()
        }
    }

    pub fn empty() -> Self {
        Self {
            child: None,
            width: None,
            height: None,
            background: None,
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn size(self, size: Size<f32>) -> Self {
        self.width(size.width).height(size.height)
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn child_id(&self) -> Option<WidgetId> {
        self.child.as_ref().map(|child| child.id())
    }

    /// Replace the child, removing the previous one and its subtree.
    pub fn set_child(this: &mut WidgetMut<'_, Self>, child: impl Widget) {
        if let Some(old) = this.widget.child.take() {
            this.ctx.remove_child(old);
        }
        this.widget.child = Some(WidgetPod::new(child).erased());
        this.ctx.children_changed();
    }

    pub fn remove_child(this: &mut WidgetMut<'_, Self>) {
        if let Some(old) = this.widget.child.take() {
            this.ctx.remove_child(old);
        }
    }

    pub fn set_width(this: &mut WidgetMut<'_, Self>, width: Option<f32>) {
        if this.widget.width != width {
            this.widget.width = width;
            this.ctx.request_layout();
        }
    }

    pub fn set_height(this: &mut WidgetMut<'_, Self>, height: Option<f32>) {
        if this.widget.height != height {
            this.widget.height = height;
            this.ctx.request_layout();
        }
    }

    pub fn set_background(this: &mut WidgetMut<'_, Self>, color: Option<Color>) {
        if this.widget.background != color {
            this.widget.background = color;
            this.ctx.request_paint();
        }
    }

    /// Constraints for the child: the incoming ones, tightened on every axis
    /// that has a fixed size.
    fn child_constraints(&self, bc: &BoxConstraints) -> BoxConstraints {
        let axis = |fixed: Option<f32>, min: f32, max: f32| match fixed {
            Some(value) => {
                let value = value.clamp(min, max);
                (value, value)
            }
            None => (min, max),
        };
        let (min_w, max_w) = axis(self.width, bc.min().width, bc.max().width);
        let (min_h, max_h) = axis(self.height, bc.min().height, bc.max().height);
        BoxConstraints::new(Size::new(min_w, min_h), Size::new(max_w, max_h))
    }
}

impl Widget for SizedBox {
    fn register_children(&mut self, ctx: &mut RegisterCtx<'_>) {
        if let Some(child) = self.child.as_mut().filter(|child| !child.is_inserted()) {
            ctx.register_child(child);
        }
    }

    fn layout(&mut self, ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32> {
        let child_bc = self.child_constraints(bc);
        match &mut self.child {
            Some(child) if !ctx.child_stashed(child) => {
                let size = ctx.run_layout(child, &child_bc);
                ctx.place_child(child, Vec2::ZERO);
                child_bc.constrain(size)
            }
            _ => child_bc.min(),
        }
    }

    fn paint(&mut self, ctx: &mut PaintCtx<'_>, scene: &mut Scene) {
        if let Some(background) = self.background {
            scene.fill_rect(ctx.size().to_rect(), background);
        }
    }

    fn accessibility_role(&self) -> Role {
        Role::GenericContainer
    }

    fn accessibility(&mut self, _ctx: &mut AccessCtx<'_>, _node: &mut AccessNode) {}

    fn children_ids(&self) -> ChildrenIds {
        self.child.iter().map(|child| child.id()).collect()
    }
}
