use crate::access::{AccessNode, Role};
use crate::contexts::{AccessCtx, ComposeCtx, EventCtx, LayoutCtx, PaintCtx, RegisterCtx, UpdateCtx};
use crate::draw_list::Scene;
use crate::event::{Action, PointerEvent, Update};
use crate::layout::BoxConstraints;
use crate::widget::{ChildrenIds, Widget, WidgetMut, WidgetPod};
use crate::widget_id::WidgetId;
use arbor_core::geometry::{Rect, Size};
use arbor_core::math::Vec2;
use smallvec::smallvec;

/// A vertically scrollable viewport over a single child.
///
/// The child is laid out with unbounded height and clipped to the viewport.
/// Scrolling only moves the child in the compose pass; it never re-runs
/// layout.
pub struct Portal {
    child: WidgetPod<dyn Widget>,
    /// Current scroll position in content pixels.
    offset: Vec2,
    content_size: Size<f32>,
    viewport_size: Size<f32>,
}

impl Portal {
    pub fn new(child: impl Widget) -> Self {
        Self {
            child: WidgetPod::new(child).erased(),
            offset: Vec2::ZERO,
            content_size: Size::ZERO,
            viewport_size: Size::ZERO,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn content_size(&self) -> Size<f32> {
        self.content_size
    }

    pub fn viewport_size(&self) -> Size<f32> {
        self.viewport_size
    }

    pub fn child_id(&self) -> WidgetId {
        self.child.id()
    }

    pub fn set_offset(this: &mut WidgetMut<'_, Self>, offset: Vec2) {
        let offset = this.widget.clamp_offset(offset);
        if this.widget.offset != offset {
            this.widget.offset = offset;
            this.ctx.request_compose();
            this.ctx.request_accessibility();
        }
    }

    fn max_offset(&self) -> Vec2 {
        Vec2::new(
            (self.content_size.width - self.viewport_size.width).max(0.0),
            (self.content_size.height - self.viewport_size.height).max(0.0),
        )
    }

    fn clamp_offset(&self, offset: Vec2) -> Vec2 {
        offset.clamp(Vec2::ZERO, self.max_offset())
    }

    /// Smallest offset change that brings `rect` (viewport coordinates) into
    /// view. Returns true if the offset changed.
    fn pan_to(&mut self, rect: Rect<f32>) -> bool {
        let rect = rect.translate(self.offset);
        let mut offset = self.offset;
        if rect.y < offset.y {
            offset.y = rect.y;
        } else if rect.max_y() > offset.y + self.viewport_size.height {
            offset.y = rect.max_y() - self.viewport_size.height;
        }
        if rect.x < offset.x {
            offset.x = rect.x;
        } else if rect.max_x() > offset.x + self.viewport_size.width {
            offset.x = rect.max_x() - self.viewport_size.width;
        }
        let offset = self.clamp_offset(offset);
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }
}

impl Widget for Portal {
    fn on_pointer_event(&mut self, ctx: &mut EventCtx<'_>, event: &PointerEvent) {
        if let PointerEvent::Scroll(delta, _) = event {
            let offset = self.clamp_offset(self.offset + *delta);
            if offset != self.offset {
                self.offset = offset;
                ctx.request_compose();
                ctx.request_accessibility();
                ctx.submit_action(Action::Scrolled(offset));
            }
            ctx.set_handled();
        }
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>, event: &Update) {
        if let Update::RequestPanToChild(rect) = event {
            if self.pan_to(*rect) {
                ctx.request_compose();
                ctx.request_accessibility();
                ctx.submit_action(Action::Scrolled(self.offset));
            }
        }
    }

    fn register_children(&mut self, ctx: &mut RegisterCtx<'_>) {
        if !self.child.is_inserted() {
            ctx.register_child(&mut self.child);
        }
    }

    fn layout(&mut self, ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32> {
        let child_bc = bc.loosen().unbound_height();
        self.content_size = if ctx.child_stashed(&self.child) {
            Size::ZERO
        } else {
            let size = ctx.run_layout(&mut self.child, &child_bc);
            ctx.place_child(&mut self.child, Vec2::ZERO);
            size
        };

        let size = bc.constrain(self.content_size);
        self.viewport_size = size;
        ctx.set_clip_rect(Some(size.to_rect()));

        let offset = self.clamp_offset(self.offset);
        if offset != self.offset {
            self.offset = offset;
            ctx.request_compose();
        }
        size
    }

    fn compose(&mut self, ctx: &mut ComposeCtx<'_>) {
        ctx.set_child_scroll_translation(&mut self.child, -self.offset);
    }

    fn paint(&mut self, _ctx: &mut PaintCtx<'_>, _scene: &mut Scene) {}

    fn accessibility_role(&self) -> Role {
        Role::ScrollView
    }

    fn accessibility(&mut self, _ctx: &mut AccessCtx<'_>, node: &mut AccessNode) {
        node.set_value(format!("{:.0}", self.offset.y));
    }

    fn children_ids(&self) -> ChildrenIds {
        smallvec![self.child.id()]
    }
}
