use crate::access::{AccessNode, Role};
use crate::contexts::{AccessCtx, LayoutCtx, PaintCtx, RegisterCtx};
use crate::draw_list::Scene;
use crate::layout::BoxConstraints;
use crate::widget::{ChildrenIds, FromDynWidget, Widget, WidgetMut, WidgetPod};
use crate::widget_id::WidgetId;
use arbor_core::geometry::Size;
use arbor_core::math::Vec2;

/// Main axis of a [`Flex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

/// Stacks its children along one axis with fixed spacing.
///
/// Children get the container's cross-axis bound and an unbounded main axis,
/// so a child's constraints do not depend on its siblings. Stashed children
/// take no space.
pub struct Flex {
    axis: Axis,
    spacing: f32,
    children: Vec<WidgetPod<dyn Widget>>,
}

impl Flex {
    pub fn row() -> Self {
        Self::for_axis(Axis::Horizontal)
    }

    pub fn column() -> Self {
        Self::for_axis(Axis::Vertical)
    }

    pub fn for_axis(axis: Axis) -> Self {
        Self {
            axis,
            spacing: 0.0,
            children: Vec::new(),
        }
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_child(mut self, child: impl Widget) -> Self {
        self.children.push(WidgetPod::new(child).erased());
        self
    }

    pub fn with_child_pod(mut self, child: WidgetPod<dyn Widget>) -> Self {
        self.children.push(child);
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_id(&self, idx: usize) -> Option<WidgetId> {
        self.children.get(idx).map(|child| child.id())
    }

    pub fn add_child(this: &mut WidgetMut<'_, Self>, child: impl Widget) -> WidgetId {
        let pod = WidgetPod::new(child).erased();
        let id = pod.id();
        this.widget.children.push(pod);
        this.ctx.children_changed();
        id
    }

    pub fn insert_child(this: &mut WidgetMut<'_, Self>, idx: usize, child: impl Widget) -> WidgetId {
        let pod = WidgetPod::new(child).erased();
        let id = pod.id();
        this.widget.children.insert(idx, pod);
        this.ctx.children_changed();
        id
    }

    /// Remove the child at `idx` and its whole subtree.
    ///
    /// # Panics
    ///
    /// If `idx` is out of bounds.
    pub fn remove_child(this: &mut WidgetMut<'_, Self>, idx: usize) {
        let child = this.widget.children.remove(idx);
        this.ctx.remove_child(child);
    }

    pub fn clear(this: &mut WidgetMut<'_, Self>) {
        for child in std::mem::take(&mut this.widget.children) {
            this.ctx.remove_child(child);
        }
        this.ctx.children_changed();
    }

    pub fn set_child_stashed(this: &mut WidgetMut<'_, Self>, idx: usize, stashed: bool) {
        if let Some(child) = this.widget.children.get_mut(idx) {
            this.ctx.set_stashed(child, stashed);
        }
    }

    /// Run `f` on the child at `idx` if it exists and is a `W`.
    pub fn mutate_child<W, R>(
        this: &mut WidgetMut<'_, Self>,
        idx: usize,
        f: impl FnOnce(WidgetMut<'_, W>) -> R,
    ) -> Option<R>
    where
        W: Widget + FromDynWidget + ?Sized,
    {
        let child = this.widget.children.get_mut(idx)?;
        this.ctx.mutate_child(child, |mut child| child.try_downcast::<W>().map(f))?
    }

    pub fn set_spacing(this: &mut WidgetMut<'_, Self>, spacing: f32) {
        if this.widget.spacing != spacing {
            this.widget.spacing = spacing;
            this.ctx.request_layout();
        }
    }

    fn child_constraints(&self, bc: &BoxConstraints) -> BoxConstraints {
        let max = bc.max();
        let max = match self.axis {
            Axis::Horizontal => Size::new(f32::INFINITY, max.height),
            Axis::Vertical => Size::new(max.width, f32::INFINITY),
        };
        BoxConstraints::loose(max)
    }
}

impl Widget for Flex {
    fn register_children(&mut self, ctx: &mut RegisterCtx<'_>) {
        for child in &mut self.children {
            if !child.is_inserted() {
                ctx.register_child(child);
            }
        }
    }

    fn layout(&mut self, ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32> {
        let child_bc = self.child_constraints(bc);
        let mut main = 0.0_f32;
        let mut cross = 0.0_f32;
        let mut placed = 0;

        for child in &mut self.children {
            if ctx.child_stashed(child) {
                continue;
            }
            if placed > 0 {
                main += self.spacing;
            }
            let size = ctx.run_layout(child, &child_bc);
            let (origin, child_main, child_cross) = match self.axis {
                Axis::Horizontal => (Vec2::new(main, 0.0), size.width, size.height),
                Axis::Vertical => (Vec2::new(0.0, main), size.height, size.width),
            };
            ctx.place_child(child, origin);
            main += child_main;
            cross = cross.max(child_cross);
            placed += 1;
        }

        let size = match self.axis {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        };
        bc.constrain(size)
    }

    fn paint(&mut self, _ctx: &mut PaintCtx<'_>, _scene: &mut Scene) {}

    fn accessibility_role(&self) -> Role {
        Role::GenericContainer
    }

    fn accessibility(&mut self, _ctx: &mut AccessCtx<'_>, _node: &mut AccessNode) {}

    fn children_ids(&self) -> ChildrenIds {
        self.children.iter().map(|child| child.id()).collect()
    }
}
