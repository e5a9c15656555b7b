//! A widget whose behavior is supplied as closures.

use arbor_ui::access::{AccessNode, Role};
use arbor_ui::contexts::{
    AccessCtx, ComposeCtx, EventCtx, LayoutCtx, PaintCtx, RegisterCtx, UpdateCtx,
};
use arbor_ui::draw_list::Scene;
use arbor_ui::event::{AccessEvent, PointerEvent, TextEvent, Update};
use arbor_ui::layout::BoxConstraints;
use arbor_ui::widget::{ChildrenIds, Widget, WidgetPod};
use arbor_ui::{Size, Vec2};

type PointerEventFn<S> = dyn FnMut(&mut S, &mut EventCtx<'_>, &PointerEvent);
type TextEventFn<S> = dyn FnMut(&mut S, &mut EventCtx<'_>, &TextEvent);
type AccessEventFn<S> = dyn FnMut(&mut S, &mut EventCtx<'_>, &AccessEvent);
type AnimFrameFn<S> = dyn FnMut(&mut S, &mut UpdateCtx<'_>, u64);
type UpdateFn<S> = dyn FnMut(&mut S, &mut UpdateCtx<'_>, &Update);
type RegisterChildrenFn<S> = dyn FnMut(&mut S, &mut RegisterCtx<'_>);
type LayoutFn<S> = dyn FnMut(&mut S, &mut LayoutCtx<'_>, &BoxConstraints) -> Size<f32>;
type ComposeFn<S> = dyn FnMut(&mut S, &mut ComposeCtx<'_>);
type PaintFn<S> = dyn FnMut(&mut S, &mut PaintCtx<'_>, &mut Scene);
type AccessFn<S> = dyn FnMut(&mut S, &mut AccessCtx<'_>, &mut AccessNode);
type ChildrenFn<S> = dyn Fn(&S) -> ChildrenIds;

/// A widget that runs arbitrary closures for each callback, holding some
/// state `S` they share.
///
/// Unset callbacks do nothing. Leaf layout defaults to the smallest allowed
/// size; the parent constructors lay their children out.
///
/// # Example
///
/// ```rust,ignore
/// let widget = ModularWidget::new(0_u32)
///     .accepts_focus(true)
///     .update_fn(|count, ctx, event| {
///         if matches!(event, Update::FocusChanged(true)) {
///             *count += 1;
///             ctx.request_paint();
///         }
///     });
/// ```
pub struct ModularWidget<S> {
    state: S,
    accepts_focus: bool,
    accepts_pointer_interaction: bool,
    role: Role,
    on_pointer_event: Option<Box<PointerEventFn<S>>>,
    on_text_event: Option<Box<TextEventFn<S>>>,
    on_access_event: Option<Box<AccessEventFn<S>>>,
    on_anim_frame: Option<Box<AnimFrameFn<S>>>,
    update: Option<Box<UpdateFn<S>>>,
    register_children: Option<Box<RegisterChildrenFn<S>>>,
    layout: Option<Box<LayoutFn<S>>>,
    compose: Option<Box<ComposeFn<S>>>,
    paint: Option<Box<PaintFn<S>>>,
    accessibility: Option<Box<AccessFn<S>>>,
    children: Option<Box<ChildrenFn<S>>>,
}

impl<S: 'static> ModularWidget<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            accepts_focus: false,
            accepts_pointer_interaction: true,
            role: Role::GenericContainer,
            on_pointer_event: None,
            on_text_event: None,
            on_access_event: None,
            on_anim_frame: None,
            update: None,
            register_children: None,
            layout: None,
            compose: None,
            paint: None,
            accessibility: None,
            children: None,
        }
    }

    pub fn accepts_focus(mut self, accepts_focus: bool) -> Self {
        self.accepts_focus = accepts_focus;
        self
    }

    pub fn accepts_pointer_interaction(mut self, accepts: bool) -> Self {
        self.accepts_pointer_interaction = accepts;
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn pointer_event_fn(
        mut self,
        f: impl FnMut(&mut S, &mut EventCtx<'_>, &PointerEvent) + 'static,
    ) -> Self {
        self.on_pointer_event = Some(Box::new(f));
        self
    }

    pub fn text_event_fn(
        mut self,
        f: impl FnMut(&mut S, &mut EventCtx<'_>, &TextEvent) + 'static,
    ) -> Self {
        self.on_text_event = Some(Box::new(f));
        self
    }

    pub fn access_event_fn(
        mut self,
        f: impl FnMut(&mut S, &mut EventCtx<'_>, &AccessEvent) + 'static,
    ) -> Self {
        self.on_access_event = Some(Box::new(f));
        self
    }

    pub fn anim_frame_fn(mut self, f: impl FnMut(&mut S, &mut UpdateCtx<'_>, u64) + 'static) -> Self {
        self.on_anim_frame = Some(Box::new(f));
        self
    }

    pub fn update_fn(mut self, f: impl FnMut(&mut S, &mut UpdateCtx<'_>, &Update) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    pub fn register_children_fn(
        mut self,
        f: impl FnMut(&mut S, &mut RegisterCtx<'_>) + 'static,
    ) -> Self {
        self.register_children = Some(Box::new(f));
        self
    }

    pub fn layout_fn(
        mut self,
        f: impl FnMut(&mut S, &mut LayoutCtx<'_>, &BoxConstraints) -> Size<f32> + 'static,
    ) -> Self {
        self.layout = Some(Box::new(f));
        self
    }

    pub fn compose_fn(mut self, f: impl FnMut(&mut S, &mut ComposeCtx<'_>) + 'static) -> Self {
        self.compose = Some(Box::new(f));
        self
    }

    pub fn paint_fn(mut self, f: impl FnMut(&mut S, &mut PaintCtx<'_>, &mut Scene) + 'static) -> Self {
        self.paint = Some(Box::new(f));
        self
    }

    pub fn access_fn(
        mut self,
        f: impl FnMut(&mut S, &mut AccessCtx<'_>, &mut AccessNode) + 'static,
    ) -> Self {
        self.accessibility = Some(Box::new(f));
        self
    }

    pub fn children_fn(mut self, f: impl Fn(&S) -> ChildrenIds + 'static) -> Self {
        self.children = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

impl ModularWidget<WidgetPod<dyn Widget>> {
    /// A single-child widget that gives its child the incoming constraints
    /// and takes the child's size.
    pub fn new_parent(child: impl Widget) -> Self {
        Self::new_parent_pod(WidgetPod::new(child).erased())
    }

    pub fn new_parent_pod(child: WidgetPod<dyn Widget>) -> Self {
        Self::new(child)
            .register_children_fn(|child, ctx| {
                if !child.is_inserted() {
                    ctx.register_child(child);
                }
            })
            .layout_fn(|child, ctx, bc| {
                let size = ctx.run_layout(child, bc);
                ctx.place_child(child, Vec2::ZERO);
                size
            })
            .children_fn(|child| std::iter::once(child.id()).collect())
    }
}

impl ModularWidget<Vec<WidgetPod<dyn Widget>>> {
    /// A widget stacking its children vertically under loose constraints.
    pub fn new_multi_parent(children: Vec<WidgetPod<dyn Widget>>) -> Self {
        Self::new(children)
            .register_children_fn(|children, ctx| {
                for child in children.iter_mut().filter(|child| !child.is_inserted()) {
                    ctx.register_child(child);
                }
            })
            .layout_fn(|children, ctx, bc| {
                let child_bc = bc.loosen();
                let mut y = 0.0_f32;
                let mut width = 0.0_f32;
                for child in children.iter_mut() {
                    if ctx.child_stashed(child) {
                        continue;
                    }
                    let size = ctx.run_layout(child, &child_bc);
                    ctx.place_child(child, Vec2::new(0.0, y));
                    y += size.height;
                    width = width.max(size.width);
                }
                bc.constrain(Size::new(width, y))
            })
            .children_fn(|children| children.iter().map(|child| child.id()).collect())
    }
}

impl<S: 'static> Widget for ModularWidget<S> {
    fn on_pointer_event(&mut self, ctx: &mut EventCtx<'_>, event: &PointerEvent) {
        if let Some(f) = self.on_pointer_event.as_mut() {
            f(&mut self.state, ctx, event);
        }
    }

    fn on_text_event(&mut self, ctx: &mut EventCtx<'_>, event: &TextEvent) {
        if let Some(f) = self.on_text_event.as_mut() {
            f(&mut self.state, ctx, event);
        }
    }

    fn on_access_event(&mut self, ctx: &mut EventCtx<'_>, event: &AccessEvent) {
        if let Some(f) = self.on_access_event.as_mut() {
            f(&mut self.state, ctx, event);
        }
    }

    fn on_anim_frame(&mut self, ctx: &mut UpdateCtx<'_>, interval: u64) {
        if let Some(f) = self.on_anim_frame.as_mut() {
            f(&mut self.state, ctx, interval);
        }
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>, event: &Update) {
        if let Some(f) = self.update.as_mut() {
            f(&mut self.state, ctx, event);
        }
    }

    fn register_children(&mut self, ctx: &mut RegisterCtx<'_>) {
        if let Some(f) = self.register_children.as_mut() {
            f(&mut self.state, ctx);
        }
    }

    fn layout(&mut self, ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32> {
        match self.layout.as_mut() {
            Some(f) => f(&mut self.state, ctx, bc),
            None => bc.min(),
        }
    }

    fn compose(&mut self, ctx: &mut ComposeCtx<'_>) {
        if let Some(f) = self.compose.as_mut() {
            f(&mut self.state, ctx);
        }
    }

    fn paint(&mut self, ctx: &mut PaintCtx<'_>, scene: &mut Scene) {
        if let Some(f) = self.paint.as_mut() {
            f(&mut self.state, ctx, scene);
        }
    }

    fn accessibility_role(&self) -> Role {
        self.role
    }

    fn accessibility(&mut self, ctx: &mut AccessCtx<'_>, node: &mut AccessNode) {
        if let Some(f) = self.accessibility.as_mut() {
            f(&mut self.state, ctx, node);
        }
    }

    fn children_ids(&self) -> ChildrenIds {
        match self.children.as_ref() {
            Some(f) => f(&self.state),
            None => ChildrenIds::new(),
        }
    }

    fn accepts_focus(&self) -> bool {
        self.accepts_focus
    }

    fn accepts_pointer_interaction(&self) -> bool {
        self.accepts_pointer_interaction
    }
}
