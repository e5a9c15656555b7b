//! Capability-scoped contexts handed to widget callbacks.
//!
//! Every pass binds one context type to the widget it visits. A context only
//! has the methods that are legal in its pass:
//!
//! | Context | Own geometry | Tree structure | Request passes |
//! |---|---|---|---|
//! | [`EventCtx`] | no | yes | yes |
//! | [`UpdateCtx`] | yes | yes | yes |
//! | [`MutateCtx`] | yes | yes | yes |
//! | [`LayoutCtx`] | no | no | compose, paint, accessibility |
//! | [`ComposeCtx`] | no | no | paint, accessibility |
//! | [`RegisterCtx`] | no | registration only | no |
//! | [`PaintCtx`], [`AccessCtx`], [`QueryCtx`] | yes | no | no |
//!
//! Layout and compose may still queue work with `mutate_later`; it runs at
//! the start of the next rewrite iteration.

use crate::access::AccessNode;
use crate::debug::debug_panic;
use crate::event::{Action, PointerId, RenderRootSignal};
use crate::flags::WidgetFlags;
use crate::layout::BoxConstraints;
use crate::passes::layout::run_layout_on;
use crate::passes::mutate::mutate_widget;
use crate::passes::remove_subtree;
use crate::render_root::{MutateCallback, RenderRootState};
use crate::widget::{
    FromDynWidget, Widget, WidgetArena, WidgetMut, WidgetPod, WidgetRef, WidgetState,
    apply_downcast,
};
use crate::widget_id::WidgetId;
use arbor_core::geometry::{Rect, Size};
use arbor_core::math::{Affine2, Vec2};

/// Context for pointer, text and access event handlers.
pub struct EventCtx<'a> {
    pub(crate) global: &'a mut RenderRootState,
    pub(crate) arena: &'a mut WidgetArena,
    pub(crate) widget_id: WidgetId,
    pub(crate) target: WidgetId,
    /// Set for pointer events only.
    pub(crate) pointer_id: Option<PointerId>,
    pub(crate) is_handled: bool,
}

/// Context for status updates and animation frames.
pub struct UpdateCtx<'a> {
    pub(crate) global: &'a mut RenderRootState,
    pub(crate) arena: &'a mut WidgetArena,
    pub(crate) widget_id: WidgetId,
}

/// Context of a [`WidgetMut`], for edits from outside the widget's own
/// callbacks.
pub struct MutateCtx<'a> {
    pub(crate) global: &'a mut RenderRootState,
    pub(crate) arena: &'a mut WidgetArena,
    pub(crate) widget_id: WidgetId,
}

/// Context for `Widget::register_children`.
pub struct RegisterCtx<'a> {
    pub(crate) arena: &'a mut WidgetArena,
    pub(crate) widget_id: WidgetId,
    pub(crate) registered: Vec<WidgetId>,
}

/// Context for `Widget::layout`.
pub struct LayoutCtx<'a> {
    pub(crate) global: &'a mut RenderRootState,
    pub(crate) arena: &'a mut WidgetArena,
    pub(crate) widget_id: WidgetId,
}

/// Context for `Widget::compose`.
pub struct ComposeCtx<'a> {
    pub(crate) global: &'a mut RenderRootState,
    pub(crate) arena: &'a mut WidgetArena,
    pub(crate) widget_id: WidgetId,
}

/// Context for `Widget::paint`.
pub struct PaintCtx<'a> {
    pub(crate) global: &'a RenderRootState,
    pub(crate) arena: &'a WidgetArena,
    pub(crate) widget_id: WidgetId,
}

/// Context for `Widget::accessibility`.
pub struct AccessCtx<'a> {
    pub(crate) global: &'a RenderRootState,
    pub(crate) arena: &'a WidgetArena,
    pub(crate) widget_id: WidgetId,
}

/// Read-only context behind a [`WidgetRef`].
#[derive(Clone, Copy)]
pub struct QueryCtx<'a> {
    pub(crate) global: &'a RenderRootState,
    pub(crate) arena: &'a WidgetArena,
    pub(crate) widget_id: WidgetId,
}

/// Implement the same methods on several context types.
macro_rules! impl_context_method {
    ($SomeCtx:ident $(<$a:lifetime>)?, { $($method:item)+ }) => {
        impl $SomeCtx $(<$a>)? {
            $($method)+
        }
    };
    ($SomeCtx:ident $(<$a:lifetime>)?, $($SomeCtxs:ident $(<$b:lifetime>)?),*, { $($method:item)+ }) => {
        impl_context_method!($SomeCtx $(<$a>)?, { $($method)+ });
        impl_context_method!($($SomeCtxs $(<$b>)?),*, { $($method)+ });
    };
}

// --- Status, readable everywhere ---

impl_context_method!(
    EventCtx<'_>,
    UpdateCtx<'_>,
    MutateCtx<'_>,
    LayoutCtx<'_>,
    ComposeCtx<'_>,
    PaintCtx<'_>,
    AccessCtx<'_>,
    QueryCtx<'_>,
    {
        pub fn widget_id(&self) -> WidgetId {
            self.widget_id
        }

        fn widget_state(&self) -> &WidgetState {
            self.arena.state(self.widget_id)
        }

        /// Disabled by itself or through an ancestor.
        pub fn is_disabled(&self) -> bool {
            self.widget_state().is_disabled()
        }

        pub fn is_stashed(&self) -> bool {
            self.widget_state().is_stashed()
        }

        pub fn is_hovered(&self) -> bool {
            self.widget_state().is_hovered()
        }

        /// The pointer is over this widget or one of its descendants.
        pub fn has_hovered(&self) -> bool {
            self.widget_state().has_hovered()
        }

        /// This widget has active or inactive focus.
        pub fn is_focused(&self) -> bool {
            self.widget_state().is_focused()
        }

        /// This widget or a descendant has focus.
        pub fn has_focus(&self) -> bool {
            self.widget_state().has_focused()
        }

        pub fn has_pointer_capture(&self) -> bool {
            self.widget_state().has_pointer_capture()
        }

        pub fn is_window_focused(&self) -> bool {
            self.global.window_focused
        }
    }
);

// --- Own geometry ---

impl_context_method!(
    UpdateCtx<'_>,
    MutateCtx<'_>,
    PaintCtx<'_>,
    AccessCtx<'_>,
    QueryCtx<'_>,
    {
        pub fn size(&self) -> Size<f32> {
            self.widget_state().size
        }

        pub fn window_transform(&self) -> Affine2 {
            self.widget_state().window_transform
        }

        pub fn window_origin(&self) -> Vec2 {
            self.widget_state().window_origin()
        }

        pub fn window_bounds(&self) -> Rect<f32> {
            self.widget_state().window_bounds()
        }

        /// Rect in the parent's coordinate space.
        pub fn layout_rect(&self) -> Rect<f32> {
            self.widget_state().layout_rect()
        }
    }
);

// --- Invalidation and structure ---

impl_context_method!(EventCtx<'_>, UpdateCtx<'_>, MutateCtx<'_>, {
    fn mark_self(&mut self, flags: WidgetFlags) {
        self.arena.mark(self.widget_id, flags);
    }

    pub fn request_layout(&mut self) {
        self.mark_self(WidgetFlags::REQUEST_LAYOUT);
    }

    pub fn request_compose(&mut self) {
        self.mark_self(WidgetFlags::REQUEST_COMPOSE);
    }

    pub fn request_paint(&mut self) {
        self.mark_self(WidgetFlags::REQUEST_PAINT);
    }

    pub fn request_accessibility(&mut self) {
        self.mark_self(WidgetFlags::REQUEST_ACCESSIBILITY);
    }

    /// Request both paint and accessibility.
    pub fn request_render(&mut self) {
        self.mark_self(WidgetFlags::REQUEST_PAINT | WidgetFlags::REQUEST_ACCESSIBILITY);
    }

    pub fn request_anim_frame(&mut self) {
        self.mark_self(WidgetFlags::REQUEST_ANIM);
    }

    /// Children were added or removed. Registration, layout and the focus
    /// chain are rebuilt for this widget.
    pub fn children_changed(&mut self) {
        self.mark_self(
            WidgetFlags::CHILDREN_CHANGED
                | WidgetFlags::REQUEST_LAYOUT
                | WidgetFlags::NEEDS_UPDATE_FOCUS_CHAIN
                | WidgetFlags::NEEDS_PAINT
                | WidgetFlags::NEEDS_ACCESSIBILITY,
        );
    }

    /// Disable or enable this widget and, through inheritance, its subtree.
    pub fn set_disabled(&mut self, disabled: bool) {
        let state = self.arena.state_mut(self.widget_id);
        if state.flags.contains(WidgetFlags::EXPLICITLY_DISABLED) == disabled {
            return;
        }
        state.flags.set(WidgetFlags::EXPLICITLY_DISABLED, disabled);
        self.mark_self(WidgetFlags::NEEDS_UPDATE_DISABLED);
    }

    /// Stash or unstash a child. Stashed subtrees keep their state but are
    /// not laid out, painted, hit or focused.
    pub fn set_stashed<W: Widget + ?Sized>(&mut self, child: &mut WidgetPod<W>, stashed: bool) {
        let id = child.id();
        if !self.check_child(id, "set_stashed") {
            return;
        }
        let state = self.arena.state_mut(id);
        if state.flags.contains(WidgetFlags::EXPLICITLY_STASHED) == stashed {
            return;
        }
        state.flags.set(WidgetFlags::EXPLICITLY_STASHED, stashed);
        self.arena.mark(id, WidgetFlags::NEEDS_UPDATE_STASHED);
        self.request_layout();
    }

    pub fn set_transform(&mut self, transform: Affine2) {
        let state = self.arena.state_mut(self.widget_id);
        if state.transform != transform {
            state.transform = transform;
            self.mark_self(WidgetFlags::TRANSFORM_CHANGED);
        }
    }

    /// Give focus to this widget at the next focus pass.
    pub fn request_focus(&mut self) {
        self.global.next_focused_widget = Some(self.widget_id);
    }

    /// Drop focus if this widget has it or is about to get it.
    pub fn resign_focus(&mut self) {
        let pending = self.global.next_focused_widget;
        if pending == Some(self.widget_id) {
            self.global.next_focused_widget = None;
        }
    }

    /// Ask scrollable ancestors to bring this widget into view.
    pub fn request_scroll_to_this(&mut self) {
        let rect = self.arena.state(self.widget_id).size.to_rect();
        self.request_scroll_to(rect);
    }

    /// Ask scrollable ancestors to bring `rect` (local coordinates) into view.
    pub fn request_scroll_to(&mut self, rect: Rect<f32>) {
        self.global.scroll_requests.push((self.widget_id, rect));
    }

    pub fn submit_action(&mut self, action: Action) {
        tracing::debug!("{} submitted {action:?}", self.widget_id);
        self.global
            .emit_signal(RenderRootSignal::Action(action, self.widget_id));
    }

    /// Remove a child and its whole subtree.
    pub fn remove_child<W: Widget + ?Sized>(&mut self, child: WidgetPod<W>) {
        if !child.is_inserted() {
            return;
        }
        let id = child.id();
        if !self.check_child(id, "remove_child") {
            return;
        }
        remove_subtree(self.global, self.arena, id);
        self.children_changed();
    }

    /// Run `f` on a child with a mutation context of its own.
    ///
    /// Returns `None` if the child is not inserted yet or is not a `W`.
    pub fn mutate_child<W, R>(
        &mut self,
        child: &mut WidgetPod<W>,
        f: impl FnOnce(WidgetMut<'_, W>) -> R,
    ) -> Option<R>
    where
        W: Widget + FromDynWidget + ?Sized,
    {
        let id = child.id();
        if !child.is_inserted() {
            debug_panic!(
                "mutate_child on {id} before it was registered by {}",
                self.widget_id
            );
            return None;
        }
        if !self.check_child(id, "mutate_child") {
            return None;
        }
        mutate_widget(self.global, self.arena, id, |mut widget| {
            widget.try_downcast::<W>().map(f)
        })
        .flatten()
    }

    fn check_child(&self, child: WidgetId, operation: &str) -> bool {
        if self.arena.parent_of(child) == Some(self.widget_id) {
            return true;
        }
        debug_panic!(
            "{operation}: {child} is not a child of {} {}",
            self.arena.state(self.widget_id).debug_name,
            self.widget_id
        );
        false
    }
});

// --- Deferred mutation, available even where direct edits are not ---

impl_context_method!(
    EventCtx<'_>,
    UpdateCtx<'_>,
    MutateCtx<'_>,
    LayoutCtx<'_>,
    ComposeCtx<'_>,
    {
        /// Queue `f` to run on `target` during the next mutate pass.
        ///
        /// Dropped silently if `target` is removed before then. Queued from
        /// layout or compose, this makes the rewrite sequence run again.
        pub fn mutate_later<W>(&mut self, target: WidgetId, f: impl FnOnce(WidgetMut<'_, W>) + 'static)
        where
            W: Widget + FromDynWidget + ?Sized,
        {
            self.global.mutate_callbacks.push_back(MutateCallback {
                target,
                callback: Box::new(move |widget| apply_downcast(widget, f)),
            });
        }
    }
);

// --- Render invalidation for layout and compose ---

impl_context_method!(LayoutCtx<'_>, ComposeCtx<'_>, {
    pub fn request_paint(&mut self) {
        self.arena.mark(self.widget_id, WidgetFlags::REQUEST_PAINT);
    }

    pub fn request_accessibility(&mut self) {
        self.arena
            .mark(self.widget_id, WidgetFlags::REQUEST_ACCESSIBILITY);
    }

    pub fn request_render(&mut self) {
        self.arena.mark(
            self.widget_id,
            WidgetFlags::REQUEST_PAINT | WidgetFlags::REQUEST_ACCESSIBILITY,
        );
    }

    /// Size of a child computed earlier in this layout pass, or in a
    /// previous one.
    pub fn child_size<W: Widget + ?Sized>(&self, child: &WidgetPod<W>) -> Size<f32> {
        self.arena.state(child.id()).size
    }
});

impl EventCtx<'_> {
    /// The widget the event was dispatched to; equals `widget_id` on the
    /// target itself and differs while bubbling.
    pub fn target(&self) -> WidgetId {
        self.target
    }

    /// Stop bubbling after this handler.
    pub fn set_handled(&mut self) {
        self.is_handled = true;
    }

    pub fn is_handled(&self) -> bool {
        self.is_handled
    }

    /// Convert a window position into this widget's coordinates, using the
    /// transform from the last compose pass.
    pub fn local_position(&self, window_position: Vec2) -> Vec2 {
        self.widget_state()
            .window_transform
            .inverse()
            .transform_point2(window_position)
    }

    /// Route every event of the current pointer to this widget until
    /// released.
    pub fn capture_pointer(&mut self) {
        let Some(pointer_id) = self.pointer_id else {
            debug_panic!("capture_pointer called outside a pointer event by {}", self.widget_id);
            return;
        };
        let position = self
            .global
            .last_pointer
            .map(|info| info.position)
            .unwrap_or_default();
        self.global
            .captures
            .acquire(self.arena, pointer_id, self.widget_id, position);
        self.global.needs_pointer_pass = true;
    }

    /// Release the current pointer if this widget holds it. No leave event
    /// is sent.
    pub fn release_pointer(&mut self) {
        let Some(pointer_id) = self.pointer_id else {
            return;
        };
        if self.global.captures.holder(pointer_id) == Some(self.widget_id) {
            self.global.captures.release(self.arena, pointer_id, false);
            self.global.needs_pointer_pass = true;
        }
    }
}

impl MutateCtx<'_> {
    /// Shorter-lived copy of this context.
    pub fn reborrow_mut(&mut self) -> MutateCtx<'_> {
        MutateCtx {
            global: &mut *self.global,
            arena: &mut *self.arena,
            widget_id: self.widget_id,
        }
    }

    /// Direct access to a child's state, bypassing the pass flags.
    ///
    /// # Caller contract
    ///
    /// Only for a parent maintaining the invariants of a direct child it
    /// controls, such as nudging its origin without a layout. The caller must
    /// request whatever pass the change needs (usually `request_compose`).
    pub fn raw_child_state_mut<W: Widget + ?Sized>(
        &mut self,
        child: &WidgetPod<W>,
    ) -> Option<&mut WidgetState> {
        if self.arena.parent_of(child.id()) != Some(self.widget_id) {
            debug_panic!("raw_child_state_mut: {} is not a child of {}", child.id(), self.widget_id);
            return None;
        }
        self.arena.try_state_mut(child.id())
    }
}

impl RegisterCtx<'_> {
    /// Move a child pod's widget into the arena under this widget.
    ///
    /// Registering an already inserted pod is a logic error.
    pub fn register_child<W: Widget + ?Sized>(&mut self, child: &mut WidgetPod<W>) {
        let id = child.id();
        let Some(widget) = child.take_inner() else {
            debug_panic!("{id} registered twice by {}", self.widget_id);
            return;
        };
        self.arena.insert(id, widget.as_box_dyn());
        self.arena.attach(id, self.widget_id);
        self.registered.push(id);
    }

    pub fn widget_id(&self) -> WidgetId {
        self.widget_id
    }
}

impl LayoutCtx<'_> {
    /// Lay out a child. Must be called exactly once per layout of this
    /// widget for every non-stashed child, followed by `place_child`.
    pub fn run_layout<W: Widget + ?Sized>(
        &mut self,
        child: &mut WidgetPod<W>,
        bc: &BoxConstraints,
    ) -> Size<f32> {
        let id = child.id();
        if self.arena.parent_of(id) != Some(self.widget_id) {
            debug_panic!("run_layout: {id} is not a child of {}", self.widget_id);
            return Size::ZERO;
        }
        run_layout_on(self.global, self.arena, id, bc)
    }

    /// Set a child's origin in this widget's coordinate space.
    pub fn place_child<W: Widget + ?Sized>(&mut self, child: &mut WidgetPod<W>, origin: Vec2) {
        let id = child.id();
        let Some(state) = self.arena.try_state_mut(id) else {
            debug_panic!("place_child: {id} is not in the tree");
            return;
        };
        if !state.flags.contains(WidgetFlags::LAID_OUT) {
            debug_panic!("place_child on {id} before run_layout");
            return;
        }
        if !origin.is_finite() {
            debug_panic!("place_child: invalid origin {origin} for {id}");
            return;
        }
        state.flags.insert(WidgetFlags::PLACED);
        if state.origin != origin {
            state.origin = origin;
            self.arena.mark(id, WidgetFlags::TRANSFORM_CHANGED);
        }
    }

    pub fn child_stashed<W: Widget + ?Sized>(&self, child: &WidgetPod<W>) -> bool {
        self.arena.state(child.id()).is_stashed()
    }

    /// Clip children to `rect` (local coordinates), or stop clipping.
    pub fn set_clip_rect(&mut self, rect: Option<Rect<f32>>) {
        let state = self.arena.state_mut(self.widget_id);
        if state.clip != rect {
            state.clip = rect;
            self.arena.mark(self.widget_id, WidgetFlags::NEEDS_PAINT);
        }
    }

    pub fn request_compose(&mut self) {
        self.arena.mark(self.widget_id, WidgetFlags::REQUEST_COMPOSE);
    }
}

impl ComposeCtx<'_> {
    /// Offset a child by `translation` on top of its layout origin, without
    /// running layout.
    pub fn set_child_scroll_translation<W: Widget + ?Sized>(
        &mut self,
        child: &mut WidgetPod<W>,
        translation: Vec2,
    ) {
        let id = child.id();
        if self.arena.parent_of(id) != Some(self.widget_id) {
            debug_panic!("set_child_scroll_translation: {id} is not a child of {}", self.widget_id);
            return;
        }
        let state = self.arena.state_mut(id);
        if state.scroll_translation != translation {
            state.scroll_translation = translation;
            self.arena.mark(id, WidgetFlags::TRANSFORM_CHANGED);
        }
    }
}

impl PaintCtx<'_> {
    /// Clip rect set during layout, in local coordinates.
    pub fn clip_rect(&self) -> Option<Rect<f32>> {
        self.widget_state().clip
    }
}

impl AccessCtx<'_> {
    /// Descriptive node of a child, as last exported.
    pub fn child_node<W: Widget + ?Sized>(&self, child: &WidgetPod<W>) -> Option<&AccessNode> {
        self.arena
            .try_state(child.id())
            .map(|state| &state.access_cache)
    }
}

impl<'a> QueryCtx<'a> {
    pub(crate) fn new(global: &'a RenderRootState, arena: &'a WidgetArena, widget_id: WidgetId) -> Self {
        Self {
            global,
            arena,
            widget_id,
        }
    }

    pub fn state(&self) -> &'a WidgetState {
        self.arena.state(self.widget_id)
    }

    pub(crate) fn child_ref(&self, id: WidgetId) -> Option<WidgetRef<'a, dyn Widget>> {
        let (widget, _) = self.arena.get(id)?;
        Some(WidgetRef {
            ctx: QueryCtx::new(self.global, self.arena, id),
            widget,
        })
    }
}
