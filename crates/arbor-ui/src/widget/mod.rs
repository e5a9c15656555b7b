//! The widget trait and the arena that stores widgets.
//!
//! # Architecture
//!
//! ## Widgets
//!
//! A [`Widget`] implements the pass callbacks and reports its children's ids.
//! Each callback receives the context of its pass, which is the only way to
//! reach the arena from widget code.
//!
//! ## Handles
//!
//! Parents hold children as [`WidgetPod`]s. A pod embeds its widget until
//! tree registration moves it into the [`WidgetArena`]; afterwards it is just
//! a key.
//!
//! ## Access from outside passes
//!
//! - [`WidgetRef`]: read-only view, for hosts and tests
//! - [`WidgetMut`]: mutation view handed to mutate callbacks and to
//!   `RenderRoot::edit_root_widget`

mod handle;
mod state;
mod storage;
mod widget_mut;
mod widget_ref;

pub use handle::WidgetPod;
pub use state::WidgetState;
pub use storage::{ArenaError, WidgetArena};
pub use widget_mut::WidgetMut;
pub use widget_ref::WidgetRef;

pub(crate) use widget_mut::apply_downcast;

use crate::access::{AccessNode, Role};
use crate::contexts::{
    AccessCtx, ComposeCtx, EventCtx, LayoutCtx, PaintCtx, RegisterCtx, UpdateCtx,
};
use crate::draw_list::Scene;
use crate::event::{AccessEvent, PointerEvent, TextEvent, Update};
use crate::layout::BoxConstraints;
use crate::widget_id::WidgetId;
use arbor_core::geometry::Size;
use smallvec::SmallVec;
use std::any::Any;

/// Inline capacity of [`Widget::children_ids`].
pub type ChildrenIds = SmallVec<[WidgetId; 16]>;

/// A retained tree node.
///
/// Event and update callbacks default to doing nothing. A widget with
/// children must register every child pod in
/// [`register_children`](Self::register_children), run layout on and place
/// every non-stashed child in [`layout`](Self::layout), and report the same
/// ids, in paint order, from [`children_ids`](Self::children_ids).
pub trait Widget: AsDynWidget + Any {
    fn on_pointer_event(&mut self, ctx: &mut EventCtx<'_>, event: &PointerEvent) {
        let _ = (ctx, event);
    }

    fn on_text_event(&mut self, ctx: &mut EventCtx<'_>, event: &TextEvent) {
        let _ = (ctx, event);
    }

    fn on_access_event(&mut self, ctx: &mut EventCtx<'_>, event: &AccessEvent) {
        let _ = (ctx, event);
    }

    /// Called on animation frames after `request_anim_frame`, with the
    /// interval since the previous frame in nanoseconds.
    fn on_anim_frame(&mut self, ctx: &mut UpdateCtx<'_>, interval: u64) {
        let _ = (ctx, interval);
    }

    /// Status transitions: added, disabled, stashed, focus, hover, pan.
    fn update(&mut self, ctx: &mut UpdateCtx<'_>, event: &Update) {
        let _ = (ctx, event);
    }

    fn register_children(&mut self, ctx: &mut RegisterCtx<'_>);

    fn layout(&mut self, ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32>;

    /// Called after this widget's window transform changed or compose was
    /// requested. Children are composed afterwards.
    fn compose(&mut self, ctx: &mut ComposeCtx<'_>) {
        let _ = ctx;
    }

    /// Paint into `scene` in local coordinates. Children paint themselves.
    fn paint(&mut self, ctx: &mut PaintCtx<'_>, scene: &mut Scene);

    fn accessibility_role(&self) -> Role;

    /// Fill in the descriptive part of this widget's node.
    fn accessibility(&mut self, ctx: &mut AccessCtx<'_>, node: &mut AccessNode);

    fn children_ids(&self) -> ChildrenIds;

    fn accepts_focus(&self) -> bool {
        false
    }

    /// Whether hit testing may stop at this widget.
    fn accepts_pointer_interaction(&self) -> bool {
        true
    }

    fn short_type_name(&self) -> &'static str {
        short_name(std::any::type_name::<Self>())
    }

    /// Extra text for tree dumps and trace logs.
    fn get_debug_text(&self) -> Option<String> {
        None
    }
}

/// Strip module paths and generics from a type name.
fn short_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Conversions to `dyn Widget`, implemented for every sized widget.
///
/// This lets generic code erase a `Box<W>` where `W` may itself be
/// `dyn Widget`.
pub trait AsDynWidget {
    fn as_box_dyn(self: Box<Self>) -> Box<dyn Widget>;
    fn as_dyn(&self) -> &(dyn Widget + 'static);
    fn as_dyn_mut(&mut self) -> &mut (dyn Widget + 'static);
}

impl<T: Widget> AsDynWidget for T {
    fn as_box_dyn(self: Box<Self>) -> Box<dyn Widget> {
        self
    }

    fn as_dyn(&self) -> &(dyn Widget + 'static) {
        self
    }

    fn as_dyn_mut(&mut self) -> &mut (dyn Widget + 'static) {
        self
    }
}

/// Downcasts from `dyn Widget`, implemented for every sized widget and for
/// `dyn Widget` itself.
pub trait FromDynWidget {
    fn from_dyn<'a>(widget: &'a (dyn Widget + 'static)) -> Option<&'a Self>;
    fn from_dyn_mut<'a>(widget: &'a mut (dyn Widget + 'static)) -> Option<&'a mut Self>;
}

impl<T: Widget> FromDynWidget for T {
    fn from_dyn<'a>(widget: &'a (dyn Widget + 'static)) -> Option<&'a Self> {
        let any: &dyn Any = widget;
        any.downcast_ref()
    }

    fn from_dyn_mut<'a>(widget: &'a mut (dyn Widget + 'static)) -> Option<&'a mut Self> {
        let any: &mut dyn Any = widget;
        any.downcast_mut()
    }
}

impl FromDynWidget for dyn Widget {
    fn from_dyn<'a>(widget: &'a (dyn Widget + 'static)) -> Option<&'a Self> {
        Some(widget)
    }

    fn from_dyn_mut<'a>(widget: &'a mut (dyn Widget + 'static)) -> Option<&'a mut Self> {
        Some(widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Button, Label};

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("arbor_ui::widgets::label::Label"), "Label");
        assert_eq!(short_name("a::Recorder<b::Label>"), "Recorder");
    }

    #[test]
    fn test_downcast_through_dyn() {
        let mut boxed: Box<dyn Widget> = Box::new(Label::new("hi"));
        assert!(Label::from_dyn(&*boxed).is_some());
        assert!(Button::from_dyn(&*boxed).is_none());
        assert!(<dyn Widget>::from_dyn_mut(&mut *boxed).is_some());
        assert_eq!(boxed.short_type_name(), "Label");
    }

    fn first_label<'a>(widgets: &'a [Box<dyn Widget>]) -> Option<&'a Label> {
        widgets.iter().find_map(|widget| Label::from_dyn(&**widget))
    }

    #[test]
    fn test_downcast_borrows_for_caller_lifetime() {
        let widgets: Vec<Box<dyn Widget>> = vec![Box::new(Button::new("ok")), Box::new(Label::new("found"))];
        let label = first_label(&widgets);
        assert_eq!(label.map(Label::text), Some("found"));
    }
}
