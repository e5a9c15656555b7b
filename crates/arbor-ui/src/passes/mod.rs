//! The passes run by [`RenderRoot`](crate::RenderRoot).
//!
//! Event passes dispatch input. Rewrite passes run in a fixed order after
//! every interaction:
//!
//! mutate -> tree registration -> disabled -> stashed -> focus chain ->
//! focus -> layout -> scroll -> compose -> pointer/hover
//!
//! Render passes (paint, accessibility) run only when the host redraws.
//!
//! Every pass follows the same shape: check the subtree flag, check the
//! widget out of the arena, run its callback with the pass's context, put it
//! back, recurse into children, then recompute the subtree flag from what is
//! left.

pub(crate) mod accessibility;
pub(crate) mod anim;
pub(crate) mod compose;
pub(crate) mod event;
pub(crate) mod layout;
pub(crate) mod mutate;
pub(crate) mod paint;
pub(crate) mod update;

use crate::contexts::UpdateCtx;
use crate::event::Update;
use crate::render_root::RenderRootState;
use crate::widget::{Widget, WidgetArena};
use crate::widget_id::WidgetId;

/// Run `f` on a checked-out widget with an update context.
///
/// Does nothing if the widget is gone or already checked out.
pub(crate) fn with_update_ctx(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    f: impl FnOnce(&mut dyn Widget, &mut UpdateCtx<'_>),
) {
    if !arena.contains(id) {
        return;
    }
    let Some(mut widget) = arena.take_widget(id) else {
        return;
    };
    {
        let mut ctx = UpdateCtx {
            global: &mut *global,
            arena: &mut *arena,
            widget_id: id,
        };
        f(&mut *widget, &mut ctx);
    }
    arena.restore_widget(id, widget);
}

/// Deliver one status update to one widget.
pub(crate) fn send_update(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    update: &Update,
) {
    tracing::trace!("{} -> {id}", update.short_name());
    with_update_ctx(global, arena, id, |widget, ctx| widget.update(ctx, update));
}

/// Remove a subtree and clear every reference the root state holds to it.
pub(crate) fn remove_subtree(global: &mut RenderRootState, arena: &mut WidgetArena, id: WidgetId) {
    let removed = arena.remove(id);
    global.forget_widgets(arena, &removed);
}
