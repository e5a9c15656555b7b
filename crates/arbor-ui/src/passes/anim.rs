use crate::flags::WidgetFlags;
use crate::passes::with_update_ctx;
use crate::render_root::{RenderRoot, RenderRootState};
use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use arbor_core::profiling::profile_function;
use std::time::Duration;
use tracing::trace_span;

fn anim_widget(global: &mut RenderRootState, arena: &mut WidgetArena, id: WidgetId, interval: u64) {
    let state = arena.state_mut(id);
    if !state.flags.contains(WidgetFlags::NEEDS_ANIM) {
        return;
    }
    if state.is_stashed() {
        // Unstashing re-marks a pending REQUEST_ANIM.
        state.flags.remove(WidgetFlags::NEEDS_ANIM);
        return;
    }
    let requested = state.flags.contains(WidgetFlags::REQUEST_ANIM);
    state.flags.remove(WidgetFlags::REQUEST_ANIM);
    let children = state.children.clone();

    if requested {
        with_update_ctx(global, arena, id, |widget, ctx| {
            widget.on_anim_frame(ctx, interval);
        });
    }
    for child in children {
        anim_widget(global, arena, child, interval);
    }
    arena.recompute_needs(id, WidgetFlags::NEEDS_ANIM, WidgetFlags::REQUEST_ANIM);
}

/// Deliver one animation frame to every widget that requested it.
///
/// Widgets that want to keep animating must request another frame from
/// their `on_anim_frame`.
pub(crate) fn run_anim_pass(root: &mut RenderRoot, elapsed: Duration) {
    let _span = trace_span!("anim").entered();
    profile_function!();

    let interval = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
    anim_widget(&mut root.global, &mut root.arena, root.root_id, interval);
}
