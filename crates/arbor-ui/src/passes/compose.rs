use crate::contexts::ComposeCtx;
use crate::flags::WidgetFlags;
use crate::metrics::MetricsTimer;
use crate::render_root::{RenderRoot, RenderRootState};
use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use arbor_core::math::Affine2;
use arbor_core::profiling::profile_function;
use tracing::trace_span;

fn compose_widget(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    parent_transform: Affine2,
    parent_moved: bool,
) {
    let state = arena.state_mut(id);
    if state.is_stashed() {
        // Unstashing requests compose again.
        state.flags.remove(WidgetFlags::NEEDS_COMPOSE);
        return;
    }
    if !parent_moved && !state.flags.contains(WidgetFlags::NEEDS_COMPOSE) {
        return;
    }

    let window_transform = parent_transform * state.local_transform();
    let moved = parent_moved
        || state.window_transform != window_transform
        || state.flags.contains(WidgetFlags::TRANSFORM_CHANGED);
    let requested = state.flags.contains(WidgetFlags::REQUEST_COMPOSE);
    state.window_transform = window_transform;
    state
        .flags
        .remove(WidgetFlags::REQUEST_COMPOSE | WidgetFlags::TRANSFORM_CHANGED);

    if moved {
        arena.mark(
            id,
            WidgetFlags::NEEDS_PAINT | WidgetFlags::NEEDS_ACCESSIBILITY,
        );
        global.needs_pointer_pass = true;
    }

    if moved || requested {
        if let Some(mut widget) = arena.take_widget(id) {
            {
                let mut ctx = ComposeCtx {
                    global: &mut *global,
                    arena: &mut *arena,
                    widget_id: id,
                };
                widget.compose(&mut ctx);
            }
            arena.restore_widget(id, widget);
            global.metrics.widgets_composed += 1;
        }
    }

    let children = arena.state(id).children.clone();
    for child in children {
        compose_widget(global, arena, child, window_transform, moved);
    }
    arena.recompute_needs(
        id,
        WidgetFlags::NEEDS_COMPOSE,
        WidgetFlags::REQUEST_COMPOSE | WidgetFlags::TRANSFORM_CHANGED,
    );
}

/// Recompute window transforms of every widget that moved, and run
/// `compose` on widgets that moved or asked for it.
pub(crate) fn run_compose_pass(root: &mut RenderRoot) {
    let root_id = root.root_id;
    if !root
        .arena
        .state(root_id)
        .flags
        .contains(WidgetFlags::NEEDS_COMPOSE)
    {
        return;
    }
    let _span = trace_span!("compose").entered();
    profile_function!();
    let timer = MetricsTimer::start();

    compose_widget(
        &mut root.global,
        &mut root.arena,
        root_id,
        Affine2::IDENTITY,
        false,
    );

    root.global.metrics.compose_time += timer.stop();
}
