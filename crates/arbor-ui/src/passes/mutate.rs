use crate::contexts::MutateCtx;
use crate::render_root::{MutateCallback, RenderRoot, RenderRootState};
use crate::widget::{Widget, WidgetArena, WidgetMut};
use crate::widget_id::WidgetId;
use arbor_core::profiling::profile_function;
use tracing::{trace, trace_span};

use crate::metrics::MetricsTimer;

/// Check a widget out and hand it to `f` as a [`WidgetMut`].
///
/// Returns `None` if the widget no longer exists or is already checked out.
pub(crate) fn mutate_widget<R>(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    f: impl FnOnce(WidgetMut<'_, dyn Widget>) -> R,
) -> Option<R> {
    let mut widget = arena.take_widget(id)?;
    let result = {
        let widget_mut = WidgetMut {
            ctx: MutateCtx {
                global: &mut *global,
                arena: &mut *arena,
                widget_id: id,
            },
            widget: &mut *widget,
        };
        f(widget_mut)
    };
    arena.restore_widget(id, widget);
    Some(result)
}

/// Apply every queued mutation, local ones first, then those sent through an
/// [`ExternalMutator`](crate::ExternalMutator).
///
/// Only callbacks queued before the pass starts run now. Anything queued by a
/// callback waits for the next rewrite iteration.
pub(crate) fn run_mutate_pass(root: &mut RenderRoot) {
    let global = &mut root.global;
    let arena = &mut root.arena;
    if !global.has_queued_mutations() {
        return;
    }
    let _span = trace_span!("mutate").entered();
    profile_function!();
    let timer = MetricsTimer::start();

    let mut callbacks: Vec<MutateCallback> = global.mutate_callbacks.drain(..).collect();
    while let Ok(external) = global.external_receiver.try_recv() {
        callbacks.push(MutateCallback {
            target: external.target,
            callback: external.callback,
        });
    }

    for MutateCallback { target, callback } in callbacks {
        if !arena.contains(target) {
            trace!("dropping mutation for removed widget {target}");
            global.metrics.mutations_dropped += 1;
            continue;
        }
        if mutate_widget(global, arena, target, callback).is_some() {
            global.metrics.mutations_applied += 1;
        } else {
            global.metrics.mutations_dropped += 1;
        }
    }

    global.metrics.mutate_time += timer.stop();
}
