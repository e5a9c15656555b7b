use crate::contexts::PaintCtx;
use crate::draw_list::DrawList;
use crate::flags::WidgetFlags;
use crate::render_root::{RenderRoot, RenderRootState};
use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use arbor_core::profiling::profile_function;
use tracing::{trace, trace_span};

fn paint_widget(
    global: &RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    list: &mut DrawList,
) {
    let state = arena.state_mut(id);
    if state.is_stashed() {
        return;
    }

    if state.flags.contains(WidgetFlags::REQUEST_PAINT) {
        let mut scene = std::mem::take(&mut state.paint_cache);
        scene.clear();
        if let Some(mut widget) = arena.take_widget(id) {
            {
                let mut ctx = PaintCtx {
                    global,
                    arena: &*arena,
                    widget_id: id,
                };
                widget.paint(&mut ctx, &mut scene);
            }
            arena.restore_widget(id, widget);
        }
        trace!("repainted {id} ({} commands)", scene.commands().len());
        let state = arena.state_mut(id);
        state.paint_cache = scene;
        state.flags.remove(WidgetFlags::REQUEST_PAINT);
    }

    let state = arena.state(id);
    let transform = state.window_transform;
    list.push_layer(id, transform, &state.paint_cache);
    let clip = state.clip.map(|clip| clip.transform_bbox(transform));
    let children = state.children.clone();

    if let Some(clip) = clip {
        list.push_clip(id, clip);
    }
    for child in children {
        paint_widget(global, arena, child, list);
    }
    if clip.is_some() {
        list.pop_clip();
    }

    arena.state_mut(id).flags.remove(WidgetFlags::NEEDS_PAINT);
}

/// Build the full draw list, repainting only widgets that asked for it.
pub(crate) fn run_paint_pass(root: &mut RenderRoot) -> DrawList {
    let _span = trace_span!("paint").entered();
    profile_function!();

    let mut list = DrawList::new();
    paint_widget(&root.global, &mut root.arena, root.root_id, &mut list);
    list
}
