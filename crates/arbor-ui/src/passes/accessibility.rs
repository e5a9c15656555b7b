use crate::access::{AccessFlags, AccessNode, AccessTree};
use crate::contexts::AccessCtx;
use crate::flags::WidgetFlags;
use crate::render_root::{RenderRoot, RenderRootState};
use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use arbor_core::profiling::profile_function;
use tracing::trace_span;

fn build_access_node(
    global: &RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    tree: &mut AccessTree,
) {
    let state = arena.state(id);
    if state.is_stashed() {
        return;
    }

    if state.flags.contains(WidgetFlags::REQUEST_ACCESSIBILITY) {
        if let Some(mut widget) = arena.take_widget(id) {
            let mut node = AccessNode::new(widget.accessibility_role());
            {
                let mut ctx = AccessCtx {
                    global,
                    arena: &*arena,
                    widget_id: id,
                };
                widget.accessibility(&mut ctx, &mut node);
            }
            arena.restore_widget(id, widget);
            arena.state_mut(id).access_cache = node;
        }
        arena
            .state_mut(id)
            .flags
            .remove(WidgetFlags::REQUEST_ACCESSIBILITY);
    }

    let state = arena.state(id);
    let children: Vec<WidgetId> = state
        .children
        .iter()
        .copied()
        .filter(|child| arena.try_state(*child).is_some_and(|child| !child.is_stashed()))
        .collect();
    let mut flags = AccessFlags::empty();
    flags.set(
        AccessFlags::FOCUSABLE,
        state.focus_chain.first() == Some(&id),
    );
    flags.set(AccessFlags::FOCUSED, state.is_focused());
    flags.set(AccessFlags::DISABLED, state.is_disabled());
    flags.set(AccessFlags::HOVERED, state.is_hovered());
    let bounds = state.window_bounds();

    let state = arena.state_mut(id);
    let node = &mut state.access_cache;
    node.id = Some(id);
    node.bounds = bounds;
    node.children = children.clone();
    node.flags = flags;
    tree.nodes.insert(id, node.clone());

    for child in children {
        build_access_node(global, arena, child, tree);
    }
    arena
        .state_mut(id)
        .flags
        .remove(WidgetFlags::NEEDS_ACCESSIBILITY);
}

/// Export the accessibility tree of every non-stashed widget.
///
/// Only widgets that requested it run their `accessibility` callback; the
/// rest reuse the descriptive fields of their last node.
pub(crate) fn run_accessibility_pass(root: &mut RenderRoot) -> AccessTree {
    let _span = trace_span!("accessibility").entered();
    profile_function!();

    let mut tree = AccessTree {
        root: Some(root.root_id),
        focus: root.global.focused_widget,
        ..Default::default()
    };
    build_access_node(&root.global, &mut root.arena, root.root_id, &mut tree);
    tree
}
