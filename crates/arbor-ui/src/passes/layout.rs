//! Layout pass.
//!
//! Layout is driven by the widgets themselves: the pass calls the root's
//! `layout`, and each parent calls [`LayoutCtx::run_layout`] and
//! [`LayoutCtx::place_child`] on its children. A widget whose subtree is
//! clean and whose constraints did not change answers from its cached size.
//!
//! [`LayoutCtx::run_layout`]: crate::contexts::LayoutCtx::run_layout
//! [`LayoutCtx::place_child`]: crate::contexts::LayoutCtx::place_child

use crate::contexts::LayoutCtx;
use crate::debug::debug_panic;
use crate::flags::WidgetFlags;
use crate::layout::BoxConstraints;
use crate::metrics::MetricsTimer;
use crate::render_root::{RenderRoot, RenderRootState};
use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use arbor_core::geometry::Size;
use arbor_core::profiling::profile_function;
use tracing::{trace, trace_span, warn};

/// Lay out one widget under `bc`, returning its size.
pub(crate) fn run_layout_on(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    bc: &BoxConstraints,
) -> Size<f32> {
    let Some(state) = arena.try_state_mut(id) else {
        debug_panic!("run_layout called on removed widget {id}");
        return Size::ZERO;
    };
    let name = state.debug_name;
    if state.flags.contains(WidgetFlags::LAID_OUT) {
        debug_panic!("run_layout called twice on {name} {id}");
        return state.size;
    }
    state.flags.insert(WidgetFlags::LAID_OUT);

    if state.is_stashed() {
        return Size::ZERO;
    }
    if !state.flags.contains(WidgetFlags::NEEDS_LAYOUT) && state.layout_constraints == Some(*bc) {
        trace!("{name} {id} reused cached size");
        global.metrics.layout_skips += 1;
        return state.size;
    }

    let children = state.children.clone();
    for child in &children {
        if let Some(child_state) = arena.try_state_mut(*child) {
            child_state
                .flags
                .remove(WidgetFlags::LAID_OUT | WidgetFlags::PLACED);
        }
    }

    let Some(mut widget) = arena.take_widget(id) else {
        return Size::ZERO;
    };
    let _span = trace_span!("layout", widget = name, id = id.to_raw()).entered();
    let size = {
        let mut ctx = LayoutCtx {
            global: &mut *global,
            arena: &mut *arena,
            widget_id: id,
        };
        widget.layout(&mut ctx, bc)
    };
    arena.restore_widget(id, widget);

    for child in &children {
        let Some(child_state) = arena.try_state(*child) else {
            continue;
        };
        if child_state.is_stashed() {
            continue;
        }
        if !child_state.flags.contains(WidgetFlags::LAID_OUT) {
            debug_panic!(
                "{name} {id} did not call run_layout on child {} {child}",
                child_state.debug_name
            );
        } else if !child_state.flags.contains(WidgetFlags::PLACED) {
            debug_panic!(
                "{name} {id} did not call place_child on child {} {child}",
                child_state.debug_name
            );
        }
    }

    let size = if size.is_valid() {
        size
    } else {
        debug_panic!("{name} {id} returned invalid size {size:?}");
        Size::ZERO
    };
    if !bc.contains(size) {
        warn!("{name} {id} returned {size:?}, outside its constraints {bc:?}");
    }

    let state = arena.state_mut(id);
    let resized = state.size != size;
    state.size = size;
    state.layout_constraints = Some(*bc);
    state
        .flags
        .remove(WidgetFlags::REQUEST_LAYOUT | WidgetFlags::NEEDS_LAYOUT);
    if resized {
        arena.mark(
            id,
            WidgetFlags::REQUEST_PAINT | WidgetFlags::REQUEST_ACCESSIBILITY,
        );
    }
    global.metrics.widgets_laid_out += 1;
    size
}

/// Lay out the tree from the root, constrained tightly to the window size.
pub(crate) fn run_layout_pass(root: &mut RenderRoot) {
    let root_id = root.root_id;
    if !root
        .arena
        .state(root_id)
        .flags
        .contains(WidgetFlags::NEEDS_LAYOUT)
    {
        return;
    }
    let _span = trace_span!("layout_pass").entered();
    profile_function!();
    let timer = MetricsTimer::start();

    let bc = BoxConstraints::tight(root.size);
    let state = root.arena.state_mut(root_id);
    state
        .flags
        .remove(WidgetFlags::LAID_OUT | WidgetFlags::PLACED);
    run_layout_on(&mut root.global, &mut root.arena, root_id, &bc);
    root.arena
        .state_mut(root_id)
        .flags
        .insert(WidgetFlags::PLACED);

    root.global.metrics.layout_time += timer.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_root::{RenderRoot, RenderRootOptions};
    use crate::widgets::{Flex, Label, SizedBox};

    #[test]
    fn test_root_fills_window() {
        let options = RenderRootOptions::default().with_initial_size(Size::new(300.0, 200.0));
        let root = RenderRoot::new(SizedBox::empty(), options);
        assert_eq!(root.arena.state(root.root_id).size, Size::new(300.0, 200.0));
    }

    #[test]
    fn test_clean_subtree_is_cached() {
        let mut root = RenderRoot::new(
            Flex::column().with_child(Label::new("a")).with_child(Label::new("b")),
            RenderRootOptions::default(),
        );
        let first = root.last_metrics().widgets_laid_out;
        assert_eq!(first, 3);

        let label = root.arena.state(root.root_id).children[0];
        root.edit_widget(label, |mut label| {
            let mut label = label.downcast::<Label>();
            Label::set_text(&mut label, "longer text");
        });
        // The edited label and its parent re-run; the sibling reuses its size.
        let metrics = root.last_metrics();
        assert_eq!(metrics.widgets_laid_out, 2);
        assert_eq!(metrics.layout_skips, 1);
    }
}
