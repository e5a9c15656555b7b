//! Status passes: tree registration, disabled, stashed, focus chain, focus,
//! scroll requests and pointer hover.

use crate::contexts::RegisterCtx;
use crate::debug::debug_panic;
use crate::event::{PointerEvent, RenderRootSignal, Update};
use crate::flags::WidgetFlags;
use crate::focus::path_diff;
use crate::passes::event::{find_widget_at, send_pointer_event};
use crate::passes::send_update;
use crate::render_root::{RenderRoot, RenderRootState};
use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use arbor_core::profiling::profile_function;
use tracing::{debug, trace, trace_span};

// --- Tree registration ---

fn update_widget_tree(global: &mut RenderRootState, arena: &mut WidgetArena, id: WidgetId) {
    let flags = arena.state(id).flags;
    if !flags.contains(WidgetFlags::NEEDS_UPDATE_TREE) {
        return;
    }

    if flags.contains(WidgetFlags::CHILDREN_CHANGED) {
        let Some(mut widget) = arena.take_widget(id) else {
            return;
        };
        let name = widget.short_type_name();
        let registered = {
            let mut ctx = RegisterCtx {
                arena: &mut *arena,
                widget_id: id,
                registered: Vec::new(),
            };
            widget.register_children(&mut ctx);
            ctx.registered
        };
        let declared = widget.children_ids();
        arena.restore_widget(id, widget);

        let old_children = std::mem::take(&mut arena.state_mut(id).children);
        for child in &old_children {
            if !declared.contains(child) && arena.parent_of(*child) == Some(id) {
                debug_panic!("{name} {id} dropped child {child} without calling remove_child");
            }
        }
        let mut children = Vec::with_capacity(declared.len());
        for child in declared {
            if arena.parent_of(child) == Some(id) {
                children.push(child);
            } else {
                debug_panic!("{name} {id} declared child {child} that it never registered");
            }
        }
        trace!("{name} {id} registered {} children", registered.len());

        let state = arena.state_mut(id);
        state.children = children;
        state.flags.remove(WidgetFlags::CHILDREN_CHANGED);
    }

    if flags.contains(WidgetFlags::IS_NEW) {
        arena.state_mut(id).flags.remove(WidgetFlags::IS_NEW);
        send_update(global, arena, id, &Update::WidgetAdded);
    }

    let children = arena.state(id).children.clone();
    for child in children {
        update_widget_tree(global, arena, child);
    }
    arena.recompute_needs(
        id,
        WidgetFlags::NEEDS_UPDATE_TREE,
        WidgetFlags::CHILDREN_CHANGED,
    );
}

/// Register new children and deliver `WidgetAdded` to new widgets.
pub(crate) fn run_update_tree_pass(root: &mut RenderRoot) {
    let _span = trace_span!("update_tree").entered();
    profile_function!();
    update_widget_tree(&mut root.global, &mut root.arena, root.root_id);
}

// --- Disabled and stashed ---

/// Clear focus and capture state a widget can no longer hold.
fn lose_interaction(global: &mut RenderRootState, arena: &mut WidgetArena, id: WidgetId) {
    if global.next_focused_widget == Some(id) {
        global.next_focused_widget = None;
    }
    global.captures.release_widget(arena, id, true);
    global.needs_pointer_pass = true;
}

fn update_disabled_for_widget(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    parent_disabled: bool,
    force: bool,
) {
    let state = arena.state_mut(id);
    if !force && !state.flags.contains(WidgetFlags::NEEDS_UPDATE_DISABLED) {
        return;
    }
    let disabled = parent_disabled || state.flags.contains(WidgetFlags::EXPLICITLY_DISABLED);
    let changed = disabled != state.is_disabled();
    state.flags.set(WidgetFlags::DISABLED, disabled);
    state.flags.remove(WidgetFlags::NEEDS_UPDATE_DISABLED);

    if changed {
        arena.mark(
            id,
            WidgetFlags::REQUEST_PAINT
                | WidgetFlags::REQUEST_ACCESSIBILITY
                | WidgetFlags::NEEDS_UPDATE_FOCUS_CHAIN,
        );
        if disabled {
            lose_interaction(global, arena, id);
        }
        send_update(global, arena, id, &Update::DisabledChanged(disabled));
    }

    // Read after the update: its handler may have removed children.
    let children = arena.state(id).children.clone();
    for child in children {
        update_disabled_for_widget(global, arena, child, disabled, changed);
    }
    arena.recompute_needs(id, WidgetFlags::NEEDS_UPDATE_DISABLED, WidgetFlags::NONE);
}

pub(crate) fn run_update_disabled_pass(root: &mut RenderRoot) {
    let _span = trace_span!("update_disabled").entered();
    profile_function!();
    update_disabled_for_widget(&mut root.global, &mut root.arena, root.root_id, false, false);
}

fn update_stashed_for_widget(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    parent_stashed: bool,
    force: bool,
) {
    let state = arena.state_mut(id);
    if !force && !state.flags.contains(WidgetFlags::NEEDS_UPDATE_STASHED) {
        return;
    }
    let stashed = parent_stashed || state.flags.contains(WidgetFlags::EXPLICITLY_STASHED);
    let changed = stashed != state.is_stashed();
    state.flags.set(WidgetFlags::STASHED, stashed);
    state.flags.remove(WidgetFlags::NEEDS_UPDATE_STASHED);
    let pending_anim = state.flags & WidgetFlags::REQUEST_ANIM;

    if changed {
        if stashed {
            arena.mark(
                id,
                WidgetFlags::NEEDS_PAINT
                    | WidgetFlags::NEEDS_ACCESSIBILITY
                    | WidgetFlags::NEEDS_UPDATE_FOCUS_CHAIN,
            );
            lose_interaction(global, arena, id);
        } else {
            arena.mark(
                id,
                WidgetFlags::REQUEST_LAYOUT
                    | WidgetFlags::REQUEST_COMPOSE
                    | WidgetFlags::REQUEST_PAINT
                    | WidgetFlags::REQUEST_ACCESSIBILITY
                    | WidgetFlags::NEEDS_UPDATE_FOCUS_CHAIN
                    | pending_anim,
            );
            global.needs_pointer_pass = true;
        }
        send_update(global, arena, id, &Update::StashedChanged(stashed));
    }

    let children = arena.state(id).children.clone();
    for child in children {
        update_stashed_for_widget(global, arena, child, stashed, changed);
    }
    arena.recompute_needs(id, WidgetFlags::NEEDS_UPDATE_STASHED, WidgetFlags::NONE);
}

pub(crate) fn run_update_stashed_pass(root: &mut RenderRoot) {
    let _span = trace_span!("update_stashed").entered();
    profile_function!();
    update_stashed_for_widget(&mut root.global, &mut root.arena, root.root_id, false, false);
}

// --- Focus ---

fn update_focus_chain_for_widget(arena: &mut WidgetArena, id: WidgetId) {
    let state = arena.state(id);
    if !state.flags.contains(WidgetFlags::NEEDS_UPDATE_FOCUS_CHAIN) {
        return;
    }
    let children = state.children.clone();
    for child in &children {
        update_focus_chain_for_widget(arena, *child);
    }

    let mut chain = Vec::new();
    if let Some((widget, state)) = arena.get(id) {
        if !state.is_stashed() {
            if widget.accepts_focus() && !state.is_disabled() {
                chain.push(id);
            }
            for child in &children {
                if let Some(child_state) = arena.try_state(*child) {
                    chain.extend_from_slice(&child_state.focus_chain);
                }
            }
        }
    }

    let state = arena.state_mut(id);
    state.focus_chain = chain;
    state.flags.remove(WidgetFlags::NEEDS_UPDATE_FOCUS_CHAIN);
}

/// Rebuild the tab order of every dirty subtree.
pub(crate) fn run_update_focus_chain_pass(root: &mut RenderRoot) {
    let _span = trace_span!("update_focus_chain").entered();
    profile_function!();
    update_focus_chain_for_widget(&mut root.arena, root.root_id);
}

/// Move focus to `next_focused_widget` if it differs from the current focus.
pub(crate) fn run_update_focus_pass(root: &mut RenderRoot) {
    let global = &mut root.global;
    let arena = &mut root.arena;

    if let Some(next) = global.next_focused_widget {
        let focusable = arena
            .try_state(next)
            .is_some_and(|state| !state.is_disabled() && !state.is_stashed());
        if !focusable {
            debug!("ignoring focus request for {next}");
            global.next_focused_widget = None;
        }
    }
    if !global.has_pending_focus() {
        return;
    }
    let _span = trace_span!("update_focus").entered();
    profile_function!();

    let prev = global.focused_widget;
    let next = global.next_focused_widget;
    let old_path = std::mem::take(&mut global.focused_path);
    let new_path = next.map(|id| arena.path_to_root(id)).unwrap_or_default();
    global.focused_widget = next;
    global.focused_path = new_path.clone();
    debug!("focus {prev:?} -> {next:?}");

    if let Some(prev) = prev.filter(|prev| arena.contains(*prev)) {
        arena
            .state_mut(prev)
            .flags
            .remove(WidgetFlags::FOCUSED_ACTIVE | WidgetFlags::FOCUSED_INACTIVE);
        arena.mark(
            prev,
            WidgetFlags::REQUEST_PAINT | WidgetFlags::REQUEST_ACCESSIBILITY,
        );
        global.captures.release_widget(arena, prev, true);
        send_update(global, arena, prev, &Update::FocusChanged(false));
    }

    let (lost, gained) = path_diff(&old_path, &new_path);
    for id in lost {
        let Some(state) = arena.try_state_mut(id) else {
            continue;
        };
        state.flags.remove(WidgetFlags::HAS_FOCUSED);
        if Some(id) != prev {
            send_update(global, arena, id, &Update::ChildFocusChanged(false));
        }
    }
    for id in gained {
        // An update handler removed the new focus target.
        if global.focused_widget != next {
            break;
        }
        let Some(state) = arena.try_state_mut(id) else {
            continue;
        };
        state.flags.insert(WidgetFlags::HAS_FOCUSED);
        if Some(id) != next {
            send_update(global, arena, id, &Update::ChildFocusChanged(true));
        }
    }

    if let Some(next) = next.filter(|_| global.focused_widget == next) {
        let flag = if global.window_focused {
            WidgetFlags::FOCUSED_ACTIVE
        } else {
            WidgetFlags::FOCUSED_INACTIVE
        };
        arena.state_mut(next).flags.insert(flag);
        arena.mark(
            next,
            WidgetFlags::REQUEST_PAINT | WidgetFlags::REQUEST_ACCESSIBILITY,
        );
        send_update(global, arena, next, &Update::FocusChanged(true));
        if !global.window_focused {
            global.emit_signal(RenderRootSignal::TakeFocus);
        }
    }
}

// --- Scroll ---

/// Deliver `RequestPanToChild` to every ancestor of each scroll request,
/// with the rect converted into that ancestor's coordinates.
pub(crate) fn run_update_scroll_pass(root: &mut RenderRoot) {
    let global = &mut root.global;
    let arena = &mut root.arena;
    if global.scroll_requests.is_empty() {
        return;
    }
    let _span = trace_span!("update_scroll").entered();
    profile_function!();

    let requests = std::mem::take(&mut global.scroll_requests);
    for (target, mut rect) in requests {
        let mut current = target;
        while let Some(parent) = arena.parent_of(current) {
            let Some(state) = arena.try_state(current) else {
                break;
            };
            rect = rect.transform_bbox(state.local_transform());
            send_update(global, arena, parent, &Update::RequestPanToChild(rect));
            current = parent;
        }
    }
}

// --- Pointer ---

/// Deliver pending capture-loss leaves, then recompute the hovered path.
pub(crate) fn run_update_pointer_pass(root: &mut RenderRoot) {
    let root_id = root.root_id;
    let global = &mut root.global;
    let arena = &mut root.arena;
    if !global.needs_pointer_pass && !global.captures.has_pending_leaves() {
        return;
    }
    let _span = trace_span!("update_pointer").entered();
    profile_function!();

    for (widget, info) in global.captures.take_pending_leaves() {
        trace!("{widget} lost pointer {}", info.pointer_id.0);
        send_pointer_event(global, arena, widget, &PointerEvent::Leave(info));
    }

    if !global.needs_pointer_pass {
        return;
    }
    global.needs_pointer_pass = false;

    let hovered = global.last_pointer.and_then(|info| {
        let hit = find_widget_at(arena, root_id, info.position);
        match global.captures.holder(info.pointer_id) {
            // While captured, only the holder can be hovered.
            Some(holder) => hit
                .filter(|hit| *hit == holder || arena.is_ancestor(holder, *hit))
                .map(|_| holder),
            None => hit,
        }
    });

    let prev = global.hovered_widget;
    let new_path = hovered.map(|id| arena.path_to_root(id)).unwrap_or_default();
    if prev == hovered && global.hovered_path == new_path {
        return;
    }
    let old_path = std::mem::replace(&mut global.hovered_path, new_path.clone());
    global.hovered_widget = hovered;
    trace!("hover {prev:?} -> {hovered:?}");

    if prev != hovered {
        if let Some(prev) = prev.filter(|prev| arena.contains(*prev)) {
            arena.state_mut(prev).flags.remove(WidgetFlags::HOVERED);
            arena.mark(prev, WidgetFlags::REQUEST_PAINT);
            send_update(global, arena, prev, &Update::HoveredChanged(false));
        }
    }

    let (lost, gained) = path_diff(&old_path, &new_path);
    for id in lost {
        let Some(state) = arena.try_state_mut(id) else {
            continue;
        };
        state.flags.remove(WidgetFlags::HAS_HOVERED);
        if Some(id) != prev {
            send_update(global, arena, id, &Update::ChildHoveredChanged(false));
        }
    }
    for id in gained {
        let Some(state) = arena.try_state_mut(id) else {
            continue;
        };
        state.flags.insert(WidgetFlags::HAS_HOVERED);
        if Some(id) != hovered {
            send_update(global, arena, id, &Update::ChildHoveredChanged(true));
        }
    }

    if prev != hovered {
        // An update handler may have removed the hovered widget.
        if let Some(hovered) = hovered.filter(|_| global.hovered_widget == hovered) {
            arena.state_mut(hovered).flags.insert(WidgetFlags::HOVERED);
            arena.mark(hovered, WidgetFlags::REQUEST_PAINT);
            send_update(global, arena, hovered, &Update::HoveredChanged(true));
        }
    }
}
