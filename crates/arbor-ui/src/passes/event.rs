use crate::contexts::EventCtx;
use crate::event::{AccessAction, AccessEvent, Handled, PointerEvent, PointerId, TextEvent};
use crate::focus::{FocusDirection, next_in_chain};
use crate::render_root::{RenderRoot, RenderRootState};
use crate::widget::{Widget, WidgetArena};
use crate::widget_id::WidgetId;
use arbor_core::math::Vec2;
use arbor_core::profiling::profile_function;
use tracing::{debug, trace, trace_span};

/// Deepest widget under `position` that accepts pointer interaction.
///
/// Stashed subtrees are skipped, clip rects are honored, and later children
/// win over earlier ones since they paint on top.
pub(crate) fn find_widget_at(arena: &WidgetArena, id: WidgetId, position: Vec2) -> Option<WidgetId> {
    let (widget, state) = arena.get(id)?;
    if state.is_stashed() {
        return None;
    }
    let local = state.window_transform.inverse().transform_point2(position);
    if let Some(clip) = state.clip {
        if !clip.contains(local) {
            return None;
        }
    }
    for child in state.children.iter().rev() {
        if let Some(hit) = find_widget_at(arena, *child, position) {
            return Some(hit);
        }
    }
    (widget.accepts_pointer_interaction() && state.size.to_rect().contains(local)).then_some(id)
}

/// Dispatch `event` to `target`, then to each ancestor until handled.
///
/// Disabled widgets are skipped but the event keeps bubbling past them.
fn run_event_pass<E: ?Sized>(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    target: Option<WidgetId>,
    pointer_id: Option<PointerId>,
    event: &E,
    mut pass_fn: impl FnMut(&mut dyn Widget, &mut EventCtx<'_>, &E),
) -> Handled {
    let Some(target) = target else {
        return Handled::No;
    };

    let mut current = Some(target);
    while let Some(id) = current {
        let Some(state) = arena.try_state(id) else {
            break;
        };
        let parent = state.parent;
        if !state.is_disabled() {
            if let Some(mut widget) = arena.take_widget(id) {
                let handled = {
                    let mut ctx = EventCtx {
                        global: &mut *global,
                        arena: &mut *arena,
                        widget_id: id,
                        target,
                        pointer_id,
                        is_handled: false,
                    };
                    pass_fn(&mut *widget, &mut ctx, event);
                    ctx.is_handled
                };
                arena.restore_widget(id, widget);
                if handled {
                    trace!("handled by {id}");
                    return Handled::Yes;
                }
            }
        }
        current = arena.parent_of(id).or(parent);
    }
    Handled::No
}

pub(crate) fn run_on_pointer_event_pass(root: &mut RenderRoot, event: &PointerEvent) -> Handled {
    let _span = trace_span!("pointer_event", kind = event.short_name()).entered();
    profile_function!();

    let root_id = root.root_id;
    let global = &mut root.global;
    let arena = &mut root.arena;
    let info = *event.info();

    if !matches!(event, PointerEvent::Leave(_)) {
        global.last_pointer = Some(info);
    }
    global.captures.update_position(info.pointer_id, info.position);

    let target = match global.captures.holder(info.pointer_id) {
        Some(holder) => Some(holder),
        None if matches!(event, PointerEvent::Leave(_)) => global.hovered_widget,
        None => find_widget_at(arena, root_id, info.position),
    };
    trace!("target {target:?}");

    let handled = run_event_pass(
        global,
        arena,
        target,
        Some(info.pointer_id),
        event,
        |widget, ctx, event| widget.on_pointer_event(ctx, event),
    );

    match event {
        PointerEvent::Up(..) => {
            global.captures.release(arena, info.pointer_id, false);
        }
        PointerEvent::Leave(_) => {
            global.captures.release(arena, info.pointer_id, false);
            global.last_pointer = None;
        }
        PointerEvent::Cancel(_) => {
            global.captures.release(arena, info.pointer_id, true);
            global.last_pointer = None;
        }
        _ => {}
    }
    global.needs_pointer_pass = true;
    handled
}

pub(crate) fn run_on_text_event_pass(root: &mut RenderRoot, event: &TextEvent) -> Handled {
    let _span = trace_span!("text_event").entered();
    profile_function!();

    let root_id = root.root_id;
    let global = &mut root.global;
    let arena = &mut root.arena;
    let target = global.focused_widget;

    let handled = run_event_pass(global, arena, target, None, event, |widget, ctx, event| {
        widget.on_text_event(ctx, event)
    });
    if handled.is_handled() || !root.options.default_tab_navigation {
        return handled;
    }

    let Some(forward) = event.tab_direction() else {
        return handled;
    };
    let chain = &arena.state(root_id).focus_chain;
    let next = next_in_chain(chain, global.focused_widget, FocusDirection::from_forward(forward));
    match next {
        Some(next) => {
            debug!("tab navigation {:?} -> {next}", global.focused_widget);
            global.next_focused_widget = Some(next);
            Handled::Yes
        }
        None => Handled::No,
    }
}

pub(crate) fn run_on_access_event_pass(root: &mut RenderRoot, event: &AccessEvent) -> Handled {
    let _span = trace_span!("access_event", action = ?event.action).entered();
    profile_function!();

    let global = &mut root.global;
    let arena = &mut root.arena;
    if let Some(target) = event.target {
        if !arena.contains(target) {
            trace!("dropping access event for removed widget {target}");
            return Handled::No;
        }
    }
    let target = event.target.or(global.focused_widget);

    let handled = run_event_pass(global, arena, target, None, event, |widget, ctx, event| {
        widget.on_access_event(ctx, event)
    });
    if handled.is_handled() {
        return handled;
    }

    let Some(target) = target else {
        return Handled::No;
    };
    match event.action {
        AccessAction::Focus => {
            global.next_focused_widget = Some(target);
            Handled::Yes
        }
        AccessAction::Blur if global.focused_widget == Some(target) => {
            global.next_focused_widget = None;
            Handled::Yes
        }
        AccessAction::ScrollIntoView => {
            let Some(state) = arena.try_state(target) else {
                return Handled::No;
            };
            let rect = state.size.to_rect();
            global.scroll_requests.push((target, rect));
            Handled::Yes
        }
        _ => Handled::No,
    }
}

/// Deliver a pointer event to one widget without bubbling.
pub(crate) fn send_pointer_event(
    global: &mut RenderRootState,
    arena: &mut WidgetArena,
    id: WidgetId,
    event: &PointerEvent,
) {
    // Disabled holders still hear that they lost the pointer.
    if !arena.contains(id) {
        return;
    }
    let Some(mut widget) = arena.take_widget(id) else {
        return;
    };
    {
        let mut ctx = EventCtx {
            global: &mut *global,
            arena: &mut *arena,
            widget_id: id,
            target: id,
            pointer_id: None,
            is_handled: false,
        };
        widget.on_pointer_event(&mut ctx, event);
    }
    arena.restore_widget(id, widget);
}
