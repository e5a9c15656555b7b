//! Pointer capture bookkeeping.
//!
//! At most one widget holds capture for a given pointer. Releases that
//! should tell the holder it lost the pointer queue a synthetic
//! [`PointerEvent::Leave`](crate::event::PointerEvent::Leave), delivered at the
//! start of the next pointer pass if the holder still exists.

use crate::event::{PointerId, PointerInfo};
use crate::flags::WidgetFlags;
use crate::widget::WidgetArena;
use crate::widget_id::WidgetId;
use arbor_core::math::Vec2;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Capture {
    widget: WidgetId,
    /// Last window position routed to the holder.
    position: Vec2,
}

#[derive(Debug, Default)]
pub(crate) struct PointerCaptures {
    holders: IndexMap<PointerId, Capture>,
    pending_leaves: Vec<(WidgetId, PointerInfo)>,
}

impl PointerCaptures {
    pub(crate) fn holder(&self, pointer_id: PointerId) -> Option<WidgetId> {
        self.holders.get(&pointer_id).map(|capture| capture.widget)
    }

    pub(crate) fn is_held_by(&self, widget: WidgetId) -> bool {
        self.holders.values().any(|capture| capture.widget == widget)
    }

    /// Give `pointer_id` to `widget`. A different previous holder is released
    /// with a leave notification. Returns that previous holder.
    pub(crate) fn acquire(
        &mut self,
        arena: &mut WidgetArena,
        pointer_id: PointerId,
        widget: WidgetId,
        position: Vec2,
    ) -> Option<WidgetId> {
        let previous = self.holder(pointer_id).filter(|holder| *holder != widget);
        if previous.is_some() {
            self.release(arena, pointer_id, true);
        }
        self.holders.insert(pointer_id, Capture { widget, position });
        if let Some(state) = arena.try_state_mut(widget) {
            state.flags.insert(WidgetFlags::POINTER_CAPTURED);
        }
        tracing::debug!("{widget} captured pointer {}", pointer_id.0);
        previous
    }

    pub(crate) fn update_position(&mut self, pointer_id: PointerId, position: Vec2) {
        if let Some(capture) = self.holders.get_mut(&pointer_id) {
            capture.position = position;
        }
    }

    /// Release `pointer_id`, optionally queueing a leave for the holder.
    pub(crate) fn release(
        &mut self,
        arena: &mut WidgetArena,
        pointer_id: PointerId,
        notify: bool,
    ) -> Option<WidgetId> {
        let capture = self.holders.shift_remove(&pointer_id)?;
        if !self.is_held_by(capture.widget) {
            if let Some(state) = arena.try_state_mut(capture.widget) {
                state.flags.remove(WidgetFlags::POINTER_CAPTURED);
            }
        }
        if notify && arena.contains(capture.widget) {
            self.pending_leaves.push((
                capture.widget,
                PointerInfo {
                    pointer_id,
                    position: capture.position,
                },
            ));
        }
        tracing::debug!("{} released pointer {} (notify: {notify})", capture.widget, pointer_id.0);
        Some(capture.widget)
    }

    /// Release every pointer held by `widget`.
    pub(crate) fn release_widget(&mut self, arena: &mut WidgetArena, widget: WidgetId, notify: bool) {
        let pointers: Vec<PointerId> = self
            .holders
            .iter()
            .filter(|(_, capture)| capture.widget == widget)
            .map(|(pointer_id, _)| *pointer_id)
            .collect();
        for pointer_id in pointers {
            self.release(arena, pointer_id, notify);
        }
    }

    pub(crate) fn release_all(&mut self, arena: &mut WidgetArena, notify: bool) {
        let pointers: Vec<PointerId> = self.holders.keys().copied().collect();
        for pointer_id in pointers {
            self.release(arena, pointer_id, notify);
        }
    }

    /// Drop captures and pending leaves that reference removed widgets.
    pub(crate) fn forget(&mut self, removed: &[WidgetId]) {
        self.holders.retain(|pointer_id, capture| {
            let keep = !removed.contains(&capture.widget);
            if !keep {
                tracing::trace!("dropping capture of pointer {} by removed {}", pointer_id.0, capture.widget);
            }
            keep
        });
        self.pending_leaves
            .retain(|(widget, _)| !removed.contains(widget));
    }

    pub(crate) fn has_pending_leaves(&self) -> bool {
        !self.pending_leaves.is_empty()
    }

    pub(crate) fn take_pending_leaves(&mut self) -> Vec<(WidgetId, PointerInfo)> {
        std::mem::take(&mut self.pending_leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Label;

    fn arena_with(n: usize) -> (WidgetArena, Vec<WidgetId>) {
        let mut arena = WidgetArena::new();
        let ids = (0..n)
            .map(|_| arena.insert(WidgetId::next(), Box::new(Label::new("x"))))
            .collect();
        (arena, ids)
    }

    #[test]
    fn test_acquire_releases_previous_holder() {
        let (mut arena, ids) = arena_with(2);
        let mut captures = PointerCaptures::default();

        assert_eq!(captures.acquire(&mut arena, PointerId::PRIMARY, ids[0], Vec2::ZERO), None);
        assert!(arena.state(ids[0]).has_pointer_capture());

        let previous = captures.acquire(&mut arena, PointerId::PRIMARY, ids[1], Vec2::ONE);
        assert_eq!(previous, Some(ids[0]));
        assert_eq!(captures.holder(PointerId::PRIMARY), Some(ids[1]));
        assert!(!arena.state(ids[0]).has_pointer_capture());
        assert!(arena.state(ids[1]).has_pointer_capture());

        let leaves = captures.take_pending_leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0, ids[0]);
    }

    #[test]
    fn test_reacquire_by_holder_is_silent() {
        let (mut arena, ids) = arena_with(1);
        let mut captures = PointerCaptures::default();
        captures.acquire(&mut arena, PointerId::PRIMARY, ids[0], Vec2::ZERO);
        assert_eq!(captures.acquire(&mut arena, PointerId::PRIMARY, ids[0], Vec2::ZERO), None);
        assert!(!captures.has_pending_leaves());
    }

    #[test]
    fn test_pointers_are_independent() {
        let (mut arena, ids) = arena_with(2);
        let mut captures = PointerCaptures::default();
        captures.acquire(&mut arena, PointerId(1), ids[0], Vec2::ZERO);
        captures.acquire(&mut arena, PointerId(2), ids[1], Vec2::ZERO);
        assert_eq!(captures.holder(PointerId(1)), Some(ids[0]));
        assert_eq!(captures.holder(PointerId(2)), Some(ids[1]));

        captures.release_all(&mut arena, false);
        assert!(captures.holder(PointerId(1)).is_none());
        assert!(!captures.has_pending_leaves());
    }

    #[test]
    fn test_forget_drops_silently() {
        let (mut arena, ids) = arena_with(1);
        let mut captures = PointerCaptures::default();
        captures.acquire(&mut arena, PointerId::PRIMARY, ids[0], Vec2::ZERO);
        captures.forget(&ids);
        assert!(captures.holder(PointerId::PRIMARY).is_none());
        assert!(!captures.has_pending_leaves());
    }
}
