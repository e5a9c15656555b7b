//! Arena storage for every widget of a render root.
//!
//! Widgets do not own their children. A parent holds [`WidgetPod`]s, which
//! are keys into this arena once the child is inserted, and the arena owns
//! both the widget and its [`WidgetState`].
//!
//! [`WidgetPod`]: super::WidgetPod

use super::{Widget, WidgetState};
use crate::debug::debug_panic;
use crate::flags::WidgetFlags;
use crate::widget_id::WidgetId;
use arbor_core::alloc::RandomState;
use indexmap::IndexMap;
use thiserror::Error;

/// Errors detected by structural arena operations.
///
/// These are logic errors in widget code. Callers route them through
/// `debug_panic!` instead of handing them to the reactive layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("widget {0} is not in the arena")]
    NotFound(WidgetId),
    #[error("widget {0} was inserted twice")]
    AlreadyInserted(WidgetId),
    #[error("widget {child} already has parent {parent}")]
    AlreadyParented { child: WidgetId, parent: WidgetId },
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { child: WidgetId, parent: WidgetId },
    #[error("widget {0} is checked out by a running pass")]
    CheckedOut(WidgetId),
}

/// Entry in the arena.
struct WidgetNode {
    /// `None` while a pass has the widget checked out.
    widget: Option<Box<dyn Widget>>,
    state: WidgetState,
}

/// Storage for every widget of one render root.
///
/// # Borrow Checking Pattern: Check-Out Slots
///
/// A pass visiting a widget takes the widget's box out of its slot with
/// [`take_widget`](Self::take_widget) and puts it back with
/// [`restore_widget`](Self::restore_widget). While it is out, the pass can hand
/// a context holding `&mut WidgetArena` to the widget's callback:
///
/// - the callback owns `&mut self` for its widget
/// - the context reaches the widget's state and every other widget through
///   the arena
/// - nothing can reach the checked-out widget through the arena
///
/// so there are never two mutable paths to the same widget.
///
/// # Example
///
/// ```rust,ignore
/// let mut widget = arena.take_widget(id)?;
/// let mut ctx = LayoutCtx { global, arena: &mut arena, widget_id: id };
/// let size = widget.layout(&mut ctx, &bc);
/// arena.restore_widget(id, widget);
/// ```
#[derive(Default)]
pub struct WidgetArena {
    nodes: IndexMap<WidgetId, WidgetNode, RandomState>,
}

impl WidgetArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ids in arena order. Removals may reorder the remaining ids.
    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.nodes.keys().copied()
    }

    /// Add an unlinked widget under an id allocated by its pod.
    pub fn insert(&mut self, id: WidgetId, widget: Box<dyn Widget>) -> WidgetId {
        if self.nodes.contains_key(&id) {
            debug_panic!("{}", ArenaError::AlreadyInserted(id));
            return id;
        }
        let state = WidgetState::new(id, widget.short_type_name());
        tracing::trace!("insert {} {id}", state.debug_name);
        self.nodes.insert(
            id,
            WidgetNode {
                widget: Some(widget),
                state,
            },
        );
        id
    }

    /// Link `child` under `parent`.
    ///
    /// Only the parent link is written; the parent's child list is rebuilt
    /// from `children_ids` by the registration pass. The child's pending
    /// work is propagated to its new ancestors.
    pub fn try_attach(&mut self, child: WidgetId, parent: WidgetId) -> Result<(), ArenaError> {
        let child_state = self.try_state(child).ok_or(ArenaError::NotFound(child))?;
        if let Some(existing) = child_state.parent {
            return Err(ArenaError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if !self.contains(parent) {
            return Err(ArenaError::NotFound(parent));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(ArenaError::Cycle { child, parent });
        }

        let pending = child_state.flags.propagation_flags();
        self.state_mut(child).parent = Some(parent);
        self.mark(parent, pending);
        Ok(())
    }

    /// Like [`try_attach`](Self::try_attach), treating failure as a logic error.
    pub fn attach(&mut self, child: WidgetId, parent: WidgetId) {
        if let Err(err) = self.try_attach(child, parent) {
            debug_panic!("{err}");
        }
    }

    /// Remove `id` and its whole subtree, returning every removed id.
    ///
    /// The parent's child list is updated. Focus, capture and hover references
    /// live outside the arena and must be cleared by the caller.
    pub fn try_remove(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, ArenaError> {
        let state = self.try_state(id).ok_or(ArenaError::NotFound(id))?;
        let parent = state.parent;

        let mut subtree = vec![id];
        let mut cursor = 0;
        while cursor < subtree.len() {
            let current = subtree[cursor];
            let node = self
                .nodes
                .get(&current)
                .ok_or(ArenaError::NotFound(current))?;
            if node.widget.is_none() {
                return Err(ArenaError::CheckedOut(current));
            }
            subtree.extend(node.state.children.iter().copied());
            cursor += 1;
        }

        for removed in &subtree {
            self.nodes.swap_remove(removed);
        }
        if let Some(parent_state) = parent.and_then(|parent| self.try_state_mut(parent)) {
            parent_state.children.retain(|child| *child != id);
        }
        tracing::trace!("removed {id} and {} descendants", subtree.len() - 1);
        Ok(subtree)
    }

    /// Like [`try_remove`](Self::try_remove), treating failure as a logic error.
    pub fn remove(&mut self, id: WidgetId) -> Vec<WidgetId> {
        match self.try_remove(id) {
            Ok(removed) => removed,
            Err(err) => {
                debug_panic!("{err}");
                Vec::new()
            }
        }
    }

    /// Widget and state, if the widget is present and not checked out.
    pub fn get(&self, id: WidgetId) -> Option<(&(dyn Widget + 'static), &WidgetState)> {
        let node = self.nodes.get(&id)?;
        let widget = node.widget.as_deref()?;
        Some((widget, &node.state))
    }

    pub fn get_mut(
        &mut self,
        id: WidgetId,
    ) -> Option<(&mut (dyn Widget + 'static), &mut WidgetState)> {
        let node = self.nodes.get_mut(&id)?;
        let widget = node.widget.as_deref_mut()?;
        Some((widget, &mut node.state))
    }

    pub fn try_state(&self, id: WidgetId) -> Option<&WidgetState> {
        self.nodes.get(&id).map(|node| &node.state)
    }

    pub fn try_state_mut(&mut self, id: WidgetId) -> Option<&mut WidgetState> {
        self.nodes.get_mut(&id).map(|node| &mut node.state)
    }

    /// State of a widget the caller knows to be live.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the arena. Passes only call this with ids
    /// taken from the tree itself.
    pub fn state(&self, id: WidgetId) -> &WidgetState {
        match self.try_state(id) {
            Some(state) => state,
            None => panic!("{}", ArenaError::NotFound(id)),
        }
    }

    /// Mutable counterpart of [`state`](Self::state).
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the arena.
    pub fn state_mut(&mut self, id: WidgetId) -> &mut WidgetState {
        match self.try_state_mut(id) {
            Some(state) => state,
            None => panic!("{}", ArenaError::NotFound(id)),
        }
    }

    /// Check a widget out of its slot.
    pub fn take_widget(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        let taken = self.nodes.get_mut(&id)?.widget.take();
        if taken.is_none() {
            debug_panic!("{}", ArenaError::CheckedOut(id));
        }
        taken
    }

    /// Return a widget checked out with [`take_widget`](Self::take_widget).
    pub fn restore_widget(&mut self, id: WidgetId, widget: Box<dyn Widget>) {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                debug_assert!(node.widget.is_none(), "widget {id} restored twice");
                node.widget = Some(widget);
            }
            // Removed while checked out; the box is dropped here.
            None => tracing::trace!("dropping widget {id} removed during its own pass"),
        }
    }

    pub fn parent_of(&self, id: WidgetId) -> Option<WidgetId> {
        self.try_state(id).and_then(|state| state.parent)
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn path_to_root(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut path = Vec::new();
        let mut current = self.contains(id).then_some(id);
        while let Some(node) = current {
            path.push(node);
            current = self.parent_of(node);
        }
        path
    }

    /// Set `flags` on a widget and propagate the implied subtree flags to its
    /// ancestors.
    ///
    /// Stops early at the first ancestor that already carries every
    /// propagated flag, since its own ancestors must carry them too.
    pub fn mark(&mut self, id: WidgetId, flags: WidgetFlags) {
        let propagate = flags.propagation_flags();
        let Some(state) = self.try_state_mut(id) else {
            tracing::trace!("ignoring {flags:?} for removed widget {id}");
            return;
        };
        state.flags |= flags | propagate;
        if propagate.is_empty() {
            return;
        }

        let mut current = state.parent;
        while let Some(parent) = current {
            let Some(parent_state) = self.try_state_mut(parent) else {
                break;
            };
            if parent_state.flags.contains(propagate) {
                break;
            }
            parent_state.flags |= propagate;
            current = parent_state.parent;
        }
    }

    /// Set `needs` on `id` if it carries `request` or any child carries
    /// `needs`, clear it otherwise.
    ///
    /// Passes call this after visiting a subtree so that work re-requested
    /// during the visit stays visible from the root.
    pub(crate) fn recompute_needs(&mut self, id: WidgetId, needs: WidgetFlags, request: WidgetFlags) {
        let Some(state) = self.try_state(id) else {
            return;
        };
        let mut pending = !request.is_empty() && state.flags.intersects(request);
        if !pending {
            pending = state
                .children
                .iter()
                .filter_map(|child| self.try_state(*child))
                .any(|child| child.flags.intersects(needs));
        }
        self.state_mut(id).flags.set(needs, pending);
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
    fn test_attach_rejects_second_parent() {
        let (mut arena, ids) = arena_with(3);
        arena.try_attach(ids[1], ids[0]).unwrap();
        assert_eq!(
            arena.try_attach(ids[1], ids[2]),
            Err(ArenaError::AlreadyParented {
                child: ids[1],
                parent: ids[0]
            })
        );
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let (mut arena, ids) = arena_with(2);
        arena.try_attach(ids[1], ids[0]).unwrap();
        assert_eq!(
            arena.try_attach(ids[0], ids[1]),
            Err(ArenaError::Cycle {
                child: ids[0],
                parent: ids[1]
            })
        );
        assert!(matches!(
            arena.try_attach(ids[0], ids[0]),
            Err(ArenaError::Cycle { .. })
        ));
    }

    #[test]
    fn test_remove_cascades() {
        let (mut arena, ids) = arena_with(4);
        arena.try_attach(ids[1], ids[0]).unwrap();
        arena.try_attach(ids[2], ids[1]).unwrap();
        arena.try_attach(ids[3], ids[0]).unwrap();
        arena.state_mut(ids[0]).children = vec![ids[1], ids[3]];
        arena.state_mut(ids[1]).children = vec![ids[2]];

        let removed = arena.try_remove(ids[1]).unwrap();
        assert_eq!(removed, vec![ids[1], ids[2]]);
        assert!(!arena.contains(ids[1]));
        assert!(!arena.contains(ids[2]));
        assert_eq!(arena.state(ids[0]).children, vec![ids[3]]);
        assert_eq!(arena.try_remove(ids[1]), Err(ArenaError::NotFound(ids[1])));
    }

    #[test]
    fn test_mark_propagates_until_already_set() {
        let (mut arena, ids) = arena_with(3);
        arena.try_attach(ids[1], ids[0]).unwrap();
        arena.try_attach(ids[2], ids[1]).unwrap();
        for id in &ids {
            arena.state_mut(*id).flags = WidgetFlags::NONE;
        }

        arena.mark(ids[2], WidgetFlags::REQUEST_PAINT);
        assert!(arena.state(ids[2]).flags.contains(WidgetFlags::REQUEST_PAINT));
        assert!(arena.state(ids[1]).flags.contains(WidgetFlags::NEEDS_PAINT));
        assert!(!arena.state(ids[1]).flags.contains(WidgetFlags::REQUEST_PAINT));
        assert!(arena.state(ids[0]).flags.contains(WidgetFlags::NEEDS_PAINT));
    }

    #[test]
    fn test_checked_out_widget_is_invisible() {
        let (mut arena, ids) = arena_with(1);
        let widget = arena.take_widget(ids[0]).unwrap();
        assert!(arena.get(ids[0]).is_none());
        assert!(arena.try_state(ids[0]).is_some());
        arena.restore_widget(ids[0], widget);
        assert!(arena.get(ids[0]).is_some());
    }

    #[test]
    fn test_path_to_root() {
        let (mut arena, ids) = arena_with(3);
        arena.try_attach(ids[1], ids[0]).unwrap();
        arena.try_attach(ids[2], ids[1]).unwrap();
        assert_eq!(arena.path_to_root(ids[2]), vec![ids[2], ids[1], ids[0]]);
        assert!(arena.is_ancestor(ids[0], ids[2]));
        assert!(!arena.is_ancestor(ids[2], ids[0]));
    }
}
