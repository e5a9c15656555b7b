use super::{FromDynWidget, Widget, WidgetState};
use crate::contexts::QueryCtx;
use crate::widget_id::WidgetId;
use std::ops::Deref;

/// Read-only view of a widget and its state, usable outside passes.
///
/// Hosts and tests get one from `RenderRoot::get_widget`.
pub struct WidgetRef<'a, W: Widget + ?Sized> {
    pub(crate) ctx: QueryCtx<'a>,
    pub(crate) widget: &'a W,
}

impl<W: Widget + ?Sized> Clone for WidgetRef<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: Widget + ?Sized> Copy for WidgetRef<'_, W> {}

impl<'a, W: Widget + ?Sized> WidgetRef<'a, W> {
    pub fn ctx(&self) -> &QueryCtx<'a> {
        &self.ctx
    }

    pub fn id(&self) -> WidgetId {
        self.ctx.widget_id()
    }

    pub fn state(&self) -> &'a WidgetState {
        self.ctx.state()
    }

    pub fn inner(&self) -> &'a W {
        self.widget
    }

    /// Children in declared order. Children checked out by a running pass are
    /// skipped.
    pub fn children(&self) -> Vec<WidgetRef<'a, dyn Widget>> {
        self.ctx
            .state()
            .children
            .iter()
            .filter_map(|child| self.ctx.child_ref(*child))
            .collect()
    }

    pub fn downcast<W2: Widget + FromDynWidget + ?Sized>(&self) -> Option<WidgetRef<'a, W2>> {
        let widget = W2::from_dyn(self.widget.as_dyn())?;
        Some(WidgetRef {
            ctx: self.ctx,
            widget,
        })
    }

    /// Depth-first search of this subtree, this widget included.
    pub fn find_widget_by_id(&self, id: WidgetId) -> Option<WidgetRef<'a, dyn Widget>> {
        if !self.ctx.arena.is_ancestor(self.id(), id) && id != self.id() {
            return None;
        }
        self.ctx.child_ref(id)
    }
}

impl<W: Widget + ?Sized> Deref for WidgetRef<'_, W> {
    type Target = W;

    fn deref(&self) -> &Self::Target {
        self.widget
    }
}

impl<W: Widget + ?Sized> std::fmt::Debug for WidgetRef<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.ctx.state();
        f.debug_struct(state.debug_name)
            .field("id", &state.id)
            .field("size", &state.size)
            .field("flags", &state.flags)
            .finish()
    }
}
