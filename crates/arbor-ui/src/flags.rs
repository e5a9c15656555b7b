//! Per-widget invalidation and status flags.

use bitflags::bitflags;

bitflags! {
    /// Invalidation and status bits stored in every [`WidgetState`].
    ///
    /// Invalidation comes in pairs: a `REQUEST_*` bit on the widget that asked
    /// for the work, and a `NEEDS_*` bit on that widget and every ancestor, so
    /// passes can skip clean subtrees without visiting them.
    ///
    /// [`WidgetState`]: crate::widget::WidgetState
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WidgetFlags: u32 {
        /// No flags set
        const NONE                     = 0;

        // Invalidation (bits 0-15)

        /// This widget's own layout is stale.
        const REQUEST_LAYOUT           = 1 << 0;
        /// This widget or a descendant needs layout.
        const NEEDS_LAYOUT             = 1 << 1;
        /// This widget wants its compose callback run.
        const REQUEST_COMPOSE          = 1 << 2;
        /// This widget or a descendant needs compose.
        const NEEDS_COMPOSE            = 1 << 3;
        /// This widget must be repainted.
        const REQUEST_PAINT            = 1 << 4;
        /// This widget or a descendant must be repainted.
        const NEEDS_PAINT              = 1 << 5;
        /// This widget's accessibility node is stale.
        const REQUEST_ACCESSIBILITY    = 1 << 6;
        /// This widget or a descendant has a stale accessibility node.
        const NEEDS_ACCESSIBILITY      = 1 << 7;
        /// This widget wants an animation frame.
        const REQUEST_ANIM             = 1 << 8;
        /// This widget or a descendant wants an animation frame.
        const NEEDS_ANIM               = 1 << 9;
        /// Children were added or removed; registration must run.
        const CHILDREN_CHANGED         = 1 << 10;
        /// This widget or a descendant needs tree registration.
        const NEEDS_UPDATE_TREE        = 1 << 11;
        const NEEDS_UPDATE_DISABLED    = 1 << 12;
        const NEEDS_UPDATE_STASHED     = 1 << 13;
        const NEEDS_UPDATE_FOCUS_CHAIN = 1 << 14;
        /// Origin, scroll translation or local transform changed since the
        /// last compose pass.
        const TRANSFORM_CHANGED        = 1 << 15;

        // Status (bits 16-27)

        /// Pointer is directly over this widget.
        const HOVERED                  = 1 << 16;
        /// Pointer is over this widget or a descendant.
        const HAS_HOVERED              = 1 << 17;
        const POINTER_CAPTURED         = 1 << 18;
        /// Focused while the window has input focus.
        const FOCUSED_ACTIVE           = 1 << 19;
        /// Focused while the window does not have input focus.
        const FOCUSED_INACTIVE         = 1 << 20;
        /// This widget or a descendant has focus.
        const HAS_FOCUSED              = 1 << 21;
        /// Effective disabled state (self or an ancestor).
        const DISABLED                 = 1 << 22;
        const EXPLICITLY_DISABLED      = 1 << 23;
        /// Effective stashed state (self or an ancestor).
        const STASHED                  = 1 << 24;
        const EXPLICITLY_STASHED       = 1 << 25;
        /// Inserted but `WidgetAdded` not yet delivered.
        const IS_NEW                   = 1 << 26;

        // Per-pass bookkeeping (bits 28-29)

        /// `run_layout` was called on this widget during its parent's layout.
        const LAID_OUT                 = 1 << 28;
        /// `place_child` was called on this widget during its parent's layout.
        const PLACED                   = 1 << 29;
    }
}

impl WidgetFlags {
    /// Flags summarizing a subtree; these are the ones copied onto ancestors.
    pub const SUBTREE_GROUP: Self = Self::NEEDS_LAYOUT
        .union(Self::NEEDS_COMPOSE)
        .union(Self::NEEDS_PAINT)
        .union(Self::NEEDS_ACCESSIBILITY)
        .union(Self::NEEDS_ANIM)
        .union(Self::NEEDS_UPDATE_TREE)
        .union(Self::NEEDS_UPDATE_DISABLED)
        .union(Self::NEEDS_UPDATE_STASHED)
        .union(Self::NEEDS_UPDATE_FOCUS_CHAIN);

    /// Flags a freshly inserted widget starts with.
    pub const NEW_WIDGET: Self = Self::IS_NEW
        .union(Self::CHILDREN_CHANGED)
        .union(Self::REQUEST_LAYOUT)
        .union(Self::REQUEST_COMPOSE)
        .union(Self::TRANSFORM_CHANGED)
        .union(Self::REQUEST_PAINT)
        .union(Self::REQUEST_ACCESSIBILITY)
        .union(Self::NEEDS_UPDATE_DISABLED)
        .union(Self::NEEDS_UPDATE_STASHED)
        .union(Self::NEEDS_UPDATE_FOCUS_CHAIN);

    /// Flags on the root that mean the rewrite passes have work to do.
    pub const REWRITE_GROUP: Self = Self::NEEDS_UPDATE_TREE
        .union(Self::NEEDS_UPDATE_DISABLED)
        .union(Self::NEEDS_UPDATE_STASHED)
        .union(Self::NEEDS_UPDATE_FOCUS_CHAIN)
        .union(Self::NEEDS_LAYOUT)
        .union(Self::NEEDS_COMPOSE);

    /// Flags on the root that mean a redraw is due.
    pub const RENDER_GROUP: Self = Self::NEEDS_PAINT.union(Self::NEEDS_ACCESSIBILITY);

    /// Subtree flags implied by these flags, to be set on this widget and
    /// its ancestors.
    #[inline]
    pub fn propagation_flags(&self) -> Self {
        let mut out = *self & Self::SUBTREE_GROUP;
        if self.contains(Self::REQUEST_LAYOUT) {
            out |= Self::NEEDS_LAYOUT;
        }
        if self.intersects(Self::REQUEST_COMPOSE | Self::TRANSFORM_CHANGED) {
            out |= Self::NEEDS_COMPOSE;
        }
        if self.contains(Self::REQUEST_PAINT) {
            out |= Self::NEEDS_PAINT;
        }
        if self.contains(Self::REQUEST_ACCESSIBILITY) {
            out |= Self::NEEDS_ACCESSIBILITY;
        }
        if self.contains(Self::REQUEST_ANIM) {
            out |= Self::NEEDS_ANIM;
        }
        if self.contains(Self::CHILDREN_CHANGED) {
            out |= Self::NEEDS_UPDATE_TREE;
        }
        out
    }

    /// Returns true if the widget has focus, active or not.
    #[inline]
    pub fn is_focused(&self) -> bool {
        self.intersects(Self::FOCUSED_ACTIVE | Self::FOCUSED_INACTIVE)
    }

    /// Returns true if the rewrite passes would do anything for this subtree.
    #[inline]
    pub fn needs_rewrite(&self) -> bool {
        self.intersects(Self::REWRITE_GROUP)
    }

    /// Returns true if this subtree has paint or accessibility work pending.
    #[inline]
    pub fn needs_render(&self) -> bool {
        self.intersects(Self::RENDER_GROUP)
    }
}

impl Default for WidgetFlags {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_maps_to_needs() {
        assert_eq!(
            WidgetFlags::REQUEST_LAYOUT.propagation_flags(),
            WidgetFlags::NEEDS_LAYOUT
        );
        assert_eq!(
            WidgetFlags::TRANSFORM_CHANGED.propagation_flags(),
            WidgetFlags::NEEDS_COMPOSE
        );
        assert_eq!(
            WidgetFlags::CHILDREN_CHANGED.propagation_flags(),
            WidgetFlags::NEEDS_UPDATE_TREE
        );
    }

    #[test]
    fn test_status_flags_do_not_propagate() {
        let flags = WidgetFlags::HOVERED | WidgetFlags::DISABLED | WidgetFlags::FOCUSED_ACTIVE;
        assert!(flags.propagation_flags().is_empty());
    }

    #[test]
    fn test_new_widget_needs_everything() {
        let propagated = WidgetFlags::NEW_WIDGET.propagation_flags();
        assert!(propagated.needs_rewrite());
        assert!(propagated.needs_render());
        assert!(propagated.contains(WidgetFlags::NEEDS_UPDATE_FOCUS_CHAIN));
    }

    #[test]
    fn test_focus_states() {
        assert!(WidgetFlags::FOCUSED_ACTIVE.is_focused());
        assert!(WidgetFlags::FOCUSED_INACTIVE.is_focused());
        assert!(!WidgetFlags::HAS_FOCUSED.is_focused());
    }
}
