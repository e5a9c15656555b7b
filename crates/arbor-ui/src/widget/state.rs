use crate::access::AccessNode;
use crate::draw_list::Scene;
use crate::flags::WidgetFlags;
use crate::layout::BoxConstraints;
use crate::widget_id::WidgetId;
use arbor_core::geometry::{Rect, Size};
use arbor_core::math::{Affine2, Vec2};

/// Per-widget metadata owned by the arena.
///
/// Geometry is only meaningful between the passes that compute it: `size`
/// after layout, `window_transform` after compose. The state of a widget stays
/// in the arena while its widget is taken out for a pass callback, so
/// contexts can always reach it.
#[derive(Debug)]
pub struct WidgetState {
    pub(crate) id: WidgetId,
    pub(crate) parent: Option<WidgetId>,
    /// Declared children, in the order reported by `children_ids`.
    pub(crate) children: Vec<WidgetId>,

    /// Offset from the parent's origin, set by the parent's `place_child`.
    pub(crate) origin: Vec2,
    pub(crate) size: Size<f32>,
    /// Transform set by the widget itself, applied after `origin`.
    pub(crate) transform: Affine2,
    /// Translation set by the parent during compose (scrolling).
    pub(crate) scroll_translation: Vec2,
    /// Local to window, computed by the compose pass.
    pub(crate) window_transform: Affine2,
    /// Clip for this widget's children, in local coordinates.
    pub(crate) clip: Option<Rect<f32>>,
    pub(crate) layout_constraints: Option<BoxConstraints>,

    /// Focusable widgets of this subtree in tab order.
    pub(crate) focus_chain: Vec<WidgetId>,
    pub(crate) flags: WidgetFlags,

    pub(crate) paint_cache: Scene,
    pub(crate) access_cache: AccessNode,
    pub(crate) debug_name: &'static str,
}

impl WidgetState {
    pub(crate) fn new(id: WidgetId, debug_name: &'static str) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            origin: Vec2::ZERO,
            size: Size::ZERO,
            transform: Affine2::IDENTITY,
            scroll_translation: Vec2::ZERO,
            window_transform: Affine2::IDENTITY,
            clip: None,
            layout_constraints: None,
            focus_chain: Vec::new(),
            flags: WidgetFlags::NEW_WIDGET | WidgetFlags::NEW_WIDGET.propagation_flags(),
            paint_cache: Scene::new(),
            access_cache: AccessNode::default(),
            debug_name,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn size(&self) -> Size<f32> {
        self.size
    }

    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    pub fn window_transform(&self) -> Affine2 {
        self.window_transform
    }

    pub fn scroll_translation(&self) -> Vec2 {
        self.scroll_translation
    }

    pub fn clip(&self) -> Option<Rect<f32>> {
        self.clip
    }

    pub fn focus_chain(&self) -> &[WidgetId] {
        &self.focus_chain
    }

    pub fn debug_name(&self) -> &'static str {
        self.debug_name
    }

    /// Rect in the parent's coordinate space, ignoring transforms.
    pub fn layout_rect(&self) -> Rect<f32> {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Window-space bounding box.
    pub fn window_bounds(&self) -> Rect<f32> {
        self.size.to_rect().transform_bbox(self.window_transform)
    }

    /// Window position of this widget's local origin.
    pub fn window_origin(&self) -> Vec2 {
        self.window_transform.translation
    }

    /// Local-to-parent transform.
    pub(crate) fn local_transform(&self) -> Affine2 {
        Affine2::from_translation(self.origin + self.scroll_translation) * self.transform
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains(WidgetFlags::DISABLED)
    }

    pub fn is_stashed(&self) -> bool {
        self.flags.contains(WidgetFlags::STASHED)
    }

    pub fn is_hovered(&self) -> bool {
        self.flags.contains(WidgetFlags::HOVERED)
    }

    pub fn has_hovered(&self) -> bool {
        self.flags.contains(WidgetFlags::HAS_HOVERED)
    }

    pub fn is_focused(&self) -> bool {
        self.flags.is_focused()
    }

    pub fn has_focused(&self) -> bool {
        self.flags.contains(WidgetFlags::HAS_FOCUSED)
    }

    pub fn has_pointer_capture(&self) -> bool {
        self.flags.contains(WidgetFlags::POINTER_CAPTURED)
    }

    /// Move the widget without going through layout.
    ///
    /// Only reachable through the raw child-state escape hatch; the caller
    /// must request compose on the parent afterwards.
    pub fn set_origin(&mut self, origin: Vec2) {
        if self.origin != origin {
            self.origin = origin;
            self.flags.insert(WidgetFlags::TRANSFORM_CHANGED | WidgetFlags::NEEDS_COMPOSE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_fully_invalidated() {
        let state = WidgetState::new(WidgetId::next(), "Test");
        assert!(state.flags.contains(WidgetFlags::IS_NEW));
        assert!(state.flags.contains(WidgetFlags::NEEDS_LAYOUT));
        assert!(state.flags.contains(WidgetFlags::NEEDS_UPDATE_TREE));
        assert!(state.parent.is_none());
    }

    #[test]
    fn test_local_transform_includes_scroll() {
        let mut state = WidgetState::new(WidgetId::next(), "Test");
        state.origin = Vec2::new(10.0, 20.0);
        state.scroll_translation = Vec2::new(0.0, -5.0);
        let p = state.local_transform().transform_point2(Vec2::ZERO);
        assert_eq!(p, Vec2::new(10.0, 15.0));
    }

    #[test]
    fn test_set_origin_flags_transform() {
        let mut state = WidgetState::new(WidgetId::next(), "Test");
        state.flags = WidgetFlags::NONE;
        state.set_origin(Vec2::new(1.0, 1.0));
        assert!(state.flags.contains(WidgetFlags::TRANSFORM_CHANGED));
        state.flags = WidgetFlags::NONE;
        state.set_origin(Vec2::new(1.0, 1.0));
        assert!(state.flags.is_empty());
    }
}
