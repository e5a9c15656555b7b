//! Child handles held by parent widgets.

use super::Widget;
use crate::widget_id::WidgetId;

/// A parent's handle to one of its children.
///
/// # Ownership Pattern: One-Way Handle
///
/// A freshly created pod embeds its widget, so a parent can build children
/// before they are part of any tree. During tree registration the widget
/// moves into the arena and the pod keeps only the [`WidgetId`]; from then on
/// every access goes through a context. The transition never goes back.
///
/// The id is allocated when the pod is created, so the parent can report it
/// from `children_ids` right away.
///
/// # Example
///
/// ```rust,ignore
/// let pod = WidgetPod::new(Label::new("hello"));
/// let id = pod.id();
/// // after registration the label lives in the arena:
/// ctx.register_child(&mut pod);
/// assert!(pod.is_inserted());
/// ```
pub struct WidgetPod<W: Widget + ?Sized> {
    id: WidgetId,
    inner: WidgetPodInner<W>,
}

enum WidgetPodInner<W: ?Sized> {
    Created(Box<W>),
    Inserted,
}

impl<W: Widget> WidgetPod<W> {
    pub fn new(inner: W) -> Self {
        Self::new_from_box(Box::new(inner))
    }
}

impl<W: Widget + ?Sized> WidgetPod<W> {
    pub fn new_from_box(inner: Box<W>) -> Self {
        Self {
            id: WidgetId::next(),
            inner: WidgetPodInner::Created(inner),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Returns true once the widget has moved into the arena.
    pub fn is_inserted(&self) -> bool {
        matches!(self.inner, WidgetPodInner::Inserted)
    }

    /// Take the embedded widget, leaving the pod in the inserted state.
    pub(crate) fn take_inner(&mut self) -> Option<Box<W>> {
        match std::mem::replace(&mut self.inner, WidgetPodInner::Inserted) {
            WidgetPodInner::Created(widget) => Some(widget),
            WidgetPodInner::Inserted => None,
        }
    }

    /// Erase the widget type, keeping the id.
    pub fn erased(self) -> WidgetPod<dyn Widget> {
        let inner = match self.inner {
            WidgetPodInner::Created(widget) => WidgetPodInner::Created(widget.as_box_dyn()),
            WidgetPodInner::Inserted => WidgetPodInner::Inserted,
        };
        WidgetPod { id: self.id, inner }
    }
}

impl<W: Widget + ?Sized> std::fmt::Debug for WidgetPod<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetPod")
            .field("id", &self.id)
            .field("inserted", &self.is_inserted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Label;

    #[test]
    fn test_take_inner_is_one_way() {
        let mut pod = WidgetPod::new(Label::new("a"));
        let id = pod.id();
        assert!(!pod.is_inserted());
        assert!(pod.take_inner().is_some());
        assert!(pod.is_inserted());
        assert!(pod.take_inner().is_none());
        assert_eq!(pod.id(), id);
    }

    #[test]
    fn test_erased_keeps_id() {
        let pod = WidgetPod::new(Label::new("a"));
        let id = pod.id();
        let erased = pod.erased();
        assert_eq!(erased.id(), id);
        assert!(!erased.is_inserted());
    }
}
