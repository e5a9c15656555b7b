//! Accessibility tree exported by the accessibility pass.

use crate::widget_id::WidgetId;
use arbor_core::geometry::Rect;
use bitflags::bitflags;
use indexmap::IndexMap;

/// Semantic role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    GenericContainer,
    Window,
    Label,
    Button,
    TextInput,
    ScrollView,
}

bitflags! {
    /// State bits filled in by the engine from the widget's status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u8 {
        const FOCUSABLE = 1 << 0;
        const FOCUSED   = 1 << 1;
        const DISABLED  = 1 << 2;
        const HOVERED   = 1 << 3;
    }
}

/// One accessibility node.
///
/// Widgets fill in the descriptive part (`label`, `value`); the engine owns
/// `id`, `role`, `bounds`, `children` and `flags`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessNode {
    pub id: Option<WidgetId>,
    pub role: Role,
    pub label: Option<String>,
    pub value: Option<String>,
    /// Window-space bounding box
    pub bounds: Rect<f32>,
    pub children: Vec<WidgetId>,
    pub flags: AccessFlags,
}

impl AccessNode {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }
}

/// Accessibility snapshot of the visible tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessTree {
    pub root: Option<WidgetId>,
    pub focus: Option<WidgetId>,
    /// Nodes in depth-first pre-order.
    pub nodes: IndexMap<WidgetId, AccessNode>,
}

impl AccessTree {
    pub fn get(&self, id: WidgetId) -> Option<&AccessNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node whose label equals `label`.
    pub fn find_by_label(&self, label: &str) -> Option<&AccessNode> {
        self.nodes
            .values()
            .find(|node| node.label.as_deref() == Some(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_label() {
        let id = WidgetId::next();
        let mut node = AccessNode::new(Role::Button);
        node.id = Some(id);
        node.set_label("OK");

        let mut tree = AccessTree::default();
        tree.nodes.insert(id, node);

        assert_eq!(tree.find_by_label("OK").map(|n| n.role), Some(Role::Button));
        assert!(tree.find_by_label("Cancel").is_none());
    }
}
