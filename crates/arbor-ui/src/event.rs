//! Input events, status updates and host signals.

use crate::widget_id::WidgetId;
use arbor_core::geometry::{Rect, Size};
use arbor_core::math::Vec2;
use std::time::Duration;

/// Identifies one pointer device (mouse, a touch contact, a pen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl PointerId {
    /// The mouse, or whatever the host treats as the primary pointer.
    pub const PRIMARY: Self = Self(0);
}

/// Mouse button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Data common to every pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfo {
    pub pointer_id: PointerId,
    /// Position in window coordinates.
    pub position: Vec2,
}

impl PointerInfo {
    pub fn primary(position: Vec2) -> Self {
        Self {
            pointer_id: PointerId::PRIMARY,
            position,
        }
    }
}

/// Pointer input, routed to the capture holder or the widget under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down(PointerButton, PointerInfo),
    Up(PointerButton, PointerInfo),
    Move(PointerInfo),
    Scroll(Vec2, PointerInfo),
    /// The pointer left the window, or (when synthesized) the widget lost
    /// pointer capture.
    Leave(PointerInfo),
    /// The device disconnected or the platform aborted the gesture.
    Cancel(PointerInfo),
}

impl PointerEvent {
    pub fn info(&self) -> &PointerInfo {
        match self {
            Self::Down(_, info)
            | Self::Up(_, info)
            | Self::Move(info)
            | Self::Scroll(_, info)
            | Self::Leave(info)
            | Self::Cancel(info) => info,
        }
    }

    pub fn pointer_id(&self) -> PointerId {
        self.info().pointer_id
    }

    pub fn position(&self) -> Vec2 {
        self.info().position
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Down(..) => "Down",
            Self::Up(..) => "Up",
            Self::Move(..) => "Move",
            Self::Scroll(..) => "Scroll",
            Self::Leave(..) => "Leave",
            Self::Cancel(..) => "Cancel",
        }
    }
}

/// Logical key, reduced to what the engine itself interprets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Space,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Character(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            pressed: true,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// Keyboard and text input, routed to the focused widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEvent {
    Key(KeyEvent),
    /// Committed text from an input method.
    Ime(String),
}

impl TextEvent {
    /// Returns `Some(forward)` for a Tab press (`false` with Shift held).
    pub fn tab_direction(&self) -> Option<bool> {
        match self {
            Self::Key(KeyEvent {
                key: Key::Tab,
                pressed: true,
                modifiers,
            }) => Some(!modifiers.shift),
            _ => None,
        }
    }
}

/// Actions an accessibility client can perform on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessAction {
    Click,
    Focus,
    Blur,
    ScrollIntoView,
    SetValue,
}

/// A request from an assistive technology.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEvent {
    /// Explicit target node; when `None` the focused widget is the target.
    pub target: Option<WidgetId>,
    pub action: AccessAction,
    pub value: Option<String>,
}

impl AccessEvent {
    pub fn new(action: AccessAction) -> Self {
        Self {
            target: None,
            action,
            value: None,
        }
    }

    pub fn on(mut self, target: WidgetId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Window-level notifications from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    Resize(Size<f32>),
    /// The window gained (`true`) or lost input focus.
    FocusChanged(bool),
    /// An animation frame is due; carries the time since the previous one.
    AnimFrame(Duration),
}

/// Status transitions delivered through [`Widget::update`].
///
/// [`Widget::update`]: crate::widget::Widget::update
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Sent once, after the widget's own children are registered and before
    /// it is first laid out.
    WidgetAdded,
    DisabledChanged(bool),
    StashedChanged(bool),
    FocusChanged(bool),
    ChildFocusChanged(bool),
    HoveredChanged(bool),
    ChildHoveredChanged(bool),
    /// A descendant asked to be scrolled into view. The rect is in this
    /// widget's local coordinates.
    RequestPanToChild(Rect<f32>),
}

impl Update {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::WidgetAdded => "WidgetAdded",
            Self::DisabledChanged(_) => "DisabledChanged",
            Self::StashedChanged(_) => "StashedChanged",
            Self::FocusChanged(_) => "FocusChanged",
            Self::ChildFocusChanged(_) => "ChildFocusChanged",
            Self::HoveredChanged(_) => "HoveredChanged",
            Self::ChildHoveredChanged(_) => "ChildHoveredChanged",
            Self::RequestPanToChild(_) => "RequestPanToChild",
        }
    }
}

/// Whether an event was handled by some widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    No,
}

impl Handled {
    pub fn is_handled(self) -> bool {
        self == Self::Yes
    }
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        if handled { Self::Yes } else { Self::No }
    }
}

/// Semantic output of a widget, surfaced to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ButtonPressed(Option<PointerButton>),
    TextChanged(String),
    Scrolled(Vec2),
}

/// Outbound notifications for the hosting environment.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderRootSignal {
    /// Paint or accessibility output is stale; call `redraw`.
    RequestRedraw,
    /// Some widget wants an animation frame, or deferred rewrite work is
    /// waiting for the next frame.
    RequestAnimFrame,
    /// A widget took focus while the window was unfocused.
    TakeFocus,
    Action(Action, WidgetId),
}
