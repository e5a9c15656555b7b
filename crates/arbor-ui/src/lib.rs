//! Arbor UI - retained-mode widget engine
//!
//! This crate owns a widget tree and keeps it consistent across input:
//! - Arena storage with check-out slots for borrow-safe pass traversal
//! - A fixed pass pipeline with dirty-flag pruning and a bounded rerun cap
//! - Capability-scoped contexts for every widget callback
//! - A deferred mutation queue, usable from other threads
//! - Keyboard focus and per-pointer capture
//! - Backend-agnostic draw list and accessibility tree output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arbor_ui::prelude::*;
//!
//! let mut root = RenderRoot::new(
//!     Flex::column()
//!         .with_spacing(8.0)
//!         .with_child(Label::new("Hello, World!"))
//!         .with_child(Button::new("Click Me")),
//!     RenderRootOptions::default(),
//! );
//!
//! root.handle_pointer_event(PointerEvent::Down(
//!     PointerButton::Primary,
//!     PointerInfo::primary(Vec2::new(20.0, 40.0)),
//! ));
//! while let Some(signal) = root.pop_signal() {
//!     if signal == RenderRootSignal::RequestRedraw {
//!         let (_draw_list, _access_tree) = root.redraw();
//!     }
//! }
//! ```

pub mod access;
pub(crate) mod capture;
pub mod contexts;
pub mod debug;
pub mod draw_list;
pub mod event;
pub mod flags;
pub mod focus;
pub mod layout;
pub mod metrics;
pub(crate) mod passes;
pub mod render_root;
pub mod widget;
pub mod widget_id;
pub mod widgets;

pub use access::{AccessFlags, AccessNode, AccessTree, Role};
pub use contexts::{
    AccessCtx, ComposeCtx, EventCtx, LayoutCtx, MutateCtx, PaintCtx, QueryCtx, RegisterCtx,
    UpdateCtx,
};
pub use draw_list::{Color, DrawCommand, DrawItem, DrawList, Scene};
pub use event::{
    AccessAction, AccessEvent, Action, Handled, Key, KeyEvent, Modifiers, PointerButton,
    PointerEvent, PointerId, PointerInfo, RenderRootSignal, TextEvent, Update, WindowEvent,
};
pub use flags::WidgetFlags;
pub use layout::BoxConstraints;
pub use metrics::PassMetrics;
pub use render_root::{ExternalMutator, RenderRoot, RenderRootOptions};
pub use widget::{
    ChildrenIds, FromDynWidget, Widget, WidgetArena, WidgetMut, WidgetPod, WidgetRef, WidgetState,
};
pub use widget_id::WidgetId;

// Re-export common types from dependencies
pub use arbor_core::geometry::{Insets, Rect, Size};
pub use arbor_core::math::{Affine2, Vec2};

/// Everything needed to build and drive a tree.
pub mod prelude {
    pub use crate::widgets::{Axis, Button, Flex, Label, Portal, SizedBox};
    pub use crate::{
        AccessAction, AccessEvent, Action, Affine2, BoxConstraints, Color, Handled, Key,
        KeyEvent, PointerButton, PointerEvent, PointerId, PointerInfo, Rect, RenderRoot,
        RenderRootOptions, RenderRootSignal, Size, TextEvent, Vec2, Widget, WidgetId, WidgetMut,
        WidgetPod, WindowEvent,
    };
}
