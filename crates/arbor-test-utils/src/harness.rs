//! Headless driver for a [`RenderRoot`].

use arbor_ui::access::AccessTree;
use arbor_ui::draw_list::DrawList;
use arbor_ui::event::{
    AccessAction, AccessEvent, Action, Handled, Key, KeyEvent, PointerButton, PointerEvent,
    PointerId, PointerInfo, RenderRootSignal, TextEvent, WindowEvent,
};
use arbor_ui::render_root::{RenderRoot, RenderRootOptions};
use arbor_ui::widget::{FromDynWidget, Widget, WidgetMut, WidgetRef};
use arbor_ui::widget_id::WidgetId;
use arbor_ui::{Size, Vec2};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

/// Default window size of a harness.
pub const HARNESS_DEFAULT_SIZE: Size<f32> = Size::new(400.0, 400.0);

/// Drives a [`RenderRoot`] the way a host would, with a simulated mouse and
/// keyboard.
///
/// Signals emitted by the root are buffered; actions are read back with
/// [`pop_action`](Self::pop_action).
pub struct TestHarness {
    render_root: RenderRoot,
    signals: VecDeque<RenderRootSignal>,
    mouse_position: Vec2,
}

impl TestHarness {
    pub fn create(root: impl Widget) -> Self {
        Self::create_with_size(root, HARNESS_DEFAULT_SIZE)
    }

    pub fn create_with_size(root: impl Widget, size: Size<f32>) -> Self {
        Self::create_with_options(root, RenderRootOptions::default().with_initial_size(size))
    }

    pub fn create_with_options(root: impl Widget, options: RenderRootOptions) -> Self {
        arbor_core::logging::init_for_tests();
        let mut harness = Self {
            render_root: RenderRoot::new(root, options),
            signals: VecDeque::new(),
            mouse_position: Vec2::ZERO,
        };
        harness.collect_signals();
        harness
    }

    fn collect_signals(&mut self) {
        self.signals.extend(self.render_root.drain_signals());
    }

    // --- Raw events ---

    pub fn process_pointer_event(&mut self, event: PointerEvent) -> Handled {
        trace!("harness pointer event {}", event.short_name());
        let handled = self.render_root.handle_pointer_event(event);
        self.collect_signals();
        handled
    }

    pub fn process_text_event(&mut self, event: TextEvent) -> Handled {
        let handled = self.render_root.handle_text_event(event);
        self.collect_signals();
        handled
    }

    pub fn process_access_event(&mut self, event: AccessEvent) -> Handled {
        let handled = self.render_root.handle_access_event(event);
        self.collect_signals();
        handled
    }

    pub fn process_window_event(&mut self, event: WindowEvent) -> Handled {
        let handled = self.render_root.handle_window_event(event);
        self.collect_signals();
        handled
    }

    // --- Mouse ---

    fn pointer_info(&self) -> PointerInfo {
        PointerInfo::primary(self.mouse_position)
    }

    pub fn mouse_move(&mut self, position: Vec2) -> Handled {
        self.mouse_position = position;
        self.process_pointer_event(PointerEvent::Move(self.pointer_info()))
    }

    pub fn mouse_button_press(&mut self, button: PointerButton) -> Handled {
        self.process_pointer_event(PointerEvent::Down(button, self.pointer_info()))
    }

    pub fn mouse_button_release(&mut self, button: PointerButton) -> Handled {
        self.process_pointer_event(PointerEvent::Up(button, self.pointer_info()))
    }

    pub fn mouse_wheel(&mut self, delta: Vec2) -> Handled {
        self.process_pointer_event(PointerEvent::Scroll(delta, self.pointer_info()))
    }

    /// The pointer left the window.
    pub fn mouse_leave(&mut self) -> Handled {
        self.process_pointer_event(PointerEvent::Leave(self.pointer_info()))
    }

    pub fn pointer_cancel(&mut self) -> Handled {
        self.process_pointer_event(PointerEvent::Cancel(self.pointer_info()))
    }

    /// Move the mouse to the center of a widget.
    ///
    /// # Panics
    ///
    /// If `id` is not in the tree.
    pub fn mouse_move_to(&mut self, id: WidgetId) -> Handled {
        let bounds = self.get_widget(id).state().window_bounds();
        let center = Vec2::new(bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0);
        self.mouse_move(center)
    }

    /// Move to `id`, then press and release the primary button.
    pub fn mouse_click_on(&mut self, id: WidgetId) {
        self.mouse_move_to(id);
        self.mouse_button_press(PointerButton::Primary);
        self.mouse_button_release(PointerButton::Primary);
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    // --- Keyboard, focus and accessibility ---

    pub fn keyboard_type_key(&mut self, key: Key) -> Handled {
        self.process_text_event(TextEvent::Key(KeyEvent::press(key)))
    }

    pub fn press_tab(&mut self, forward: bool) -> Handled {
        let event = KeyEvent::press(Key::Tab);
        let event = if forward { event } else { event.with_shift() };
        self.process_text_event(TextEvent::Key(event))
    }

    /// Give focus to `id` through an accessibility focus action.
    pub fn focus_on(&mut self, id: WidgetId) -> Handled {
        self.process_access_event(AccessEvent::new(AccessAction::Focus).on(id))
    }

    pub fn access_click(&mut self, id: WidgetId) -> Handled {
        self.process_access_event(AccessEvent::new(AccessAction::Click).on(id))
    }

    // --- Window ---

    pub fn set_window_focused(&mut self, focused: bool) {
        self.process_window_event(WindowEvent::FocusChanged(focused));
    }

    pub fn resize(&mut self, size: Size<f32>) {
        self.process_window_event(WindowEvent::Resize(size));
    }

    pub fn animate_ms(&mut self, ms: u64) {
        self.process_window_event(WindowEvent::AnimFrame(Duration::from_millis(ms)));
    }

    /// Run paint and accessibility.
    pub fn render(&mut self) -> (DrawList, AccessTree) {
        let output = self.render_root.redraw();
        self.collect_signals();
        output
    }

    // --- Mutation ---

    pub fn edit_root_widget<R>(&mut self, f: impl FnOnce(WidgetMut<'_, dyn Widget>) -> R) -> R {
        let result = self.render_root.edit_root_widget(f);
        self.collect_signals();
        result
    }

    /// Edit a widget.
    ///
    /// # Panics
    ///
    /// If `id` is not in the tree.
    pub fn edit_widget<R>(&mut self, id: WidgetId, f: impl FnOnce(WidgetMut<'_, dyn Widget>) -> R) -> R {
        let result = self.render_root.edit_widget(id, f);
        self.collect_signals();
        match result {
            Some(result) => result,
            None => panic!("edit_widget: {id} is not in the tree"),
        }
    }

    /// Run the rewrite passes without any input, as a host does after
    /// external mutations arrive.
    pub fn run_rewrite_passes(&mut self) {
        self.render_root.run_rewrite_passes();
        self.collect_signals();
    }

    // --- Signals ---

    pub fn pop_signal(&mut self) -> Option<RenderRootSignal> {
        self.signals.pop_front()
    }

    pub fn drain_signals(&mut self) -> Vec<RenderRootSignal> {
        self.signals.drain(..).collect()
    }

    /// Remove and return the oldest action, leaving other signals queued.
    pub fn pop_action(&mut self) -> Option<(Action, WidgetId)> {
        let idx = self
            .signals
            .iter()
            .position(|signal| matches!(signal, RenderRootSignal::Action(..)))?;
        match self.signals.remove(idx) {
            Some(RenderRootSignal::Action(action, id)) => Some((action, id)),
            _ => None,
        }
    }

    pub fn has_signal(&self, signal: &RenderRootSignal) -> bool {
        self.signals.contains(signal)
    }

    // --- Queries ---

    pub fn render_root(&self) -> &RenderRoot {
        &self.render_root
    }

    pub fn render_root_mut(&mut self) -> &mut RenderRoot {
        &mut self.render_root
    }

    pub fn root_id(&self) -> WidgetId {
        self.render_root.root_id()
    }

    pub fn root_widget(&self) -> WidgetRef<'_, dyn Widget> {
        self.render_root.get_root_widget()
    }

    /// # Panics
    ///
    /// If `id` is not in the tree.
    pub fn get_widget(&self, id: WidgetId) -> WidgetRef<'_, dyn Widget> {
        match self.render_root.get_widget(id) {
            Some(widget) => widget,
            None => panic!("get_widget: {id} is not in the tree"),
        }
    }

    pub fn try_get_widget(&self, id: WidgetId) -> Option<WidgetRef<'_, dyn Widget>> {
        self.render_root.get_widget(id)
    }

    /// Typed view of a widget.
    ///
    /// # Panics
    ///
    /// If `id` is not in the tree or is not a `W`.
    pub fn get_widget_as<W: Widget + FromDynWidget + ?Sized>(&self, id: WidgetId) -> WidgetRef<'_, W> {
        match self.get_widget(id).downcast::<W>() {
            Some(widget) => widget,
            None => panic!("get_widget_as: {id} is not a {}", std::any::type_name::<W>()),
        }
    }

    pub fn focused_widget(&self) -> Option<WidgetId> {
        self.render_root.focused_widget()
    }

    pub fn hovered_widget(&self) -> Option<WidgetId> {
        self.render_root.hovered_widget()
    }

    /// Capture holder of the mouse.
    pub fn pointer_capture_target(&self) -> Option<WidgetId> {
        self.render_root.pointer_capture_target(PointerId::PRIMARY)
    }
}
