//! The render root: owner of the widget arena and driver of every pass.
//!
//! # Example
//!
//! ```ignore
//! use arbor_ui::prelude::*;
//!
//! let mut root = RenderRoot::new(
//!     Flex::column().with_child(Button::new("OK")),
//!     RenderRootOptions::default(),
//! );
//!
//! root.handle_pointer_event(PointerEvent::Down(PointerButton::Primary, info));
//! while let Some(signal) = root.pop_signal() {
//!     match signal {
//!         RenderRootSignal::RequestRedraw => {
//!             let (draw_list, access_tree) = root.redraw();
//!             // hand both to the backend
//!         }
//!         RenderRootSignal::Action(action, widget) => { /* ... */ }
//!         _ => {}
//!     }
//! }
//! ```

use crate::access::AccessTree;
use crate::capture::PointerCaptures;
use crate::debug::dump_tree;
use crate::draw_list::DrawList;
use crate::event::{
    AccessEvent, Handled, PointerId, PointerInfo, PointerEvent, RenderRootSignal, TextEvent,
    WindowEvent,
};
use crate::flags::WidgetFlags;
use crate::metrics::{MetricsTimer, PassMetrics};
use crate::passes::accessibility::run_accessibility_pass;
use crate::passes::anim::run_anim_pass;
use crate::passes::compose::run_compose_pass;
use crate::passes::event::{
    run_on_access_event_pass, run_on_pointer_event_pass, run_on_text_event_pass,
};
use crate::passes::layout::run_layout_pass;
use crate::passes::mutate::{mutate_widget, run_mutate_pass};
use crate::passes::paint::run_paint_pass;
use crate::passes::update::{
    run_update_disabled_pass, run_update_focus_chain_pass, run_update_focus_pass,
    run_update_pointer_pass, run_update_scroll_pass, run_update_stashed_pass,
    run_update_tree_pass,
};
use crate::contexts::QueryCtx;
use crate::widget::{
    FromDynWidget, Widget, WidgetArena, WidgetMut, WidgetPod, WidgetRef, apply_downcast,
};
use crate::widget_id::WidgetId;
use arbor_core::geometry::{Rect, Size};
use arbor_core::profiling::{self, profile_function};
use crossbeam_channel::{Receiver, Sender};
use std::collections::VecDeque;
use tracing::{debug, info_span, warn};

/// A mutation queued with `mutate_later`.
pub(crate) struct MutateCallback {
    pub(crate) target: WidgetId,
    pub(crate) callback: Box<dyn FnOnce(WidgetMut<'_, dyn Widget>)>,
}

/// A mutation sent from another thread through an [`ExternalMutator`].
pub(crate) struct ExternalCallback {
    pub(crate) target: WidgetId,
    pub(crate) callback: Box<dyn FnOnce(WidgetMut<'_, dyn Widget>) + Send>,
}

/// Sending half of the mutation queue, for code outside the widget tree.
///
/// Mutations are applied in send order during the next mutate pass of the
/// owning [`RenderRoot`], after mutations queued from inside the tree. A
/// mutation whose target has been removed by then is dropped.
#[derive(Clone)]
pub struct ExternalMutator {
    sender: Sender<ExternalCallback>,
}

static_assertions::assert_impl_all!(ExternalMutator: Send, Sync, Clone);

impl ExternalMutator {
    /// Queue `f` for `target`. Returns `false` if the render root is gone.
    pub fn mutate_later<W>(
        &self,
        target: WidgetId,
        f: impl FnOnce(WidgetMut<'_, W>) + Send + 'static,
    ) -> bool
    where
        W: Widget + FromDynWidget + ?Sized,
    {
        self.sender
            .send(ExternalCallback {
                target,
                callback: Box::new(move |widget| apply_downcast(widget, f)),
            })
            .is_ok()
    }
}

impl std::fmt::Debug for ExternalMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalMutator")
            .field("queued", &self.sender.len())
            .finish()
    }
}

/// Configuration for a [`RenderRoot`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRootOptions {
    /// How many times the rewrite sequence may run for one interaction before
    /// the remaining work is deferred to the next frame.
    pub max_rewrite_passes: usize,
    pub initial_size: Size<f32>,
    /// Whether an unhandled Tab moves focus along the focus chain.
    pub default_tab_navigation: bool,
    pub window_focused: bool,
    /// Log a metrics summary after every run of the rewrite passes.
    pub pass_metrics: bool,
}

impl Default for RenderRootOptions {
    fn default() -> Self {
        Self {
            max_rewrite_passes: 5,
            initial_size: Size::new(800.0, 600.0),
            default_tab_navigation: true,
            window_focused: true,
            pass_metrics: false,
        }
    }
}

impl RenderRootOptions {
    pub fn with_max_rewrite_passes(mut self, max: usize) -> Self {
        self.max_rewrite_passes = max;
        self
    }

    pub fn with_initial_size(mut self, size: Size<f32>) -> Self {
        self.initial_size = size;
        self
    }

    pub fn with_tab_navigation(mut self, enabled: bool) -> Self {
        self.default_tab_navigation = enabled;
        self
    }

    pub fn with_window_focused(mut self, focused: bool) -> Self {
        self.window_focused = focused;
        self
    }

    pub fn with_pass_metrics(mut self, enabled: bool) -> Self {
        self.pass_metrics = enabled;
        self
    }
}

/// State shared by every context, outside the arena.
pub(crate) struct RenderRootState {
    pub(crate) signal_queue: VecDeque<RenderRootSignal>,

    pub(crate) focused_widget: Option<WidgetId>,
    /// Focused widget first, root last.
    pub(crate) focused_path: Vec<WidgetId>,
    /// Focus target applied by the next focus pass.
    pub(crate) next_focused_widget: Option<WidgetId>,
    pub(crate) window_focused: bool,

    pub(crate) captures: PointerCaptures,
    pub(crate) hovered_widget: Option<WidgetId>,
    /// Hovered widget first, root last.
    pub(crate) hovered_path: Vec<WidgetId>,
    /// Last known position of the hovering pointer; `None` outside the window.
    pub(crate) last_pointer: Option<PointerInfo>,
    pub(crate) needs_pointer_pass: bool,

    /// Widgets asking to be scrolled into view, with a rect in their own
    /// coordinates.
    pub(crate) scroll_requests: Vec<(WidgetId, Rect<f32>)>,

    pub(crate) mutate_callbacks: VecDeque<MutateCallback>,
    pub(crate) external_sender: Sender<ExternalCallback>,
    pub(crate) external_receiver: Receiver<ExternalCallback>,

    pub(crate) metrics: PassMetrics,
}

impl RenderRootState {
    fn new(window_focused: bool) -> Self {
        let (external_sender, external_receiver) = crossbeam_channel::unbounded();
        Self {
            signal_queue: VecDeque::new(),
            focused_widget: None,
            focused_path: Vec::new(),
            next_focused_widget: None,
            window_focused,
            captures: PointerCaptures::default(),
            hovered_widget: None,
            hovered_path: Vec::new(),
            last_pointer: None,
            needs_pointer_pass: false,
            scroll_requests: Vec::new(),
            mutate_callbacks: VecDeque::new(),
            external_sender,
            external_receiver,
            metrics: PassMetrics::new(),
        }
    }

    /// Queue a signal for the host. Redraw and frame requests are coalesced.
    pub(crate) fn emit_signal(&mut self, signal: RenderRootSignal) {
        let coalesce = matches!(
            signal,
            RenderRootSignal::RequestRedraw | RenderRootSignal::RequestAnimFrame
        );
        if coalesce && self.signal_queue.contains(&signal) {
            return;
        }
        self.signal_queue.push_back(signal);
    }

    pub(crate) fn has_queued_mutations(&self) -> bool {
        !self.mutate_callbacks.is_empty() || !self.external_receiver.is_empty()
    }

    /// Work the rewrite passes must pick up that is not visible in the
    /// root's flags.
    pub(crate) fn has_pending_work(&self) -> bool {
        self.has_queued_mutations()
            || self.has_pending_focus()
            || !self.scroll_requests.is_empty()
            || self.needs_pointer_pass
            || self.captures.has_pending_leaves()
    }

    /// Whether the focus pass has work: a new focus target, or ancestors of
    /// a removed focused widget still waiting for `ChildFocusChanged(false)`.
    pub(crate) fn has_pending_focus(&self) -> bool {
        self.next_focused_widget != self.focused_widget
            || (self.focused_widget.is_none() && !self.focused_path.is_empty())
    }

    /// Drop every reference to removed widgets.
    ///
    /// A removed focused widget loses focus immediately. Its surviving
    /// ancestors lose `HAS_FOCUSED` now and are notified by the next focus
    /// pass. Queued mutations are left alone; the mutate pass drops them.
    pub(crate) fn forget_widgets(&mut self, arena: &mut WidgetArena, removed: &[WidgetId]) {
        if removed.is_empty() {
            return;
        }
        if self
            .next_focused_widget
            .is_some_and(|id| removed.contains(&id))
        {
            self.next_focused_widget = None;
        }
        if self.focused_widget.is_some_and(|id| removed.contains(&id)) {
            self.focused_widget = None;
            self.focused_path.retain(|id| !removed.contains(id));
            for id in &self.focused_path {
                if let Some(state) = arena.try_state_mut(*id) {
                    state.flags.remove(WidgetFlags::HAS_FOCUSED);
                    arena.mark(*id, WidgetFlags::REQUEST_ACCESSIBILITY);
                }
            }
        }
        self.captures.forget(removed);
        if self.hovered_widget.is_some_and(|id| removed.contains(&id)) {
            self.hovered_widget = None;
        }
        if self.hovered_path.iter().any(|id| removed.contains(id)) {
            self.hovered_path.retain(|id| !removed.contains(id));
            self.needs_pointer_pass = true;
        }
        self.scroll_requests
            .retain(|(id, _)| !removed.contains(id));
        tracing::trace!("forgot {} removed widgets", removed.len());
    }
}

/// Owner of a widget tree.
///
/// Every public entry point that can change the tree runs the rewrite passes
/// before returning, so the tree is always laid out and composed between
/// calls. Paint and accessibility run only in [`redraw`](Self::redraw).
pub struct RenderRoot {
    pub(crate) root_id: WidgetId,
    pub(crate) arena: WidgetArena,
    pub(crate) global: RenderRootState,
    pub(crate) options: RenderRootOptions,
    pub(crate) size: Size<f32>,
}

impl RenderRoot {
    pub fn new(root_widget: impl Widget, options: RenderRootOptions) -> Self {
        Self::new_from_pod(WidgetPod::new(root_widget).erased(), options)
    }

    pub fn new_from_pod(mut root_widget: WidgetPod<dyn Widget>, options: RenderRootOptions) -> Self {
        let mut arena = WidgetArena::new();
        let root_id = root_widget.id();
        match root_widget.take_inner() {
            Some(widget) => {
                arena.insert(root_id, widget);
            }
            None => unreachable!("a fresh pod always holds its widget"),
        }

        let mut root = Self {
            root_id,
            arena,
            global: RenderRootState::new(options.window_focused),
            size: options.initial_size,
            options,
        };
        debug!("created render root {root_id}");
        root.run_rewrite_passes();
        root
    }

    // --- Events ---

    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Handled {
        let handled = run_on_pointer_event_pass(self, &event);
        self.run_rewrite_passes();
        handled
    }

    pub fn handle_text_event(&mut self, event: TextEvent) -> Handled {
        let handled = run_on_text_event_pass(self, &event);
        self.run_rewrite_passes();
        handled
    }

    pub fn handle_access_event(&mut self, event: AccessEvent) -> Handled {
        let handled = run_on_access_event_pass(self, &event);
        self.run_rewrite_passes();
        handled
    }

    pub fn handle_window_event(&mut self, event: WindowEvent) -> Handled {
        match event {
            WindowEvent::Resize(size) => {
                if self.size != size {
                    debug!("resize {size:?}");
                    self.size = size;
                    self.arena.mark(self.root_id, WidgetFlags::REQUEST_LAYOUT);
                }
            }
            WindowEvent::FocusChanged(focused) => self.set_window_focused(focused),
            WindowEvent::AnimFrame(elapsed) => {
                profiling::new_frame();
                run_anim_pass(self, elapsed);
            }
        }
        self.run_rewrite_passes();
        Handled::Yes
    }

    fn set_window_focused(&mut self, focused: bool) {
        if self.global.window_focused == focused {
            return;
        }
        debug!("window focused: {focused}");
        self.global.window_focused = focused;
        if let Some(id) = self.global.focused_widget {
            if let Some(state) = self.arena.try_state_mut(id) {
                let (from, to) = if focused {
                    (WidgetFlags::FOCUSED_INACTIVE, WidgetFlags::FOCUSED_ACTIVE)
                } else {
                    (WidgetFlags::FOCUSED_ACTIVE, WidgetFlags::FOCUSED_INACTIVE)
                };
                state.flags.remove(from);
                state.flags.insert(to);
                self.arena.mark(
                    id,
                    WidgetFlags::REQUEST_PAINT | WidgetFlags::REQUEST_ACCESSIBILITY,
                );
            }
        }
        if !focused {
            self.global.captures.release_all(&mut self.arena, true);
            self.global.needs_pointer_pass = true;
        }
    }

    // --- Rewrite passes ---

    /// Returns true if the tree has pending structural, layout or compose
    /// work, or queued mutations, focus changes, scroll requests or hover
    /// updates.
    pub fn needs_rewrite_passes(&self) -> bool {
        self.arena.state(self.root_id).flags.needs_rewrite() || self.global.has_pending_work()
    }

    /// Run the rewrite sequence until the tree is clean, at most
    /// `max_rewrite_passes` times.
    ///
    /// If work remains after the last allowed iteration it is left in place
    /// and a [`RenderRootSignal::RequestAnimFrame`] asks the host to come
    /// back next frame.
    pub fn run_rewrite_passes(&mut self) {
        if self.needs_rewrite_passes() {
            let _span = info_span!("rewrite_passes").entered();
            profile_function!();
            let timer = MetricsTimer::start();
            self.global.metrics = PassMetrics::new();

            let mut iterations = 0;
            while self.needs_rewrite_passes() {
                if iterations >= self.options.max_rewrite_passes {
                    warn!(
                        "tree still dirty after {iterations} rewrite iterations, deferring to next frame"
                    );
                    self.global.metrics.deferred = true;
                    self.global.emit_signal(RenderRootSignal::RequestAnimFrame);
                    break;
                }
                iterations += 1;
                self.run_rewrite_sequence();
            }

            let metrics = &mut self.global.metrics;
            metrics.rewrite_iterations = iterations;
            metrics.total_widgets = self.arena.len();
            metrics.total_time = timer.stop();
            if self.options.pass_metrics {
                debug!("{}", metrics.format_summary());
            }
        }

        let root_flags = self.arena.state(self.root_id).flags;
        if root_flags.needs_render() {
            self.global.emit_signal(RenderRootSignal::RequestRedraw);
        }
        if root_flags.contains(WidgetFlags::NEEDS_ANIM) {
            self.global.emit_signal(RenderRootSignal::RequestAnimFrame);
        }
    }

    fn run_rewrite_sequence(&mut self) {
        run_mutate_pass(self);

        let timer = MetricsTimer::start();
        run_update_tree_pass(self);
        run_update_disabled_pass(self);
        run_update_stashed_pass(self);
        run_update_focus_chain_pass(self);
        run_update_focus_pass(self);
        self.global.metrics.update_time += timer.stop();

        run_layout_pass(self);
        run_update_scroll_pass(self);
        run_compose_pass(self);

        let timer = MetricsTimer::start();
        run_update_pointer_pass(self);
        self.global.metrics.pointer_time += timer.stop();
    }

    // --- Render passes ---

    /// Run paint and accessibility, returning the full draw list and
    /// accessibility tree.
    pub fn redraw(&mut self) -> (DrawList, AccessTree) {
        profiling::new_frame();
        let _span = info_span!("redraw").entered();
        let draw_list = run_paint_pass(self);
        let access_tree = run_accessibility_pass(self);
        (draw_list, access_tree)
    }

    pub fn pop_signal(&mut self) -> Option<RenderRootSignal> {
        self.global.signal_queue.pop_front()
    }

    /// Remove and return every queued signal.
    pub fn drain_signals(&mut self) -> Vec<RenderRootSignal> {
        self.global.signal_queue.drain(..).collect()
    }

    // --- Mutation ---

    /// Edit the root widget, then run the rewrite passes.
    pub fn edit_root_widget<R>(&mut self, f: impl FnOnce(WidgetMut<'_, dyn Widget>) -> R) -> R {
        let result = mutate_widget(&mut self.global, &mut self.arena, self.root_id, f);
        self.run_rewrite_passes();
        match result {
            Some(result) => result,
            None => unreachable!("the root widget is only checked out during passes"),
        }
    }

    /// Edit any widget, then run the rewrite passes. Returns `None` if `id`
    /// is not in the tree.
    pub fn edit_widget<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(WidgetMut<'_, dyn Widget>) -> R,
    ) -> Option<R> {
        let result = mutate_widget(&mut self.global, &mut self.arena, id, f);
        self.run_rewrite_passes();
        result
    }

    /// A thread-safe handle for queueing mutations from outside the tree.
    pub fn external_mutator(&self) -> ExternalMutator {
        ExternalMutator {
            sender: self.global.external_sender.clone(),
        }
    }

    // --- Queries ---

    pub fn root_id(&self) -> WidgetId {
        self.root_id
    }

    pub fn size(&self) -> Size<f32> {
        self.size
    }

    pub fn get_root_widget(&self) -> WidgetRef<'_, dyn Widget> {
        match self.get_widget(self.root_id) {
            Some(root) => root,
            None => unreachable!("the root widget is only checked out during passes"),
        }
    }

    pub fn get_widget(&self, id: WidgetId) -> Option<WidgetRef<'_, dyn Widget>> {
        let (widget, _) = self.arena.get(id)?;
        Some(WidgetRef {
            ctx: QueryCtx::new(&self.global, &self.arena, id),
            widget,
        })
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.arena.contains(id)
    }

    /// Ids of every widget in the tree, in no particular order.
    pub fn widget_ids(&self) -> Vec<WidgetId> {
        self.arena.ids().collect()
    }

    pub fn focused_widget(&self) -> Option<WidgetId> {
        self.global.focused_widget
    }

    /// The widget directly under the pointer.
    pub fn hovered_widget(&self) -> Option<WidgetId> {
        self.global.hovered_widget
    }

    pub fn pointer_capture_target(&self, pointer_id: PointerId) -> Option<WidgetId> {
        self.global.captures.holder(pointer_id)
    }

    pub fn is_window_focused(&self) -> bool {
        self.global.window_focused
    }

    /// Tab order of the whole tree.
    pub fn focus_chain(&self) -> &[WidgetId] {
        &self.arena.state(self.root_id).focus_chain
    }

    /// Metrics of the last run of the rewrite passes that did any work.
    pub fn last_metrics(&self) -> &PassMetrics {
        &self.global.metrics
    }

    /// Indented listing of the whole tree, for debugging.
    pub fn dump_tree(&self) -> String {
        dump_tree(&self.arena, self.root_id)
    }
}

impl std::fmt::Debug for RenderRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderRoot")
            .field("root_id", &self.root_id)
            .field("widgets", &self.arena.len())
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
