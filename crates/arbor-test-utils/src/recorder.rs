//! Call recording for widget callbacks.

use arbor_ui::access::{AccessNode, Role};
use arbor_ui::contexts::{
    AccessCtx, ComposeCtx, EventCtx, LayoutCtx, PaintCtx, RegisterCtx, UpdateCtx,
};
use arbor_ui::draw_list::Scene;
use arbor_ui::event::{AccessEvent, PointerEvent, TextEvent, Update};
use arbor_ui::layout::BoxConstraints;
use arbor_ui::widget::{ChildrenIds, Widget, WidgetMut};
use arbor_ui::Size;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// One callback invocation seen by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    PointerEvent(PointerEvent),
    TextEvent(TextEvent),
    AccessEvent(AccessEvent),
    AnimFrame(u64),
    Update(Update),
    RegisterChildren,
    Layout(BoxConstraints),
    Compose,
    Paint,
    Access,
}

impl Record {
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update(_))
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Layout(_))
    }
}

/// Shared log of [`Record`]s.
///
/// # Borrow Checking Pattern: Interior Mutability
///
/// The recorder lives inside the widget arena while the test keeps its own
/// handle, so both sides share the log through `Arc<Mutex<_>>` and every
/// method takes `&self`.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    records: Arc<Mutex<VecDeque<Record>>>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest record.
    pub fn next(&self) -> Option<Record> {
        self.records.lock().pop_front()
    }

    /// Remove and return every record, oldest first.
    pub fn drain(&self) -> Vec<Record> {
        self.records.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Number of pending records matching `pred`.
    pub fn count(&self, pred: impl Fn(&Record) -> bool) -> usize {
        self.records.lock().iter().filter(|record| pred(record)).count()
    }

    pub fn count_layouts(&self) -> usize {
        self.count(Record::is_layout)
    }

    pub fn count_paints(&self) -> usize {
        self.count(|record| *record == Record::Paint)
    }

    /// Pending updates, without consuming the other records.
    pub fn updates(&self) -> Vec<Update> {
        self.records
            .lock()
            .iter()
            .filter_map(|record| match record {
                Record::Update(update) => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, record: Record) {
        self.records.lock().push_back(record);
    }
}

/// Wraps a widget and logs every callback before forwarding it.
pub struct Recorder<W> {
    inner: W,
    recording: Recording,
}

impl<W: Widget> Recorder<W> {
    pub fn new(inner: W, recording: &Recording) -> Self {
        Self {
            inner,
            recording: recording.clone(),
        }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Mutable view of the wrapped widget, for calling its mutators.
    pub fn inner_mut<'a>(this: &'a mut WidgetMut<'_, Self>) -> WidgetMut<'a, W> {
        WidgetMut {
            ctx: this.ctx.reborrow_mut(),
            widget: &mut this.widget.inner,
        }
    }
}

/// Extension for wrapping any widget in a [`Recorder`].
pub trait RecordExt: Widget + Sized {
    fn record(self, recording: &Recording) -> Recorder<Self> {
        Recorder::new(self, recording)
    }
}

impl<W: Widget> RecordExt for W {}

impl<W: Widget> Widget for Recorder<W> {
    fn on_pointer_event(&mut self, ctx: &mut EventCtx<'_>, event: &PointerEvent) {
        self.recording.push(Record::PointerEvent(event.clone()));
        self.inner.on_pointer_event(ctx, event);
    }

    fn on_text_event(&mut self, ctx: &mut EventCtx<'_>, event: &TextEvent) {
        self.recording.push(Record::TextEvent(event.clone()));
        self.inner.on_text_event(ctx, event);
    }

    fn on_access_event(&mut self, ctx: &mut EventCtx<'_>, event: &AccessEvent) {
        self.recording.push(Record::AccessEvent(event.clone()));
        self.inner.on_access_event(ctx, event);
    }

    fn on_anim_frame(&mut self, ctx: &mut UpdateCtx<'_>, interval: u64) {
        self.recording.push(Record::AnimFrame(interval));
        self.inner.on_anim_frame(ctx, interval);
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>, event: &Update) {
        self.recording.push(Record::Update(event.clone()));
        self.inner.update(ctx, event);
    }

    fn register_children(&mut self, ctx: &mut RegisterCtx<'_>) {
        self.recording.push(Record::RegisterChildren);
        self.inner.register_children(ctx);
    }

    fn layout(&mut self, ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32> {
        self.recording.push(Record::Layout(*bc));
        self.inner.layout(ctx, bc)
    }

    fn compose(&mut self, ctx: &mut ComposeCtx<'_>) {
        self.recording.push(Record::Compose);
        self.inner.compose(ctx);
    }

    fn paint(&mut self, ctx: &mut PaintCtx<'_>, scene: &mut Scene) {
        self.recording.push(Record::Paint);
        self.inner.paint(ctx, scene);
    }

    fn accessibility_role(&self) -> Role {
        self.inner.accessibility_role()
    }

    fn accessibility(&mut self, ctx: &mut AccessCtx<'_>, node: &mut AccessNode) {
        self.recording.push(Record::Access);
        self.inner.accessibility(ctx, node);
    }

    fn children_ids(&self) -> ChildrenIds {
        self.inner.children_ids()
    }

    fn accepts_focus(&self) -> bool {
        self.inner.accepts_focus()
    }

    fn accepts_pointer_interaction(&self) -> bool {
        self.inner.accepts_pointer_interaction()
    }

    fn get_debug_text(&self) -> Option<String> {
        self.inner.get_debug_text()
    }
}
