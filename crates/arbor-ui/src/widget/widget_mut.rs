use super::{FromDynWidget, Widget};
use crate::contexts::MutateCtx;
use crate::debug::debug_panic;
use crate::widget_id::WidgetId;

/// Mutable view of a widget, handed to mutate callbacks.
///
/// Widgets expose their mutators as associated functions taking
/// `&mut WidgetMut<'_, Self>`, changing `widget` and requesting passes through
/// `ctx`:
///
/// ```rust,ignore
/// impl Label {
///     pub fn set_text(this: &mut WidgetMut<'_, Self>, text: impl Into<String>) {
///         this.widget.text = text.into();
///         this.ctx.request_layout();
///     }
/// }
/// ```
pub struct WidgetMut<'a, W: Widget + ?Sized> {
    pub ctx: MutateCtx<'a>,
    pub widget: &'a mut W,
}

impl<W: Widget + ?Sized> WidgetMut<'_, W> {
    pub fn id(&self) -> WidgetId {
        self.ctx.widget_id()
    }

    /// Shorter-lived copy of this view, for passing to helpers by value.
    pub fn reborrow_mut(&mut self) -> WidgetMut<'_, W> {
        WidgetMut {
            ctx: self.ctx.reborrow_mut(),
            widget: &mut *self.widget,
        }
    }

    pub fn try_downcast<W2: Widget + FromDynWidget + ?Sized>(&mut self) -> Option<WidgetMut<'_, W2>> {
        let widget = W2::from_dyn_mut(self.widget.as_dyn_mut())?;
        Some(WidgetMut {
            ctx: self.ctx.reborrow_mut(),
            widget,
        })
    }

    /// Downcast to a concrete widget type.
    ///
    /// # Panics
    ///
    /// Panics if the widget is not a `W2`. Use
    /// [`try_downcast`](Self::try_downcast) when the type is not known.
    pub fn downcast<W2: Widget + FromDynWidget + ?Sized>(&mut self) -> WidgetMut<'_, W2> {
        let name = self.widget.short_type_name();
        match self.try_downcast() {
            Some(widget) => widget,
            None => panic!(
                "cannot downcast {name} to {}",
                std::any::type_name::<W2>()
            ),
        }
    }
}

/// Apply a type-erased callback after downcasting, reporting mismatches as
/// logic errors.
pub(crate) fn apply_downcast<W: Widget + FromDynWidget + ?Sized>(
    mut widget: WidgetMut<'_, dyn Widget>,
    f: impl FnOnce(WidgetMut<'_, W>),
) {
    let name = widget.widget.short_type_name();
    let id = widget.id();
    match widget.try_downcast::<W>() {
        Some(widget) => f(widget),
        None => debug_panic!(
            "mutate callback for {name} {id} expected {}",
            std::any::type_name::<W>()
        ),
    }
}
