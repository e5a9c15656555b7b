use super::Label;
use crate::access::{AccessNode, Role};
use crate::contexts::{AccessCtx, EventCtx, LayoutCtx, PaintCtx, RegisterCtx, UpdateCtx};
use crate::draw_list::{Color, Scene};
use crate::event::{
    AccessAction, AccessEvent, Action, Key, KeyEvent, PointerButton, PointerEvent, TextEvent,
    Update,
};
use crate::layout::BoxConstraints;
use crate::widget::{ChildrenIds, Widget, WidgetMut, WidgetPod};
use crate::widget_id::WidgetId;
use arbor_core::geometry::{Insets, Size};
use arbor_core::math::Vec2;
use smallvec::smallvec;

/// Button widget - clickable with a text label.
///
/// Submits [`Action::ButtonPressed`] when released under the pointer after a
/// press, or when activated with Enter, Space or an accessibility click.
pub struct Button {
    label: WidgetPod<Label>,
    text: String,
    padding: Insets,
    background: Color,
    hover_color: Color,
    active_color: Color,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: WidgetPod::new(Label::new(text.clone())),
            text,
            padding: Insets::uniform(10.0),
            background: Color::from_rgb_u8(60, 60, 80),
            hover_color: Color::from_rgb_u8(80, 80, 100),
            active_color: Color::from_rgb_u8(40, 40, 60),
        }
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn hover_color(mut self, color: Color) -> Self {
        self.hover_color = color;
        self
    }

    pub fn padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn label_id(&self) -> WidgetId {
        self.label.id()
    }

    pub fn set_text(this: &mut WidgetMut<'_, Self>, text: impl Into<String>) {
        let text = text.into();
        if this.widget.text == text {
            return;
        }
        this.widget.text = text.clone();
        this.ctx
            .mutate_child(&mut this.widget.label, |mut label| Label::set_text(&mut label, text));
        this.ctx.request_accessibility();
    }

    fn current_background(&self, pressed: bool, hovered: bool) -> Color {
        if pressed {
            self.active_color
        } else if hovered {
            self.hover_color
        } else {
            self.background
        }
    }
}

impl Widget for Button {
    fn on_pointer_event(&mut self, ctx: &mut EventCtx<'_>, event: &PointerEvent) {
        match event {
            PointerEvent::Down(PointerButton::Primary, _) => {
                ctx.capture_pointer();
                ctx.request_paint();
                ctx.set_handled();
            }
            PointerEvent::Up(button, _) => {
                if ctx.has_pointer_capture() {
                    if ctx.is_hovered() {
                        ctx.submit_action(Action::ButtonPressed(Some(*button)));
                    }
                    ctx.request_paint();
                    ctx.set_handled();
                }
            }
            PointerEvent::Leave(_) | PointerEvent::Cancel(_) => ctx.request_paint(),
            _ => {}
        }
    }

    fn on_text_event(&mut self, ctx: &mut EventCtx<'_>, event: &TextEvent) {
        if let TextEvent::Key(KeyEvent {
            key: Key::Enter | Key::Space,
            pressed: true,
            ..
        }) = event
        {
            ctx.submit_action(Action::ButtonPressed(None));
            ctx.set_handled();
        }
    }

    fn on_access_event(&mut self, ctx: &mut EventCtx<'_>, event: &AccessEvent) {
        if event.action == AccessAction::Click {
            ctx.submit_action(Action::ButtonPressed(None));
            ctx.set_handled();
        }
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>, event: &Update) {
        match event {
            Update::HoveredChanged(_) | Update::FocusChanged(_) | Update::DisabledChanged(_) => {
                ctx.request_paint();
            }
            _ => {}
        }
    }

    fn register_children(&mut self, ctx: &mut RegisterCtx<'_>) {
        if !self.label.is_inserted() {
            ctx.register_child(&mut self.label);
        }
    }

    fn layout(&mut self, ctx: &mut LayoutCtx<'_>, bc: &BoxConstraints) -> Size<f32> {
        let padding = self.padding;
        let label_bc = bc
            .shrink(padding.x_value(), padding.y_value())
            .loosen();
        let label_size = ctx.run_layout(&mut self.label, &label_bc);
        ctx.place_child(&mut self.label, Vec2::new(padding.left, padding.top));
        bc.constrain(Size::new(
            label_size.width + padding.x_value(),
            label_size.height + padding.y_value(),
        ))
    }

    fn paint(&mut self, ctx: &mut PaintCtx<'_>, scene: &mut Scene) {
        let bounds = ctx.size().to_rect();
        let background = if ctx.is_disabled() {
            self.background.with_alpha(0.5)
        } else {
            self.current_background(ctx.has_pointer_capture(), ctx.is_hovered())
        };
        scene.fill_rounded_rect(bounds, background, 4.0);
        if ctx.is_focused() {
            scene.stroke_rect(bounds, Color::WHITE, 1.0);
        }
    }

    fn accessibility_role(&self) -> Role {
        Role::Button
    }

    fn accessibility(&mut self, _ctx: &mut AccessCtx<'_>, node: &mut AccessNode) {
        node.set_label(self.text.clone());
    }

    fn children_ids(&self) -> ChildrenIds {
        smallvec![self.label.id()]
    }

    fn accepts_focus(&self) -> bool {
        true
    }

    fn get_debug_text(&self) -> Option<String> {
        Some(self.text.clone())
    }
}
