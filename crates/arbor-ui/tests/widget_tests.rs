//! Tests for the built-in widgets, driven through the headless harness.

use arbor_test_utils::TestHarness;
use arbor_ui::access::{AccessFlags, Role};
use arbor_ui::event::{AccessAction, AccessEvent, Action, Key, PointerButton};
use arbor_ui::widget::WidgetPod;
use arbor_ui::widgets::{Button, Flex, Label, Portal, SizedBox};
use arbor_ui::{Size, Vec2};

fn button_in_column() -> (TestHarness, arbor_ui::WidgetId) {
    let button = WidgetPod::new(Button::new("OK"));
    let id = button.id();
    let harness = TestHarness::create(Flex::column().with_child_pod(button.erased()));
    (harness, id)
}

/// A portal over twenty 50px rows in a 400x200 window.
fn scrolling_list() -> (TestHarness, Vec<arbor_ui::WidgetId>) {
    let rows: Vec<_> = (0..20)
        .map(|_| WidgetPod::new(SizedBox::empty().height(50.0)))
        .collect();
    let ids = rows.iter().map(|row| row.id()).collect();
    let column = rows
        .into_iter()
        .fold(Flex::column(), |column, row| column.with_child_pod(row.erased()));
    let harness = TestHarness::create_with_size(Portal::new(column), Size::new(400.0, 200.0));
    (harness, ids)
}

fn portal_offset(harness: &TestHarness) -> Vec2 {
    harness.get_widget_as::<Portal>(harness.root_id()).inner().offset()
}

#[test]
fn test_button_click_submits_action() {
    let (mut harness, button) = button_in_column();

    harness.mouse_click_on(button);
    assert_eq!(
        harness.pop_action(),
        Some((Action::ButtonPressed(Some(PointerButton::Primary)), button))
    );
    assert_eq!(harness.pop_action(), None);
    assert_eq!(harness.pointer_capture_target(), None);
}

#[test]
fn test_button_release_outside_does_nothing() {
    let (mut harness, button) = button_in_column();

    harness.mouse_move_to(button);
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(harness.pointer_capture_target(), Some(button));

    harness.mouse_move(Vec2::new(300.0, 300.0));
    assert!(!harness.get_widget(button).state().is_hovered());
    harness.mouse_button_release(PointerButton::Primary);
    assert_eq!(harness.pop_action(), None);
}

#[test]
fn test_button_keyboard_and_access_activation() {
    let (mut harness, button) = button_in_column();

    harness.focus_on(button);
    harness.keyboard_type_key(Key::Enter);
    assert_eq!(harness.pop_action(), Some((Action::ButtonPressed(None), button)));

    harness.access_click(button);
    assert_eq!(harness.pop_action(), Some((Action::ButtonPressed(None), button)));
}

#[test]
fn test_disabled_button_ignores_clicks() {
    let (mut harness, button) = button_in_column();
    harness.edit_widget(button, |mut widget| widget.ctx.set_disabled(true));

    harness.mouse_click_on(button);
    assert_eq!(harness.pop_action(), None);
    assert_eq!(harness.pointer_capture_target(), None);
}

#[test]
fn test_button_set_text_updates_label() {
    let (mut harness, button) = button_in_column();
    let label = harness.get_widget_as::<Button>(button).inner().label_id();
    let width_before = harness.get_widget(button).state().size().width;

    harness.edit_widget(button, |mut widget| {
        Button::set_text(&mut widget.downcast::<Button>(), "Cancel");
    });
    assert_eq!(harness.get_widget_as::<Label>(label).inner().text(), "Cancel");
    assert!(harness.get_widget(button).state().size().width > width_before);
}

#[test]
fn test_access_tree_mirrors_widgets() {
    let (mut harness, button) = button_in_column();
    harness.focus_on(button);
    let (_, tree) = harness.render();

    assert_eq!(tree.root, Some(harness.root_id()));
    assert_eq!(tree.focus, Some(button));
    let node = tree.get(button).expect("button node");
    assert_eq!(node.role, Role::Button);
    assert_eq!(node.label.as_deref(), Some("OK"));
    assert!(node.flags.contains(AccessFlags::FOCUSABLE | AccessFlags::FOCUSED));
    assert_eq!(node.children.len(), 1);

    let root = tree.get(harness.root_id()).expect("root node");
    assert_eq!(root.children, vec![button]);
}

#[test]
fn test_draw_list_skips_stashed_widgets() {
    let label = WidgetPod::new(Label::new("hidden"));
    let label_id = label.id();
    let mut harness = TestHarness::create(
        Flex::column()
            .with_child_pod(label.erased())
            .with_child(Label::new("shown")),
    );
    let (draw_list, _) = harness.render();
    assert!(draw_list.painted_widgets().contains(&label_id));

    harness.edit_root_widget(|mut root| Flex::set_child_stashed(&mut root.downcast(), 0, true));
    let (draw_list, tree) = harness.render();
    assert!(!draw_list.painted_widgets().contains(&label_id));
    assert!(tree.get(label_id).is_none());
}

#[test]
fn test_portal_scrolls_without_layout() {
    let (mut harness, rows) = scrolling_list();
    let content = harness.get_widget(rows[0]).state().parent().expect("rows live in a column");

    harness.mouse_move(Vec2::new(10.0, 10.0));
    harness.mouse_wheel(Vec2::new(0.0, 100.0));
    assert_eq!(portal_offset(&harness), Vec2::new(0.0, 100.0));
    assert_eq!(harness.render_root().last_metrics().widgets_laid_out, 0);
    assert_eq!(
        harness.get_widget(content).state().window_origin(),
        Vec2::new(0.0, -100.0)
    );
    assert_eq!(
        harness.pop_action(),
        Some((Action::Scrolled(Vec2::new(0.0, 100.0)), harness.root_id()))
    );

    // Clamped to the content.
    harness.mouse_wheel(Vec2::new(0.0, 10_000.0));
    assert_eq!(portal_offset(&harness), Vec2::new(0.0, 800.0));
}

#[test]
fn test_scroll_into_view_pans_portal() {
    let (mut harness, rows) = scrolling_list();

    harness.process_access_event(AccessEvent::new(AccessAction::ScrollIntoView).on(rows[10]));
    // Row 10 spans 500..550; the viewport is 200 tall.
    assert_eq!(portal_offset(&harness), Vec2::new(0.0, 350.0));
    let origin = harness.get_widget(rows[10]).state().window_origin();
    assert_eq!(origin, Vec2::new(0.0, 150.0));
}

#[test]
fn test_sized_box_fixes_child_size() {
    let label = WidgetPod::new(Label::new("hi"));
    let label_id = label.id();
    let mut harness = TestHarness::create(
        Flex::column().with_child(SizedBox::new_pod(label).width(120.0).height(30.0)),
    );
    assert_eq!(
        harness.get_widget(label_id).state().size(),
        Size::new(120.0, 30.0)
    );

    let sized_box = harness.get_widget(label_id).state().parent().expect("label has a parent");
    harness.edit_widget(sized_box, |mut widget| {
        SizedBox::set_width(&mut widget.downcast::<SizedBox>(), Some(60.0));
    });
    assert_eq!(
        harness.get_widget(label_id).state().size(),
        Size::new(60.0, 30.0)
    );
}
