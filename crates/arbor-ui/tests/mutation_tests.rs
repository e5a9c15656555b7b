//! Mutation queue tests: deferred callbacks from widgets and other threads,
//! stale targets and subtree removal.

use arbor_test_utils::{ModularWidget, TestHarness};
use arbor_ui::event::{PointerButton, PointerEvent, RenderRootSignal};
use arbor_ui::widget::WidgetPod;
use arbor_ui::widget_id::WidgetId;
use arbor_ui::widgets::{Button, Flex, Label, SizedBox};
use arbor_ui::{Size, Vec2};

fn label_text(harness: &TestHarness, id: WidgetId) -> String {
    harness.get_widget_as::<Label>(id).inner().text().to_owned()
}

#[test]
fn test_mutate_later_from_event_handler() {
    let label = WidgetPod::new(Label::new("idle"));
    let label_id = label.id();
    let clicker = ModularWidget::new(label_id)
        .layout_fn(|_, _, bc| bc.constrain(Size::new(100.0, 40.0)))
        .pointer_event_fn(|target, ctx, event| {
            if let PointerEvent::Down(..) = event {
                ctx.mutate_later::<Label>(*target, |mut label| Label::set_text(&mut label, "clicked"));
                ctx.set_handled();
            }
        });
    let mut harness = TestHarness::create(
        Flex::column()
            .with_child(clicker)
            .with_child_pod(label.erased()),
    );

    harness.mouse_move(Vec2::new(10.0, 10.0));
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(label_text(&harness, label_id), "clicked");
    assert_eq!(harness.render_root().last_metrics().mutations_applied, 1);
}

#[test]
fn test_external_mutation_from_another_thread() {
    let label = WidgetPod::new(Label::new("before"));
    let label_id = label.id();
    let mut harness = TestHarness::create(Flex::column().with_child_pod(label.erased()));
    harness.drain_signals();

    let mutator = harness.render_root().external_mutator();
    let sent = std::thread::spawn(move || {
        mutator.mutate_later::<Label>(label_id, |mut label| Label::set_text(&mut label, "after"))
    })
    .join()
    .expect("mutator thread panicked");
    assert!(sent);
    assert!(harness.render_root().needs_rewrite_passes());

    harness.run_rewrite_passes();
    assert_eq!(label_text(&harness, label_id), "after");
    assert!(harness.has_signal(&RenderRootSignal::RequestRedraw));
}

#[test]
fn test_external_mutator_outlives_root() {
    let mutator = {
        let harness = TestHarness::create(Label::new("short-lived"));
        harness.render_root().external_mutator()
    };
    assert!(!mutator.mutate_later::<Label>(WidgetId::next(), |_| {}));
}

#[test]
fn test_stale_mutation_is_dropped() {
    let label = WidgetPod::new(Label::new("doomed"));
    let label_id = label.id();
    let mut harness = TestHarness::create(Flex::column().with_child_pod(label.erased()));

    let mutator = harness.render_root().external_mutator();
    assert!(mutator.mutate_later::<Label>(label_id, |mut label| {
        Label::set_text(&mut label, "too late");
    }));
    // Removal happens before the rewrite passes drain the queue.
    harness.edit_root_widget(|mut root| Flex::remove_child(&mut root.downcast(), 0));

    assert!(!harness.render_root().contains(label_id));
    let metrics = harness.render_root().last_metrics();
    assert_eq!(metrics.mutations_dropped, 1);
    assert_eq!(metrics.mutations_applied, 0);
}

#[test]
fn test_mutations_run_in_queue_order() {
    let label = WidgetPod::new(Label::new("0"));
    let label_id = label.id();
    let mut harness = TestHarness::create(Flex::column().with_child_pod(label.erased()));

    let mutator = harness.render_root().external_mutator();
    for text in ["1", "2", "3"] {
        mutator.mutate_later::<Label>(label_id, move |mut label| Label::set_text(&mut label, text));
    }
    harness.run_rewrite_passes();
    assert_eq!(label_text(&harness, label_id), "3");
    assert_eq!(harness.render_root().last_metrics().mutations_applied, 3);
}

#[test]
fn test_subtree_removal_clears_references() {
    let button = WidgetPod::new(Button::new("Remove me"));
    let button_id = button.id();
    let mut harness = TestHarness::create(SizedBox::new(Flex::column().with_child_pod(button.erased())));
    let label_id = harness.get_widget_as::<Button>(button_id).inner().label_id();
    let widgets_before = harness.render_root().widget_ids().len();

    harness.focus_on(button_id);
    harness.mouse_move_to(button_id);
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(harness.focused_widget(), Some(button_id));
    assert_eq!(harness.hovered_widget(), Some(button_id));
    assert_eq!(harness.pointer_capture_target(), Some(button_id));

    harness.edit_root_widget(|mut root| SizedBox::remove_child(&mut root.downcast()));

    let root = harness.render_root();
    assert!(!root.contains(button_id));
    assert!(!root.contains(label_id));
    assert_eq!(root.widget_ids().len(), widgets_before - 3);
    assert_eq!(harness.focused_widget(), None);
    assert_eq!(harness.pointer_capture_target(), None);
    assert_eq!(harness.hovered_widget(), Some(harness.root_id()));
    assert!(harness.render_root().focus_chain().is_empty());
}

#[test]
fn test_children_can_be_added_at_runtime() {
    let mut harness = TestHarness::create(Flex::row().with_spacing(4.0));
    let ids: Vec<WidgetId> = ["a", "b"]
        .into_iter()
        .map(|text| {
            harness.edit_root_widget(|mut root| Flex::add_child(&mut root.downcast(), Label::new(text)))
        })
        .collect();

    let first = harness.get_widget(ids[0]).state().layout_rect();
    let second = harness.get_widget(ids[1]).state().layout_rect();
    assert_eq!(first.x, 0.0);
    assert_eq!(second.x, first.width + 4.0);

    harness.edit_root_widget(|mut root| Flex::clear(&mut root.downcast()));
    assert!(ids.iter().all(|id| !harness.render_root().contains(*id)));
    assert_eq!(harness.render_root().widget_ids().len(), 1);
}

#[test]
fn test_edit_unknown_widget_returns_none() {
    let mut harness = TestHarness::create(Label::new("root"));
    let missing = WidgetId::next();
    assert!(harness.render_root_mut().edit_widget(missing, |_| ()).is_none());
    assert!(harness.try_get_widget(missing).is_none());
}
