//! Pointer routing tests: hit testing, hover tracking and pointer capture.

use arbor_test_utils::{ModularWidget, Record, RecordExt, Recording, TestHarness};
use arbor_ui::event::{PointerButton, PointerEvent, Update};
use arbor_ui::widget::{Widget, WidgetPod};
use arbor_ui::widget_id::WidgetId;
use arbor_ui::{Size, Vec2};

type Column = ModularWidget<Vec<WidgetPod<dyn Widget>>>;

const OVER_A: Vec2 = Vec2::new(10.0, 10.0);
const OVER_B: Vec2 = Vec2::new(10.0, 50.0);

/// A 100x40 leaf that captures the pointer on a primary press.
fn pressable(recording: &Recording) -> WidgetPod<dyn Widget> {
    let widget = ModularWidget::new(())
        .layout_fn(|_, _, bc| bc.constrain(Size::new(100.0, 40.0)))
        .pointer_event_fn(|_, ctx, event| {
            if let PointerEvent::Down(PointerButton::Primary, _) = event {
                ctx.capture_pointer();
                ctx.set_handled();
            }
        })
        .record(recording);
    WidgetPod::new(widget).erased()
}

struct Setup {
    harness: TestHarness,
    a: WidgetId,
    b: WidgetId,
    rec_a: Recording,
    rec_b: Recording,
}

/// Two pressables stacked vertically: `a` covers y 0..40, `b` covers 40..80.
fn setup_with_root(make_root: impl FnOnce(Vec<WidgetPod<dyn Widget>>) -> Column) -> Setup {
    let rec_a = Recording::new();
    let rec_b = Recording::new();
    let pod_a = pressable(&rec_a);
    let pod_b = pressable(&rec_b);
    let (a, b) = (pod_a.id(), pod_b.id());
    let harness = TestHarness::create(make_root(vec![pod_a, pod_b]));
    rec_a.clear();
    rec_b.clear();
    Setup {
        harness,
        a,
        b,
        rec_a,
        rec_b,
    }
}

fn setup() -> Setup {
    setup_with_root(Column::new_multi_parent)
}

fn pointer_events(recording: &Recording) -> Vec<PointerEvent> {
    recording
        .drain()
        .into_iter()
        .filter_map(|record| match record {
            Record::PointerEvent(event) => Some(event),
            _ => None,
        })
        .collect()
}

#[test]
fn test_hover_follows_pointer() {
    let Setup {
        mut harness,
        a,
        b,
        rec_a,
        rec_b,
    } = setup();

    harness.mouse_move(OVER_A);
    assert_eq!(harness.hovered_widget(), Some(a));
    assert!(harness.get_widget(a).state().is_hovered());
    assert!(harness.root_widget().state().has_hovered());
    assert_eq!(rec_a.updates(), vec![Update::HoveredChanged(true)]);

    rec_a.clear();
    harness.mouse_move(OVER_B);
    assert_eq!(harness.hovered_widget(), Some(b));
    assert_eq!(rec_a.updates(), vec![Update::HoveredChanged(false)]);
    assert!(rec_b.updates().contains(&Update::HoveredChanged(true)));

    harness.mouse_leave();
    assert_eq!(harness.hovered_widget(), None);
    assert!(!harness.root_widget().state().has_hovered());
}

#[test]
fn test_hit_testing_skips_empty_space() {
    let Setup {
        mut harness, a, b, ..
    } = setup();
    harness.mouse_move(Vec2::new(300.0, 300.0));
    let hovered = harness.hovered_widget();
    assert_ne!(hovered, Some(a));
    assert_ne!(hovered, Some(b));
    assert_eq!(hovered, Some(harness.root_id()));
}

#[test]
fn test_capture_routes_events_to_holder() {
    let Setup {
        mut harness,
        a,
        b,
        rec_a,
        rec_b,
    } = setup();

    harness.mouse_move(OVER_A);
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(harness.pointer_capture_target(), Some(a));
    assert!(harness.get_widget(a).state().has_pointer_capture());

    rec_a.clear();
    rec_b.clear();
    harness.mouse_move(OVER_B);
    // While captured, only the holder can be hovered.
    assert_eq!(harness.hovered_widget(), None);
    assert!(matches!(
        pointer_events(&rec_a).as_slice(),
        [PointerEvent::Move(_)]
    ));
    assert!(pointer_events(&rec_b).is_empty());

    harness.mouse_button_release(PointerButton::Primary);
    assert_eq!(harness.pointer_capture_target(), None);
    assert!(!harness.get_widget(a).state().has_pointer_capture());
    assert_eq!(harness.hovered_widget(), Some(b));
    // Release on Up is silent.
    assert!(matches!(
        pointer_events(&rec_a).as_slice(),
        [PointerEvent::Up(..)]
    ));
}

#[test]
fn test_capture_is_unique_per_pointer() {
    // The root steals the pointer when a scroll bubbles up to it.
    let Setup {
        mut harness,
        a,
        rec_a,
        ..
    } = setup_with_root(|children| {
        Column::new_multi_parent(children).pointer_event_fn(|_, ctx, event| {
            if let PointerEvent::Scroll(..) = event {
                ctx.capture_pointer();
                ctx.set_handled();
            }
        })
    });
    let root = harness.root_id();

    harness.mouse_move(OVER_A);
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(harness.pointer_capture_target(), Some(a));

    rec_a.clear();
    harness.mouse_wheel(Vec2::new(0.0, 10.0));
    assert_eq!(harness.pointer_capture_target(), Some(root));
    assert!(!harness.get_widget(a).state().has_pointer_capture());
    assert!(matches!(
        pointer_events(&rec_a).as_slice(),
        [PointerEvent::Scroll(..), PointerEvent::Leave(_)]
    ));
}

#[test]
fn test_capture_released_on_window_focus_loss() {
    let Setup {
        mut harness,
        a,
        rec_a,
        ..
    } = setup();
    harness.mouse_move(OVER_A);
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(harness.pointer_capture_target(), Some(a));

    rec_a.clear();
    harness.set_window_focused(false);
    assert_eq!(harness.pointer_capture_target(), None);
    assert!(matches!(
        pointer_events(&rec_a).as_slice(),
        [PointerEvent::Leave(info)] if info.position == OVER_A
    ));
}

#[test]
fn test_capture_released_on_disable() {
    let Setup {
        mut harness,
        a,
        rec_a,
        ..
    } = setup();
    harness.mouse_move(OVER_A);
    harness.mouse_button_press(PointerButton::Primary);

    rec_a.clear();
    harness.edit_widget(a, |mut widget| widget.ctx.set_disabled(true));
    assert_eq!(harness.pointer_capture_target(), None);
    assert!(matches!(
        pointer_events(&rec_a).as_slice(),
        [PointerEvent::Leave(_)]
    ));

    // Disabled widgets are skipped by dispatch.
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(harness.pointer_capture_target(), None);
    assert!(pointer_events(&rec_a).is_empty());
}

#[test]
fn test_cancel_releases_with_leave() {
    let Setup {
        mut harness, rec_a, ..
    } = setup();
    harness.mouse_move(OVER_A);
    harness.mouse_button_press(PointerButton::Primary);

    rec_a.clear();
    harness.pointer_cancel();
    assert_eq!(harness.pointer_capture_target(), None);
    assert_eq!(harness.hovered_widget(), None);
    assert!(matches!(
        pointer_events(&rec_a).as_slice(),
        [PointerEvent::Cancel(_), PointerEvent::Leave(_)]
    ));
}

#[test]
fn test_removing_holder_clears_capture_and_hover() {
    let Setup { mut harness, a, .. } = setup();
    harness.mouse_move(OVER_A);
    harness.mouse_button_press(PointerButton::Primary);
    assert_eq!(harness.hovered_widget(), Some(a));

    harness.edit_root_widget(|mut root| {
        let mut column = root.downcast::<Column>();
        let pod = column.widget.state_mut().remove(0);
        column.ctx.remove_child(pod);
    });
    assert!(!harness.render_root().contains(a));
    assert_eq!(harness.pointer_capture_target(), None);
    assert_ne!(harness.hovered_widget(), Some(a));
}

#[test]
fn test_stashed_widgets_are_not_hit() {
    let Setup {
        mut harness, a, ..
    } = setup();
    harness.edit_root_widget(|mut root| {
        let mut column = root.downcast::<Column>();
        let pod = &mut column.widget.state_mut()[0];
        column.ctx.set_stashed(pod, true);
    });
    assert!(harness.get_widget(a).state().is_stashed());

    harness.mouse_move(OVER_A);
    assert_ne!(harness.hovered_widget(), Some(a));
}

#[test]
fn test_ancestor_removes_child_gaining_hover() {
    let Setup {
        mut harness,
        a,
        b,
        rec_b,
        ..
    } = setup_with_root(|children| {
        let doomed = children[0].id();
        Column::new_multi_parent(children).update_fn(move |children, ctx, event| {
            if *event == Update::ChildHoveredChanged(true) {
                if let Some(idx) = children.iter().position(|child| child.id() == doomed) {
                    ctx.remove_child(children.remove(idx));
                }
            }
        })
    });

    harness.mouse_move_to(a);
    assert!(!harness.render_root().contains(a));
    // `b` moved up under the pointer once the column was laid out again.
    assert_eq!(harness.hovered_widget(), Some(b));
    assert!(harness.get_widget(b).state().is_hovered());
    assert!(harness.root_widget().state().has_hovered());
    assert_eq!(rec_b.updates(), vec![Update::HoveredChanged(true)]);
}
