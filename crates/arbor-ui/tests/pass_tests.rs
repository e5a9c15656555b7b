//! Pass scheduler tests: pass ordering, dirty-flag pruning, the rerun cap
//! and the layout rails.

use arbor_test_utils::{ModularWidget, Record, RecordExt, Recording, TestHarness};
use arbor_ui::event::{RenderRootSignal, Update};
use arbor_ui::render_root::RenderRootOptions;
use arbor_ui::widget::{Widget, WidgetPod};
use arbor_ui::widgets::{Flex, Label};
use arbor_ui::{Size, Vec2};

type Parent = ModularWidget<WidgetPod<dyn Widget>>;

#[test]
fn test_widget_added_before_first_layout() {
    let recording = Recording::new();
    let _harness = TestHarness::create(Label::new("hello").record(&recording));

    assert_eq!(recording.next(), Some(Record::RegisterChildren));
    assert_eq!(recording.next(), Some(Record::Update(Update::WidgetAdded)));
    assert!(matches!(recording.next(), Some(Record::Layout(_))));
}

#[test]
fn test_added_child_gets_widget_added_before_layout() {
    let mut harness = TestHarness::create(Flex::column().with_child(Label::new("first")));

    let recording = Recording::new();
    let child_id = harness.edit_root_widget(|mut root| {
        let mut flex = root.downcast::<Flex>();
        Flex::add_child(&mut flex, Label::new("second").record(&recording))
    });

    assert!(harness.render_root().contains(child_id));
    assert_eq!(recording.next(), Some(Record::RegisterChildren));
    assert_eq!(recording.next(), Some(Record::Update(Update::WidgetAdded)));
    assert!(matches!(recording.next(), Some(Record::Layout(_))));
}

#[test]
fn test_rewrite_passes_are_idempotent() {
    let recording = Recording::new();
    let mut harness = TestHarness::create(
        Flex::column()
            .with_child(Label::new("a").record(&recording))
            .with_child(Label::new("b")),
    );
    recording.clear();

    assert!(!harness.render_root().needs_rewrite_passes());
    harness.run_rewrite_passes();
    harness.run_rewrite_passes();
    assert!(recording.is_empty());
}

#[test]
fn test_paint_only_change_skips_layout() {
    let recording = Recording::new();
    let label = WidgetPod::new(Label::new("a").record(&recording));
    let label_id = label.id();
    let mut harness = TestHarness::create(Flex::column().with_child_pod(label.erased()));
    harness.render();
    harness.drain_signals();
    recording.clear();

    harness.edit_widget(label_id, |mut widget| widget.ctx.request_paint());
    assert_eq!(recording.count_layouts(), 0);
    assert!(harness.has_signal(&RenderRootSignal::RequestRedraw));

    harness.render();
    assert_eq!(recording.count_paints(), 1);
}

#[test]
fn test_reposition_without_layout() {
    let recording = Recording::new();
    let child = ModularWidget::new(())
        .layout_fn(|_, _, bc| bc.constrain(Size::new(10.0, 10.0)))
        .record(&recording);
    let child = WidgetPod::new(child);
    let child_id = child.id();
    let mut harness = TestHarness::create(Parent::new_parent_pod(child.erased()));
    recording.clear();

    harness.edit_root_widget(|mut root| {
        let mut parent = root.downcast::<Parent>();
        let pod = parent.widget.state();
        if let Some(state) = parent.ctx.raw_child_state_mut(pod) {
            state.set_origin(Vec2::new(30.0, 40.0));
        }
        parent.ctx.request_compose();
    });

    assert_eq!(recording.count_layouts(), 0);
    assert!(recording.drain().contains(&Record::Compose));
    let state = harness.get_widget(child_id).state();
    assert_eq!(state.window_origin(), Vec2::new(30.0, 40.0));
    assert_eq!(harness.render_root().last_metrics().widgets_laid_out, 0);
}

#[test]
fn test_rerun_cap_defers_remaining_work() {
    // Every layout queues a mutation that requests another layout.
    let recording = Recording::new();
    let widget = ModularWidget::new(())
        .layout_fn(|_, ctx, bc| {
            let id = ctx.widget_id();
            ctx.mutate_later::<dyn Widget>(id, |mut widget| widget.ctx.request_layout());
            bc.min()
        })
        .record(&recording);
    let options = RenderRootOptions::default().with_max_rewrite_passes(3);
    let mut harness = TestHarness::create_with_options(widget, options);

    let metrics = harness.render_root().last_metrics();
    assert_eq!(metrics.rewrite_iterations, 3);
    assert!(metrics.deferred);
    assert_eq!(recording.count_layouts(), 3);
    assert!(harness.has_signal(&RenderRootSignal::RequestAnimFrame));
    assert!(harness.render_root().needs_rewrite_passes());

    // The next frame picks the work up again, still bounded.
    recording.clear();
    harness.animate_ms(16);
    assert_eq!(recording.count_layouts(), 3);
    assert!(harness.render_root().last_metrics().deferred);
}

#[test]
fn test_layout_cache_survives_sibling_change() {
    let recording = Recording::new();
    let first = WidgetPod::new(Label::new("first"));
    let first_id = first.id();
    let mut harness = TestHarness::create(
        Flex::column()
            .with_child_pod(first.erased())
            .with_child(Label::new("second").record(&recording)),
    );
    recording.clear();

    harness.edit_widget(first_id, |mut widget| {
        Label::set_text(&mut widget.downcast::<Label>(), "changed");
    });
    assert_eq!(recording.count_layouts(), 0);
    let metrics = harness.render_root().last_metrics();
    assert_eq!(metrics.widgets_laid_out, 2);
    assert_eq!(metrics.layout_skips, 1);
}

#[test]
fn test_stash_round_trip_restores_layout() {
    let mut harness = TestHarness::create(
        Flex::column()
            .with_child(Label::new("a"))
            .with_child(Label::new("b")),
    );
    let flex = harness.root_widget().downcast::<Flex>().map(|flex| {
        (flex.inner().child_id(0), flex.inner().child_id(1))
    });
    let Some((Some(a), Some(b))) = flex else {
        panic!("root should be a flex with two children");
    };
    let b_origin = harness.get_widget(b).state().origin();

    harness.edit_root_widget(|mut root| Flex::set_child_stashed(&mut root.downcast(), 0, true));
    assert!(harness.get_widget(a).state().is_stashed());
    assert_eq!(harness.get_widget(b).state().origin(), Vec2::ZERO);

    harness.edit_root_widget(|mut root| Flex::set_child_stashed(&mut root.downcast(), 0, false));
    assert!(!harness.get_widget(a).state().is_stashed());
    assert_eq!(harness.get_widget(b).state().origin(), b_origin);
}

#[test]
#[should_panic(expected = "did not call run_layout")]
fn test_skipping_child_layout_panics() {
    let parent = Parent::new_parent(Label::new("orphan")).layout_fn(|_, _, bc| bc.min());
    let _harness = TestHarness::create(parent);
}

#[test]
fn test_anim_frames_reach_requesting_widget() {
    let recording = Recording::new();
    let widget = ModularWidget::new(0_u32)
        .update_fn(|_, ctx, event| {
            if *event == Update::WidgetAdded {
                ctx.request_anim_frame();
            }
        })
        .anim_frame_fn(|frames, ctx, _| {
            *frames += 1;
            if *frames < 2 {
                ctx.request_anim_frame();
            }
        })
        .record(&recording);
    let mut harness = TestHarness::create(widget);
    assert!(harness.has_signal(&RenderRootSignal::RequestAnimFrame));
    harness.drain_signals();

    harness.animate_ms(16);
    assert!(harness.has_signal(&RenderRootSignal::RequestAnimFrame));
    harness.drain_signals();
    harness.animate_ms(16);
    assert!(!harness.has_signal(&RenderRootSignal::RequestAnimFrame));

    let frames = recording.count(|record| matches!(record, Record::AnimFrame(_)));
    assert_eq!(frames, 2);
    assert!(recording.drain().contains(&Record::AnimFrame(16_000_000)));
}
