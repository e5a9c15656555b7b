//! Benchmarks for the rewrite and render passes over trees of varying size

use arbor_core::config::Config;
use arbor_ui::event::{PointerEvent, PointerInfo, WindowEvent};
use arbor_ui::widget::WidgetPod;
use arbor_ui::widgets::{Flex, Label, Portal};
use arbor_ui::{RenderRoot, RenderRootOptions, Size, Vec2, WidgetId};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const SIZES: [usize; 3] = [10, 100, 1000];

/// A scrollable column of `count` labels, returning the root and label ids.
fn label_column(count: usize) -> (RenderRoot, Vec<WidgetId>) {
    let labels: Vec<_> = (0..count)
        .map(|i| WidgetPod::new(Label::new(format!("Item {}", i))))
        .collect();
    let ids = labels.iter().map(|label| label.id()).collect();
    let column = labels
        .into_iter()
        .fold(Flex::column(), |column, label| column.with_child_pod(label.erased()));
    let options = RenderRootOptions::default().with_initial_size(Size::new(800.0, 600.0));
    (RenderRoot::new(Portal::new(column), options), ids)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");

    for count in SIZES {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(label_column(count)));
        });
    }

    group.finish();
}

fn bench_single_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_label_edit");

    for count in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (mut root, ids) = label_column(count);
            let target = ids[count / 2];
            let mut counter = 0_u64;

            b.iter(|| {
                counter += 1;
                root.edit_widget(target, |mut widget| {
                    Label::set_text(&mut widget.downcast::<Label>(), format!("Edited {}", counter));
                });
                black_box(root.last_metrics().widgets_laid_out)
            });
        });
    }

    group.finish();
}

fn bench_external_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("external_mutations");

    for count in SIZES {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (mut root, ids) = label_column(count);
            let mutator = root.external_mutator();

            b.iter(|| {
                for id in &ids {
                    mutator.mutate_later::<Label>(*id, |mut label| label.ctx.request_paint());
                }
                root.run_rewrite_passes();
                black_box(root.last_metrics().mutations_applied)
            });
        });
    }

    group.finish();
}

fn bench_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("redraw");

    for count in SIZES {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("clean", count), &count, |b, &count| {
            let (mut root, _) = label_column(count);
            root.redraw();
            b.iter(|| black_box(root.redraw()));
        });

        group.bench_with_input(BenchmarkId::new("one_dirty", count), &count, |b, &count| {
            let (mut root, ids) = label_column(count);
            let target = ids[count / 2];
            root.redraw();

            b.iter(|| {
                root.edit_widget(target, |mut widget| widget.ctx.request_paint());
                black_box(root.redraw())
            });
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_relayout");

    for count in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (mut root, _) = label_column(count);
            let sizes = [Size::new(800.0, 600.0), Size::new(640.0, 480.0)];
            let mut i = 0;

            b.iter(|| {
                i += 1;
                root.handle_window_event(WindowEvent::Resize(sizes[i % 2]));
                black_box(root.last_metrics().widgets_laid_out)
            });
        });
    }

    group.finish();
}

fn bench_pointer_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer_move");

    for count in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (mut root, _) = label_column(count);
            let mut y = 0.0_f32;

            b.iter(|| {
                y = (y + 7.0) % 600.0;
                let event = PointerEvent::Move(PointerInfo::primary(Vec2::new(20.0, y)));
                black_box(root.handle_pointer_event(event))
            });
        });
    }

    group.finish();
}

/// `ARBOR_PROFILE=1` serves puffin scopes while the benches run.
fn configure() -> Criterion {
    Config::from_env().apply();
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = configure();
    targets =
        bench_build,
        bench_single_edit,
        bench_external_mutations,
        bench_redraw,
        bench_resize,
        bench_pointer_move
}
criterion_main!(benches);
