use criterion::{Criterion, criterion_group, criterion_main};
use gantt_rs::api::{GanttConfig, GanttEngine};
use gantt_rs::core::{JobNode, TimeRange, TimeScale, TimeUnit, Timestamp, parse_timestamp};
use gantt_rs::hierarchy::{JobTree, flatten};
use gantt_rs::render::NullRenderer;
use gantt_rs::state::ExpandState;
use std::hint::black_box;

fn ts(input: &str) -> Timestamp {
    Timestamp::parse(input).expect("valid timestamp")
}

fn generated_jobs(groups: usize, children: usize) -> Vec<JobNode> {
    let base = parse_timestamp("2024-01-01 00:00").expect("valid base");
    (0..groups)
        .map(|group| {
            let kids = (0..children)
                .map(|child| {
                    let offset = (group * children + child) as i64;
                    let start = base + chrono::TimeDelta::minutes(offset * 7);
                    let end = start + chrono::TimeDelta::minutes(45);
                    JobNode::new(format!("job-{group}-{child}"), format!("Job {group}.{child}"))
                        .with_span(Timestamp(start), Timestamp(end))
                        .with_status(if child % 2 == 0 { "completed" } else { "pending" })
                })
                .collect();
            JobNode::new(format!("group-{group}"), format!("Group {group}")).with_children(kids)
        })
        .collect()
}

fn bench_time_scale_columns_week_of_minutes(c: &mut Criterion) {
    let range = TimeRange::new(
        parse_timestamp("2024-01-01 00:00").expect("start"),
        parse_timestamp("2024-01-08 00:00").expect("end"),
    )
    .expect("valid range");
    let scale = TimeScale::new(TimeUnit::Minutes, 15, "HH:mm");

    c.bench_function("time_scale_columns_week_15m", |b| {
        b.iter(|| {
            let _ = black_box(&scale)
                .columns(black_box(range))
                .expect("columns should succeed");
        })
    });
}

fn bench_flatten_10k_expanded(c: &mut Criterion) {
    let tree = JobTree::build(generated_jobs(100, 100));
    let expand = ExpandState::new(true);

    c.bench_function("flatten_10k_expanded", |b| {
        b.iter(|| {
            let _ = flatten(black_box(&tree), black_box(&expand));
        })
    });
}

fn bench_engine_render_model_scroll_2k(c: &mut Criterion) {
    let config = GanttConfig::new(ts("2024-01-01 00:00"), ts("2024-01-02 00:00"))
        .with_time_scale(TimeScale::new(TimeUnit::Hours, 1, "HH:mm"))
        .with_data(generated_jobs(40, 50));
    let mut engine = GanttEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_expanded_rows_data(
        (0..40)
            .map(|group| (format!("group-{group}"), true))
            .collect(),
    );
    engine
        .resize_viewport(1200.0, 800.0)
        .expect("viewport resize");

    let mut scroll = 0.0;
    c.bench_function("engine_render_model_scroll_2k", |b| {
        b.iter(|| {
            scroll = (scroll + 37.0) % 1_000.0;
            engine
                .scroll_timeline(black_box(scroll), black_box(scroll))
                .expect("scroll should succeed");
            let _ = engine
                .build_render_model()
                .expect("render model should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_time_scale_columns_week_of_minutes,
    bench_flatten_10k_expanded,
    bench_engine_render_model_scroll_2k
);
criterion_main!(benches);
