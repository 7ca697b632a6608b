//! Benchmarks for tooltip content formatting

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tooltip_engine::headless::RecordingHost;
use tooltip_engine::{
    format_content, substitute, AxisInfo, ContentTemplate, HitPoint, TooltipOptions,
};

fn bench_default_template(c: &mut Criterion) {
    let options = TooltipOptions::enabled();
    let axis = AxisInfo::linear().with_tick_formatter(|value, _| format!("{value:.2}"));
    let hit = HitPoint::new(0, 42, 1234.5678, 98.765)
        .with_label("Throughput")
        .with_axes(axis.clone(), axis);

    c.bench_function("substitute_default_template", |b| {
        b.iter(|| substitute(black_box(&options.content), black_box(&hit), &options));
    });
}

fn bench_precision_and_dates(c: &mut Criterion) {
    let options = TooltipOptions::enabled().with_date_formats(Some("%Y-%m-%d %H:%M:%S"), None);
    let hit = HitPoint::new(0, 0, 1_700_000_000_000.0, 0.123456)
        .with_label("Latency")
        .with_axes(AxisInfo::time(), AxisInfo::linear());

    let mut group = c.benchmark_group("substitute_tokens");
    group.bench_function("precision", |b| {
        b.iter(|| substitute(black_box("%s: %y.4 ms"), black_box(&hit), &options));
    });
    group.bench_function("date", |b| {
        b.iter(|| substitute(black_box("%x | %y.2"), black_box(&hit), &options));
    });
    group.finish();
}

fn bench_function_template(c: &mut Criterion) {
    let options = TooltipOptions::enabled();
    let host = RecordingHost::new(None);
    let template = ContentTemplate::function(|label, _x, _y, hit, _chart| {
        format!("{} #{}: %y.1", label.unwrap_or("-"), hit.point.data_index)
    });
    let hit = HitPoint::new(1, 7, 3.0, 4.5).with_label("Queue depth");

    c.bench_function("format_function_template", |b| {
        b.iter(|| format_content(black_box(&template), black_box(&hit), &options, &host));
    });
}

criterion_group!(
    benches,
    bench_default_template,
    bench_precision_and_dates,
    bench_function_template
);
criterion_main!(benches);
