//! Benchmarks for expression parsing, serialization and phrase resolution.

use std::hint::black_box;

use calendar_interval::{DurationInterval, FixedClock, Precision, ResolveOptions};
use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

const EXPRESSIONS: &[&str] = &["P3D", "PT90M", "P1Y2M3DT4H5M6S", "-P2W3D", "P0Y"];

const PHRASES: &[&str] = &[
    "3 days ago",
    "in 1 year, 2 months and 3 hours",
    "next monday at 9am",
    "end of next quarter",
    "2026-05-18",
];

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_expressions", |b| {
        b.iter(|| {
            for expr in EXPRESSIONS {
                let _ = black_box(DurationInterval::from_expression(black_box(expr)));
            }
        })
    });
}

fn bench_format(c: &mut Criterion) {
    let intervals: Vec<DurationInterval> = EXPRESSIONS
        .iter()
        .filter_map(|expr| DurationInterval::from_expression(expr).ok())
        .collect();

    c.bench_function("format_expressions", |b| {
        b.iter(|| {
            for interval in &intervals {
                black_box(interval.to_expression());
            }
        })
    });
}

fn bench_natural_language(c: &mut Criterion) {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap());
    let options = ResolveOptions::default();

    c.bench_function("resolve_phrases", |b| {
        b.iter(|| {
            for phrase in PHRASES {
                let _ = black_box(DurationInterval::from_natural_language_with(
                    black_box(phrase),
                    "America/New_York",
                    &options,
                    &clock,
                ));
            }
        })
    });
}

fn bench_projection(c: &mut Criterion) {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap());
    let options = ResolveOptions::default();
    let interval = DurationInterval::from_expression("P1Y2M3DT4H5M6S").unwrap();

    c.bench_function("project_units", |b| {
        b.iter(|| {
            if let Ok(span) = interval.resolve_with(&clock, "Europe/London", &options) {
                black_box(span.in_hours(Precision::Truncated));
                black_box(span.in_months_from_now());
            }
        })
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_format,
    bench_natural_language,
    bench_projection
);
criterion_main!(benches);
