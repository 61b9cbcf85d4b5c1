// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for label classification and full TSPL rendering in
// the shelftag-tspl crate.

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use shelftag_core::ShelftagConfig;
use shelftag_tspl::{LabelRequest, classify, render};

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for label in ["1-1", "44-10", "123-4567", "ABC"] {
        group.bench_function(label, |b| b.iter(|| classify(black_box(label))));
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2026, 10, 18)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp");
    let default_config = ShelftagConfig::default();
    let left_only = ShelftagConfig::from_json_str(
        r#"{"features": {"print_only_left": true},
            "layouts_by_left_len": {"2": {"scale": 60, "x": 40, "y": 20}}}"#,
    )
    .expect("valid config");

    let mut group = c.benchmark_group("render");
    group.bench_function("slot_default", |b| {
        let label = LabelRequest::new("44-10");
        b.iter(|| render(black_box(&label), &default_config, now).script.to_bytes())
    });
    group.bench_function("fallback_escaped", |b| {
        let label = LabelRequest::new("say \"hi\"");
        b.iter(|| render(black_box(&label), &default_config, now).script.to_bytes())
    });
    group.bench_function("print_only_left", |b| {
        let label = LabelRequest::new("44-10");
        b.iter(|| render(black_box(&label), &left_only, now).script.to_bytes())
    });
    group.finish();
}

criterion_group!(benches, bench_classify, bench_render);
criterion_main!(benches);
