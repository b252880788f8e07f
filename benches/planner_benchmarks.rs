use criterion::{black_box, criterion_group, criterion_main, Criterion};

use autocut_cli::domain::model::{SilenceReport, TimeSpan};
use autocut_cli::planner::{IntervalPlanner, PlannerParams};

/// A pause every few seconds, some too short to count
fn chatty_report(count: usize) -> (SilenceReport, f64) {
    let mut spans = Vec::with_capacity(count);
    let mut cursor = 1.0;
    for i in 0..count {
        let length = if i % 3 == 0 { 0.8 } else { 1.6 + (i % 5) as f64 * 0.1 };
        if let Ok(span) = TimeSpan::new(cursor, cursor + length) {
            spans.push(span);
        }
        cursor += length + 2.5 + (i % 7) as f64 * 0.3;
    }
    (SilenceReport::new(spans), cursor + 1.0)
}

fn bench_interval_planner(c: &mut Criterion) {
    let planner = IntervalPlanner::new(PlannerParams::default());

    for count in [100usize, 10_000] {
        let (report, total) = chatty_report(count);
        c.bench_function(&format!("plan_{}_silences", count), |b| {
            b.iter(|| planner.plan(black_box(&report), black_box(total)))
        });
    }
}

criterion_group!(benches, bench_interval_planner);
criterion_main!(benches);
