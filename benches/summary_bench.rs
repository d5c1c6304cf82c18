use criterion::{Criterion, criterion_group, criterion_main};
use pipeline_runner::core::aggregate::aggregate_results;
use pipeline_runner::core::summary::{count_verbose_outcomes, parse_collected_count};
use std::fs;
use std::hint::black_box;

fn verbose_output(tests: usize) -> String {
    let mut output = String::from("============ test session starts ============\n");
    output.push_str(&format!("collecting ... collected {} items\n\n", tests));
    for i in 0..tests {
        let status = if i % 10 == 0 { "FAILED" } else { "PASSED" };
        output.push_str(&format!("tests/test_mod.py::test_{} {} [{:>3}%]\n", i, status, i * 100 / tests));
    }
    output.push_str("=========== 10 failed, 90 passed in 1.23s ===========\n");
    output
}

fn bench_output_parsing(c: &mut Criterion) {
    let output = verbose_output(1000);

    c.bench_function("parse_collected_count", |b| {
        b.iter(|| parse_collected_count(black_box(&output)))
    });
    c.bench_function("count_verbose_outcomes", |b| {
        b.iter(|| count_verbose_outcomes(black_box(&output)))
    });
}

fn bench_aggregate_results(c: &mut Criterion) {
    let temp = tempfile::tempdir().unwrap();
    for i in 0..500 {
        let status = if i % 7 == 0 { "failed" } else { "passed" };
        let content = format!(
            r#"{{"uuid":"u{i}","historyId":"h{i}","name":"test_{i}","status":"{status}","start":0,"stop":{i}}}"#
        );
        fs::write(temp.path().join(format!("u{}-result.json", i)), content).unwrap();
    }

    c.bench_function("aggregate_results_500", |b| {
        b.iter(|| aggregate_results(black_box(temp.path())))
    });
}

criterion_group!(benches, bench_output_parsing, bench_aggregate_results);
criterion_main!(benches);
