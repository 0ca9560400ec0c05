//! 레코드 파서 벤치마크
//!
//! 라인 파싱, 타임스탬프 정규화, 필터 매칭 성능을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use logharbor_core::record::LogRecord;
use logharbor_core::timestamp;
use logharbor_core::filter::RecordFilter;

const LINE: &str =
    "2024-03-15T10:23:45+09:00||web-01|authpriv|info|sshd|4211|Accepted publickey for deploy from 10.0.0.7 port 51122 ssh2";

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("full_line", |b| {
        b.iter(|| LogRecord::parse(black_box(LINE)))
    });
    group.bench_function("short_line", |b| {
        b.iter(|| LogRecord::parse(black_box("2024-03-15T10:23:45||web-01")))
    });
    group.bench_function("bytes_lossy", |b| {
        b.iter(|| LogRecord::parse_bytes(black_box(LINE.as_bytes())))
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp_normalize");

    group.bench_function("with_offset", |b| {
        b.iter(|| timestamp::normalize(black_box("2024-03-15T10:23:45+09:00"), 0))
    });
    group.bench_function("naive", |b| {
        b.iter(|| timestamp::normalize(black_box("2024-03-15T10:23:45"), -540))
    });

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let record = LogRecord::parse(LINE);
    let filter = RecordFilter {
        host: Some("web-01".to_owned()),
        message: Some("PUBLICKEY".to_owned()),
        ..Default::default()
    };

    c.bench_function("filter_matches", |b| {
        b.iter(|| filter.matches(black_box(&record)))
    });
}

criterion_group!(benches, bench_parse, bench_normalize, bench_filter);
criterion_main!(benches);
