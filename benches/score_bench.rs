//! Benchmarks for the offline parts of selection.
//!
//! Measures device classification against the signature sets, the
//! heuristic provider ranking, and composite scoring of a measurement set.
//!
//! Run with: `cargo bench --bench score_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use streampick::probe::HeuristicRanker;
use streampick::{
    CandidateSource, DeviceClassifier, ProbeMeasurement, Quality, Scorer, Throughput,
};

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPad; CPU OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

const PROVIDER_NAMES: &[&str] = &[
    "Random Mirror",
    "Backup Line 2",
    "Fast CDN",
    "Official",
    "HD Source",
    "Premium 4K",
    "Line 7",
];

fn candidates(n: usize) -> Vec<CandidateSource> {
    (0..n)
        .map(|i| {
            CandidateSource::new(
                format!("c{i}"),
                PROVIDER_NAMES[i % PROVIDER_NAMES.len()],
                vec![format!("https://c{i}.example.com/seg1.ts")],
            )
        })
        .collect()
}

fn measurements(n: usize) -> Vec<Option<ProbeMeasurement>> {
    const WIDTHS: [u32; 5] = [3840, 1920, 1280, 854, 640];
    (0..n)
        .map(|i| {
            if i % 7 == 6 {
                return None;
            }
            let throughput = if i % 5 == 4 {
                Throughput::Pending
            } else {
                Throughput::Measured(200.0 + 137.0 * i as f64)
            };
            Some(ProbeMeasurement::full(
                format!("c{i}"),
                40 + (i as u32 * 53) % 700,
                Quality::from_width(WIDTHS[i % WIDTHS.len()]),
                throughput,
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let classifier = DeviceClassifier::default();

    group.bench_function("default_signatures", |b| {
        b.iter(|| {
            for ua in USER_AGENTS {
                black_box(classifier.classify(black_box(ua)));
            }
        });
    });

    group.bench_function("classifier_creation", |b| {
        b.iter(|| black_box(DeviceClassifier::default()));
    });

    group.finish();
}

fn bench_heuristic_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_rank");
    let ranker = HeuristicRanker::new(["official", "premium", "cdn", "hd", "mirror"]);

    for n in [4, 16, 64] {
        let set = candidates(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &set, |b, set| {
            b.iter(|| black_box(ranker.rank(black_box(set))));
        });
    }

    group.finish();
}

fn bench_score_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_rank");
    let scorer = Scorer::default();

    for n in [3, 10, 50] {
        let slots = measurements(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &slots, |b, slots| {
            b.iter(|| black_box(scorer.rank(black_box(slots))));
        });
    }

    group.finish();
}

fn bench_throughput_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput_parse");
    let samples = ["512 KB/s", "1.5 MB/s", "measuring", "2048", "bogus"];

    group.bench_function("mixed", |b| {
        b.iter(|| {
            for s in samples {
                black_box(Throughput::parse(black_box(s)));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_heuristic_rank,
    bench_score_rank,
    bench_throughput_parse,
);

criterion_main!(benches);
