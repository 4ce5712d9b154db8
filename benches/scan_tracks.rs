//! Benchmarks for the detection pipeline.
//!
//! Usage:
//!   cargo bench --bench scan_tracks
//!   cargo bench scan_tracks -- detect/rules_only
//!   RAYON_NUM_THREADS=1 cargo bench --bench scan_tracks

use aisguard::detection::outlier::{IsolationForest, OutlierScorer};
use aisguard::detection::scanner::scan_tracks;
use aisguard::{DetectionParams, PositionFix, TrackFile, TrackScan, TrackSet};
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::Vector5;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Synthetic fleet: `vessels` tracks of `fixes_per_vessel` fixes, one minute apart, with
/// random small moves and about one jump per thousand fixes.
fn synthetic_fleet(vessels: i64, fixes_per_vessel: i64) -> TrackSet {
    let mut rng = StdRng::seed_from_u64(7);
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut fixes = Vec::with_capacity((vessels * fixes_per_vessel) as usize);

    for v in 0..vessels {
        let (mut lat, mut lon) = (rng.random_range(-60.0..60.0), rng.random_range(-180.0..180.0));
        for i in 0..fixes_per_vessel {
            let jump = if rng.random_range(0..1000) == 0 { 1.0 } else { 0.0 };
            lat += rng.random_range(-0.003..0.003) + jump;
            lon += rng.random_range(-0.003..0.003);
            fixes.push(PositionFix::new(
                200_000_000 + v,
                lat,
                lon,
                t0 + Duration::seconds(60 * i),
            ));
        }
    }
    TrackSet::new_from_fixes(fixes)
}

fn bench_scan(c: &mut Criterion) {
    let params = DetectionParams::default();
    let mut group = c.benchmark_group("scan_tracks");

    for (vessels, fixes) in [(10, 1_000), (100, 1_000), (1_000, 100)] {
        let tracks = synthetic_fleet(vessels, fixes);
        group.throughput(Throughput::Elements((vessels * fixes) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{vessels}x{fixes}")),
            &tracks,
            |b, tracks| b.iter(|| scan_tracks(black_box(tracks), &params, false)),
        );
    }
    group.finish();
}

fn bench_detect(c: &mut Criterion) {
    let tracks = synthetic_fleet(100, 500);
    let rules_only = DetectionParams::default();
    let with_scoring = DetectionParams::builder()
        .use_statistical_scoring(true)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("detect");
    group.sample_size(20);
    group.bench_function("rules_only", |b| {
        b.iter(|| tracks.detect_anomalies("bench", black_box(&rules_only)))
    });
    group.bench_function("with_scoring", |b| {
        b.iter(|| tracks.detect_anomalies("bench", black_box(&with_scoring)))
    });
    group.finish();
}

fn bench_forest(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let features: Vec<Vector5<f64>> = (0..10_000)
        .map(|_| {
            Vector5::new(
                rng.random_range(0.0..3.0),
                rng.random_range(30.0..120.0),
                rng.random_range(0.0..30.0),
                rng.random_range(-60.0..60.0),
                rng.random_range(-180.0..180.0),
            )
        })
        .collect();
    let forest = IsolationForest::default();

    c.bench_function("isolation_forest/10k", |b| {
        b.iter(|| forest.fit_and_score(black_box(&features), 0.02, 42))
    });
}

criterion_group!(benches, bench_scan, bench_detect, bench_forest);
criterion_main!(benches);
