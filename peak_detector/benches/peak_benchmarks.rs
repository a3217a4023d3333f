use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use peak_detector::features::extract_features;
use peak_detector::flagging::flag_peaks;
use peak_detector::grouping::{assign_groups, peak_periods};
use peak_detector::{LoadRecord, PeakConfig, PeakWindow, ThresholdEstimator};

// Five years of hourly load with a daily afternoon hump and slow growth
fn synthetic_history() -> Vec<LoadRecord> {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    (0..5 * 365 * 24)
        .map(|i: i64| {
            let hour = (i % 24) as f64;
            let growth = i as f64 * 0.002;
            let hump = if (14.0..=19.0).contains(&hour) { 2500.0 } else { 0.0 };
            let noise = ((i * 7919) % 613) as f64;
            LoadRecord::new(start + Duration::hours(i), 15000.0 + growth + hump + noise)
        })
        .collect()
}

fn benchmark_threshold_estimation(c: &mut Criterion) {
    let features = extract_features(&synthetic_history());
    let estimator = ThresholdEstimator::from_config(&PeakConfig::default());

    c.bench_function("monthly_thresholds_5y", |b| {
        b.iter(|| black_box(estimator.estimate(black_box(&features))));
    });
}

fn benchmark_flag_and_group(c: &mut Criterion) {
    let features = extract_features(&synthetic_history());
    let thresholds = ThresholdEstimator::from_config(&PeakConfig::default()).estimate(&features);
    let window = PeakWindow::default();

    c.bench_function("flag_and_group_5y", |b| {
        b.iter(|| {
            let mut peaks = flag_peaks(black_box(&features), &thresholds, &window);
            assign_groups(&mut peaks, Duration::hours(1));
            black_box(peak_periods(&peaks, Duration::hours(1)))
        });
    });
}

criterion_group!(benches, benchmark_threshold_estimation, benchmark_flag_and_group);
criterion_main!(benches);
