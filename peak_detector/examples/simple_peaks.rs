use chrono::{Duration, NaiveDate};
use peak_detector::{LoadRecord, PeakConfig, SmartPeakPipeline};

fn main() {
    env_logger::init();

    let config = PeakConfig::default();
    let pipeline = SmartPeakPipeline::new(config);

    // Two Julys of hourly load; the second year runs about 8% hotter
    let mut records = Vec::new();
    for (year, scale) in [(2022, 1.0), (2023, 1.08)] {
        let start = NaiveDate::from_ymd_opt(year, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for i in 0..31 * 24 {
            let ts = start + Duration::hours(i);
            let hour = i % 24;
            let base = match hour {
                0..=6 => 14000.0,
                15..=18 => 24000.0,
                _ => 19000.0,
            };
            // A heat wave on the 20th
            let heat = if i / 24 == 19 && (15..=18).contains(&hour) { 4000.0 } else { 0.0 };
            records.push(LoadRecord::new(ts, (base + heat) * scale));
        }
    }

    let detection = pipeline.detect(&records);

    println!("Smart Peak Detection");
    println!("====================");
    println!("Records: {}", records.len());
    println!();
    println!("Monthly thresholds:");
    for t in &detection.thresholds {
        println!(
            "  {}: base {:.1} MW, adjusted {:.1} MW",
            t.key, t.base_threshold, t.adjusted_threshold
        );
    }
    println!();
    println!("Peak periods:");
    for p in &detection.periods {
        println!("  {} {} - {}", p.date, p.start_time.format("%H:%M"), p.end_time.format("%H:%M"));
    }
    println!();
    for c in &detection.counts {
        println!("{}: {} peak hours", c.year, c.peak_count);
    }
}
