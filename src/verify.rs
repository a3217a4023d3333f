use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use peak_detector::export::{
    MONTHLY_THRESHOLDS_FILE, PEAK_COUNTS_FILE, PEAK_PERIODS_FILE, POTENTIAL_PEAKS_FILE,
};
use std::collections::HashSet;
use std::path::Path;

const PEAK_TRAILING_COLUMNS: [&str; 9] = [
    "Year",
    "Month",
    "Hour",
    "Date",
    "BaseThreshold",
    "AdjustedThreshold",
    "time_diff",
    "new_group",
    "group_id",
];

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).with_context(|| format!("Failed to open {:?}", path))?;
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Re-read the exported tables and check their structural invariants.
/// Returns one message per issue found.
pub fn verify_outputs(dir: &Path) -> Result<Vec<String>> {
    println!("\n🔍 Output Verification");
    println!("{}", "=".repeat(60));

    let mut issues = Vec::new();

    let peaks = Table::read(&dir.join(POTENTIAL_PEAKS_FILE))?;
    let thresholds = Table::read(&dir.join(MONTHLY_THRESHOLDS_FILE))?;
    let periods = Table::read(&dir.join(PEAK_PERIODS_FILE))?;
    let counts = Table::read(&dir.join(PEAK_COUNTS_FILE))?;

    // Potential peaks: two source columns followed by the derived ones
    let trailing: Vec<&str> = peaks.headers.iter().skip(2).map(String::as_str).collect();
    if peaks.headers.len() != 11 || trailing != PEAK_TRAILING_COLUMNS {
        issues.push(format!("{}: unexpected header {:?}", POTENTIAL_PEAKS_FILE, peaks.headers));
    } else {
        let timestamps: Vec<&str> = peaks.rows.iter().map(|r| r[0].as_str()).collect();
        if timestamps.windows(2).any(|w| w[0] > w[1]) {
            issues.push(format!("{}: rows are not sorted by timestamp", POTENTIAL_PEAKS_FILE));
        }
    }
    println!("  📊 Potential peaks: {}", peaks.rows.len());

    expect_header(&thresholds, MONTHLY_THRESHOLDS_FILE, &["Year", "Month", "BaseThreshold", "AdjustedThreshold"], &mut issues);
    if let (Some(y), Some(m)) = (thresholds.column("Year"), thresholds.column("Month")) {
        let mut seen = HashSet::new();
        for row in &thresholds.rows {
            if !seen.insert((row[y].clone(), row[m].clone())) {
                issues.push(format!("{}: duplicate month {}-{}", MONTHLY_THRESHOLDS_FILE, row[y], row[m]));
            }
        }
    }
    println!("  📊 Monthly thresholds: {}", thresholds.rows.len());

    expect_header(&periods, PEAK_PERIODS_FILE, &["Date", "startTime", "endTime"], &mut issues);
    if periods.headers.len() == 3 {
        let mut previous: Option<(NaiveDate, NaiveTime)> = None;
        for row in &periods.rows {
            let parsed = (
                NaiveDate::parse_from_str(&row[0], "%Y-%m-%d"),
                NaiveTime::parse_from_str(&row[1], "%H:%M:%S"),
                NaiveTime::parse_from_str(&row[2], "%H:%M:%S"),
            );
            let (Ok(date), Ok(start), Ok(end)) = parsed else {
                issues.push(format!("{}: unparseable row {:?}", PEAK_PERIODS_FILE, row));
                continue;
            };
            if end <= start && Some(end) != NaiveTime::from_hms_opt(0, 0, 0) {
                issues.push(format!("{}: period on {} ends before it starts", PEAK_PERIODS_FILE, date));
            }
            if previous.map_or(false, |p| p > (date, start)) {
                issues.push(format!("{}: periods out of order at {}", PEAK_PERIODS_FILE, date));
            }
            previous = Some((date, start));
        }
    }
    println!("  📊 Peak periods: {}", periods.rows.len());

    expect_header(&counts, PEAK_COUNTS_FILE, &["Year", "Peak Count"], &mut issues);
    if counts.headers.len() == 2 {
        let total: usize = counts.rows.iter().filter_map(|r| r[1].parse::<usize>().ok()).sum();
        if total != peaks.rows.len() {
            issues.push(format!(
                "{}: counts sum to {} but {} has {} rows",
                PEAK_COUNTS_FILE,
                total,
                POTENTIAL_PEAKS_FILE,
                peaks.rows.len()
            ));
        }
    }

    println!("\n{}", "=".repeat(60));
    if issues.is_empty() {
        println!("✅ Output verification passed! No issues found.");
    } else {
        for issue in &issues {
            println!("    ❌ {}", issue);
        }
        println!("⚠️  Output verification found {} issues", issues.len());
    }

    Ok(issues)
}

fn expect_header(table: &Table, file: &str, expected: &[&str], issues: &mut Vec<String>) {
    if table.headers != expected {
        issues.push(format!("{}: expected header {:?}, found {:?}", file, expected, table.headers));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use peak_detector::{LoadRecord, PeakConfig, SmartPeakPipeline, TableExporter};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_export_verifies_clean() {
        let dir = TempDir::new().unwrap();
        let config = PeakConfig::new(dir.path(), dir.path());
        let pipeline = SmartPeakPipeline::new(config.clone());

        let mut records = Vec::new();
        for day in 1..=20 {
            for hour in 0..24 {
                let ts = NaiveDate::from_ymd_opt(2023, 7, day)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap();
                let load = if day == 12 && (15..=18).contains(&hour) { 9000.0 } else { 2000.0 };
                records.push(LoadRecord::new(ts, load));
            }
        }
        let detection = pipeline.detect(&records);
        assert!(!detection.peaks.is_empty());

        TableExporter::new(&config)
            .write_all(&detection.peaks, &detection.thresholds, &detection.periods, &detection.counts)
            .unwrap();

        assert!(verify_outputs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_counts_are_reported() {
        let dir = TempDir::new().unwrap();
        let config = PeakConfig::new(dir.path(), dir.path());
        TableExporter::new(&config).write_all(&[], &[], &[], &[]).unwrap();
        fs::write(dir.path().join(PEAK_COUNTS_FILE), "Year,Peak Count\n2023,4\n").unwrap();

        let issues = verify_outputs(dir.path()).unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("counts sum to 4"));
    }
}
