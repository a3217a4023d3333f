use crate::config::PeakConfig;
use crate::models::{MonthlyThreshold, PeakPeriod, PeakRecord, YearlyPeakCount};
use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const POTENTIAL_PEAKS_FILE: &str = "smart_potential_peaks.csv";
pub const MONTHLY_THRESHOLDS_FILE: &str = "smart_monthly_thresholds.csv";
pub const PEAK_PERIODS_FILE: &str = "smart_peak_periods.csv";
pub const PEAK_COUNTS_FILE: &str = "smart_peak_counts_by_year.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Paths of the four tables written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub potential_peaks: PathBuf,
    pub monthly_thresholds: PathBuf,
    pub peak_periods: PathBuf,
    pub peak_counts: PathBuf,
}

impl ExportedFiles {
    pub fn all(&self) -> [&Path; 4] {
        [
            self.potential_peaks.as_path(),
            self.monthly_thresholds.as_path(),
            self.peak_periods.as_path(),
            self.peak_counts.as_path(),
        ]
    }
}

pub struct TableExporter {
    output_dir: PathBuf,
    timestamp_column: String,
    load_column: String,
}

impl TableExporter {
    pub fn new(config: &PeakConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            timestamp_column: config.timestamp_column.clone(),
            load_column: config.load_column.clone(),
        }
    }

    pub fn write_all(
        &self,
        peaks: &[PeakRecord],
        thresholds: &[MonthlyThreshold],
        periods: &[PeakPeriod],
        counts: &[YearlyPeakCount],
    ) -> Result<ExportedFiles> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", self.output_dir))?;

        let files = ExportedFiles {
            potential_peaks: self.output_dir.join(POTENTIAL_PEAKS_FILE),
            monthly_thresholds: self.output_dir.join(MONTHLY_THRESHOLDS_FILE),
            peak_periods: self.output_dir.join(PEAK_PERIODS_FILE),
            peak_counts: self.output_dir.join(PEAK_COUNTS_FILE),
        };

        write_csv(&mut self.peaks_frame(peaks)?, &files.potential_peaks)?;
        write_csv(&mut thresholds_frame(thresholds)?, &files.monthly_thresholds)?;
        write_csv(&mut periods_frame(periods)?, &files.peak_periods)?;
        write_csv(&mut counts_frame(counts)?, &files.peak_counts)?;

        Ok(files)
    }

    /// Original columns, derived calendar fields, both thresholds and the
    /// grouping columns, in that order.
    pub fn peaks_frame(&self, peaks: &[PeakRecord]) -> Result<DataFrame> {
        let timestamps: Vec<String> = peaks
            .iter()
            .map(|p| p.timestamp.format(TIMESTAMP_FORMAT).to_string())
            .collect();
        let loads: Vec<f64> = peaks.iter().map(|p| p.load).collect();
        let years: Vec<i32> = peaks.iter().map(|p| p.year).collect();
        let months: Vec<u32> = peaks.iter().map(|p| p.month).collect();
        let hours: Vec<u32> = peaks.iter().map(|p| p.hour).collect();
        let dates: Vec<String> = peaks
            .iter()
            .map(|p| p.date.format(DATE_FORMAT).to_string())
            .collect();
        let base: Vec<f64> = peaks.iter().map(|p| p.base_threshold).collect();
        let adjusted: Vec<f64> = peaks.iter().map(|p| p.adjusted_threshold).collect();
        let time_diff: Vec<Option<f64>> = peaks.iter().map(|p| p.time_diff).collect();
        let new_group: Vec<bool> = peaks.iter().map(|p| p.new_group).collect();
        let group_id: Vec<u32> = peaks.iter().map(|p| p.group_id).collect();

        let df = DataFrame::new(vec![
            Series::new(self.timestamp_column.as_str().into(), timestamps),
            Series::new(self.load_column.as_str().into(), loads),
            Series::new("Year".into(), years),
            Series::new("Month".into(), months),
            Series::new("Hour".into(), hours),
            Series::new("Date".into(), dates),
            Series::new("BaseThreshold".into(), base),
            Series::new("AdjustedThreshold".into(), adjusted),
            Series::new("time_diff".into(), time_diff),
            Series::new("new_group".into(), new_group),
            Series::new("group_id".into(), group_id),
        ])?;
        Ok(df)
    }
}

pub fn thresholds_frame(thresholds: &[MonthlyThreshold]) -> Result<DataFrame> {
    let years: Vec<i32> = thresholds.iter().map(|t| t.key.year).collect();
    let months: Vec<u32> = thresholds.iter().map(|t| t.key.month).collect();
    let base: Vec<f64> = thresholds.iter().map(|t| t.base_threshold).collect();
    let adjusted: Vec<f64> = thresholds.iter().map(|t| t.adjusted_threshold).collect();

    let df = DataFrame::new(vec![
        Series::new("Year".into(), years),
        Series::new("Month".into(), months),
        Series::new("BaseThreshold".into(), base),
        Series::new("AdjustedThreshold".into(), adjusted),
    ])?;
    Ok(df)
}

pub fn periods_frame(periods: &[PeakPeriod]) -> Result<DataFrame> {
    let dates: Vec<String> = periods
        .iter()
        .map(|p| p.date.format(DATE_FORMAT).to_string())
        .collect();
    let starts: Vec<String> = periods
        .iter()
        .map(|p| p.start_time.format(TIME_FORMAT).to_string())
        .collect();
    let ends: Vec<String> = periods
        .iter()
        .map(|p| p.end_time.format(TIME_FORMAT).to_string())
        .collect();

    let df = DataFrame::new(vec![
        Series::new("Date".into(), dates),
        Series::new("startTime".into(), starts),
        Series::new("endTime".into(), ends),
    ])?;
    Ok(df)
}

pub fn counts_frame(counts: &[YearlyPeakCount]) -> Result<DataFrame> {
    let years: Vec<i32> = counts.iter().map(|c| c.year).collect();
    let peak_counts: Vec<u64> = counts.iter().map(|c| c.peak_count as u64).collect();

    let df = DataFrame::new(vec![
        Series::new("Year".into(), years),
        Series::new("Peak Count".into(), peak_counts),
    ])?;
    Ok(df)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
