use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One hourly load measurement as read from an archive member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub timestamp: NaiveDateTime,
    pub load: f64,
}

impl LoadRecord {
    pub fn new(timestamp: NaiveDateTime, load: f64) -> Self {
        Self { timestamp, load }
    }
}

/// Calendar bucket used for threshold estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Same month one year earlier.
    pub fn prior_year(&self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// A load record with its derived calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub timestamp: NaiveDateTime,
    pub load: f64,
    pub year: i32,
    pub month: u32,
    pub hour: u32,
    pub date: NaiveDate,
}

impl FeatureRecord {
    pub fn month_key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyThreshold {
    pub key: MonthKey,
    pub base_threshold: f64,
    pub adjusted_threshold: f64,
}

/// A flagged hour, carrying everything that ends up in the potential peaks table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub timestamp: NaiveDateTime,
    pub load: f64,
    pub year: i32,
    pub month: u32,
    pub hour: u32,
    pub date: NaiveDate,
    pub base_threshold: f64,
    pub adjusted_threshold: f64,

    // Filled in by run grouping
    pub time_diff: Option<f64>,
    pub new_group: bool,
    pub group_id: u32,
}

impl PeakRecord {
    pub fn new(record: &FeatureRecord, threshold: &MonthlyThreshold) -> Self {
        Self {
            timestamp: record.timestamp,
            load: record.load,
            year: record.year,
            month: record.month,
            hour: record.hour,
            date: record.date,
            base_threshold: threshold.base_threshold,
            adjusted_threshold: threshold.adjusted_threshold,
            time_diff: None,
            new_group: false,
            group_id: 0,
        }
    }
}

/// A contiguous run of flagged hours on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakPeriod {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyPeakCount {
    pub year: i32,
    pub peak_count: usize,
}
