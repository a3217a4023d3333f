use crate::models::{FeatureRecord, LoadRecord};
use chrono::{Datelike, Timelike};

impl From<&LoadRecord> for FeatureRecord {
    fn from(record: &LoadRecord) -> Self {
        let ts = record.timestamp;
        Self {
            timestamp: ts,
            load: record.load,
            year: ts.year(),
            month: ts.month(),
            hour: ts.hour(),
            date: ts.date(),
        }
    }
}

/// Derive year, month, hour and date from each record's wall-clock timestamp.
pub fn extract_features(records: &[LoadRecord]) -> Vec<FeatureRecord> {
    records.iter().map(FeatureRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_calendar_fields() {
        let ts = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 5, 0)
            .unwrap();
        let features = extract_features(&[LoadRecord::new(ts, 4200.0)]);

        assert_eq!(features.len(), 1);
        let f = &features[0];
        assert_eq!((f.year, f.month, f.hour), (2023, 12, 23));
        assert_eq!(f.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(f.load, 4200.0);
        assert_eq!(f.timestamp, ts);
    }

    #[test]
    fn test_no_filtering() {
        let ts = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let records = vec![LoadRecord::new(ts, 0.0); 3];
        assert_eq!(extract_features(&records).len(), 3);
    }
}
