use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a source timestamp into a naive wall-clock time.
///
/// Zone-aware values keep their local time; no conversion to UTC is done.
/// Returns `None` for anything unparseable so the caller can drop the row.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_nyiso_format() {
        let ts = parse_timestamp("07/15/2023 16:00:00").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2023, 7, 15, 16));
    }

    #[test]
    fn test_iso_and_minute_precision() {
        assert_eq!(
            parse_timestamp("2023-07-15 16:05"),
            NaiveDate::from_ymd_opt(2023, 7, 15).unwrap().and_hms_opt(16, 5, 0)
        );
        assert_eq!(
            parse_timestamp("2023-07-15T16:00:00"),
            NaiveDate::from_ymd_opt(2023, 7, 15).unwrap().and_hms_opt(16, 0, 0)
        );
    }

    #[test]
    fn test_zone_aware_keeps_local_hour() {
        let ts = parse_timestamp("2023-07-15T16:00:00-04:00").unwrap();
        assert_eq!(ts.hour(), 16);
    }

    #[test]
    fn test_bare_date_is_midnight() {
        let ts = parse_timestamp("2023-07-15").unwrap();
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a time").is_none());
        assert!(parse_timestamp("13/45/2023 16:00:00").is_none());
    }
}
