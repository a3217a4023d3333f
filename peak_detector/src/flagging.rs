use crate::config::PeakWindow;
use crate::models::{FeatureRecord, PeakRecord};
use crate::thresholds::ThresholdTable;

/// Keep records inside the hour window whose load exceeds their month's
/// adjusted threshold, sorted ascending by timestamp.
///
/// Records whose month has no threshold are excluded. The sort is stable, so
/// duplicate timestamps keep their ingest order.
pub fn flag_peaks(
    records: &[FeatureRecord],
    thresholds: &ThresholdTable,
    window: &PeakWindow,
) -> Vec<PeakRecord> {
    let mut peaks: Vec<PeakRecord> = records
        .iter()
        .filter(|r| window.contains(r.hour))
        .filter_map(|r| {
            let threshold = thresholds.get(&r.month_key())?;
            (r.load > threshold.adjusted_threshold).then(|| PeakRecord::new(r, threshold))
        })
        .collect();

    peaks.sort_by_key(|p| p.timestamp);
    peaks
}
