use crate::models::{PeakRecord, YearlyPeakCount};
use std::collections::BTreeMap;

/// Number of flagged hours per calendar year, ascending. Years without peaks
/// do not appear.
pub fn peak_counts_by_year(peaks: &[PeakRecord]) -> Vec<YearlyPeakCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for peak in peaks {
        *counts.entry(peak.year).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(year, peak_count)| YearlyPeakCount { year, peak_count })
        .collect()
}
