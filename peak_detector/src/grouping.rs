use crate::models::{PeakPeriod, PeakRecord};
use chrono::{Duration, NaiveDateTime};

/// Fill `time_diff`, `new_group` and `group_id` on peaks sorted by timestamp.
///
/// A gap of exactly one sampling interval stays in the current group; anything
/// longer starts a new one. `group_id` is the running count of new groups, so the
/// first run is group 0.
pub fn assign_groups(peaks: &mut [PeakRecord], interval: Duration) {
    debug_assert!(peaks.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let mut group_id = 0;
    let mut previous: Option<NaiveDateTime> = None;

    for peak in peaks.iter_mut() {
        match previous {
            Some(prev) => {
                let gap = peak.timestamp - prev;
                peak.time_diff = Some(gap.num_seconds() as f64 / 3600.0);
                peak.new_group = gap > interval;
            }
            None => {
                peak.time_diff = None;
                peak.new_group = false;
            }
        }

        if peak.new_group {
            group_id += 1;
        }
        peak.group_id = group_id;
        previous = Some(peak.timestamp);
    }
}

/// One period per (group, calendar date) partition, in timestamp order.
///
/// Expects `assign_groups` to have run. A run that crosses midnight is split
/// into one period per date.
pub fn peak_periods(peaks: &[PeakRecord], interval: Duration) -> Vec<PeakPeriod> {
    let mut periods = Vec::new();
    let mut start = 0;

    for i in 1..=peaks.len() {
        let boundary = i == peaks.len()
            || peaks[i].group_id != peaks[start].group_id
            || peaks[i].date != peaks[start].date;

        if boundary {
            periods.push(period_for(&peaks[start..i], interval));
            start = i;
        }
    }

    periods
}

fn period_for(partition: &[PeakRecord], interval: Duration) -> PeakPeriod {
    let first = &partition[0];
    let earliest = partition.iter().map(|p| p.timestamp).min().unwrap_or(first.timestamp);
    let latest = partition.iter().map(|p| p.timestamp).max().unwrap_or(first.timestamp);

    PeakPeriod {
        date: first.date,
        start_time: earliest.time(),
        end_time: (latest + interval).time(),
    }
}
