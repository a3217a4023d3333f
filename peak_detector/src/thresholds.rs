use crate::config::PeakConfig;
use crate::models::{FeatureRecord, MonthKey, MonthlyThreshold};
use log::warn;
use std::collections::BTreeMap;

/// Value at quantile `q` using linear interpolation between order statistics.
///
/// Returns NaN for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let pos = q * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

/// Thresholds indexed by month, iterated in calendar order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    thresholds: BTreeMap<MonthKey, MonthlyThreshold>,
}

impl ThresholdTable {
    pub fn get(&self, key: &MonthKey) -> Option<&MonthlyThreshold> {
        self.thresholds.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlyThreshold> {
        self.thresholds.values()
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn to_vec(&self) -> Vec<MonthlyThreshold> {
        self.thresholds.values().copied().collect()
    }
}

impl FromIterator<MonthlyThreshold> for ThresholdTable {
    fn from_iter<I: IntoIterator<Item = MonthlyThreshold>>(iter: I) -> Self {
        Self {
            thresholds: iter.into_iter().map(|t| (t.key, t)).collect(),
        }
    }
}

/// Monthly baseline percentile, adjusted by a damped year-over-year trend.
pub struct ThresholdEstimator {
    percentile: f64,
    trend_damping: f64,
    margin: f64,
}

impl ThresholdEstimator {
    pub fn new(percentile: f64, trend_damping: f64, margin: f64) -> Self {
        Self {
            percentile,
            trend_damping,
            margin,
        }
    }

    pub fn from_config(config: &PeakConfig) -> Self {
        Self::new(config.percentile, config.trend_damping, config.margin)
    }

    /// Per-month base thresholds over the full history.
    pub fn base_thresholds(&self, records: &[FeatureRecord]) -> BTreeMap<MonthKey, f64> {
        let mut buckets: BTreeMap<MonthKey, Vec<f64>> = BTreeMap::new();
        for record in records {
            buckets.entry(record.month_key()).or_default().push(record.load);
        }

        buckets
            .into_iter()
            .map(|(key, loads)| (key, quantile(&loads, self.percentile)))
            .collect()
    }

    /// Adjusted threshold for one bucket given the prior year's base, if any.
    ///
    /// A zero or non-finite prior leaves the base unadjusted, same as a missing one.
    pub fn adjust(&self, key: MonthKey, base: f64, prior: Option<f64>) -> f64 {
        match prior {
            Some(prior) if prior != 0.0 && prior.is_finite() => {
                let yoy_change = (base - prior) / prior;
                base * (1.0 + self.trend_damping * yoy_change) + self.margin
            }
            Some(prior) => {
                warn!(
                    "Prior-year baseline for {} is {}; year-over-year change undefined, using base threshold",
                    key, prior
                );
                base
            }
            None => base,
        }
    }

    pub fn estimate(&self, records: &[FeatureRecord]) -> ThresholdTable {
        let bases = self.base_thresholds(records);

        bases
            .iter()
            .map(|(&key, &base)| {
                let prior = bases.get(&key.prior_year()).copied();
                MonthlyThreshold {
                    key,
                    base_threshold: base,
                    adjusted_threshold: self.adjust(key, base, prior),
                }
            })
            .collect()
    }
}
