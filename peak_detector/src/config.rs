use crate::error::ConfigError;
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Text encodings tried, in order, when decoding an archive member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1
    Latin1,
    Windows1252,
}

/// Inclusive hour-of-day window in which peaks may be flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl PeakWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self { start_hour, end_hour }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour <= self.end_hour
    }
}

impl Default for PeakWindow {
    fn default() -> Self {
        Self::new(15, 18)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Only archives whose file name ends with this are read.
    pub archive_suffix: String,
    pub member_extension: String,
    pub timestamp_column: String,
    pub load_column: String,
    pub encodings: Vec<TextEncoding>,
    pub percentile: f64,
    /// Weight applied to the prior-year change (0.5 = half the trend).
    pub trend_damping: f64,
    pub margin: f64,
    pub window: PeakWindow,
    pub sampling_interval_minutes: u32,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("NYiso"),
            output_dir: PathBuf::from("."),
            archive_suffix: "palIntegrated_csv.zip".to_string(),
            member_extension: ".csv".to_string(),
            timestamp_column: "Time Stamp".to_string(),
            load_column: "Integrated Load".to_string(),
            encodings: vec![
                TextEncoding::Utf8,
                TextEncoding::Latin1,
                TextEncoding::Windows1252,
            ],
            percentile: 0.99,
            trend_damping: 0.5,
            margin: 1000.0,
            window: PeakWindow::default(),
            sampling_interval_minutes: 60,
        }
    }
}

impl PeakConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    pub fn sampling_interval(&self) -> Duration {
        Duration::minutes(i64::from(self.sampling_interval_minutes))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.percentile) {
            return Err(ConfigError::Percentile(self.percentile));
        }
        if !self.trend_damping.is_finite() {
            return Err(ConfigError::NonFinite("trend_damping"));
        }
        if !self.margin.is_finite() {
            return Err(ConfigError::NonFinite("margin"));
        }
        let PeakWindow { start_hour, end_hour } = self.window;
        if start_hour > 23 || end_hour > 23 || start_hour > end_hour {
            return Err(ConfigError::Window { start_hour, end_hour });
        }
        if self.sampling_interval_minutes == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.encodings.is_empty() {
            return Err(ConfigError::NoEncodings);
        }
        if self.timestamp_column.trim().is_empty() || self.load_column.trim().is_empty() {
            return Err(ConfigError::EmptyColumnName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = PeakConfig::default();
        assert_eq!(config.percentile, 0.99);
        assert_eq!(config.trend_damping, 0.5);
        assert_eq!(config.margin, 1000.0);
        assert_eq!(config.window, PeakWindow::new(15, 18));
        assert_eq!(config.sampling_interval(), Duration::hours(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = PeakWindow::default();
        assert!(!window.contains(14));
        assert!(window.contains(15));
        assert!(window.contains(18));
        assert!(!window.contains(19));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PeakConfig::default();
        config.percentile = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Percentile(_))));

        let mut config = PeakConfig::default();
        config.window = PeakWindow::new(18, 15);
        assert!(matches!(config.validate(), Err(ConfigError::Window { .. })));

        let mut config = PeakConfig::default();
        config.sampling_interval_minutes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval)));

        let mut config = PeakConfig::default();
        config.encodings.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoEncodings)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "margin": 250.0, "window": { "start_hour": 14, "end_hour": 19 }, "encodings": ["utf8", "windows1252"] }"#;
        let config: PeakConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.margin, 250.0);
        assert_eq!(config.window, PeakWindow::new(14, 19));
        assert_eq!(config.encodings, vec![TextEncoding::Utf8, TextEncoding::Windows1252]);
        assert_eq!(config.percentile, 0.99);
        assert_eq!(config.archive_suffix, "palIntegrated_csv.zip");
    }
}
