use crate::aggregation::peak_counts_by_year;
use crate::archive_reader::{ArchiveReader, IngestOutcome, IngestStats};
use crate::config::PeakConfig;
use crate::export::{ExportedFiles, TableExporter};
use crate::features::extract_features;
use crate::flagging::flag_peaks;
use crate::grouping::{assign_groups, peak_periods};
use crate::models::{LoadRecord, MonthlyThreshold, PeakPeriod, PeakRecord, YearlyPeakCount};
use crate::thresholds::ThresholdEstimator;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::fmt;

/// Everything computed from one record set, before export.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub thresholds: Vec<MonthlyThreshold>,
    pub peaks: Vec<PeakRecord>,
    pub periods: Vec<PeakPeriod>,
    pub counts: Vec<YearlyPeakCount>,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub stats: IngestStats,
    pub records_read: usize,
    pub detection: Detection,
    pub files: ExportedFiles,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Read {} records from {} archives ({} failed, {} members skipped, {} rows malformed, {} rows dropped)",
            self.records_read,
            self.stats.archives_matched,
            self.stats.archives_failed,
            self.stats.members_skipped,
            self.stats.rows_malformed,
            self.stats.rows_dropped,
        )?;
        writeln!(
            f,
            "{} monthly thresholds, {} potential peaks, {} peak periods",
            self.detection.thresholds.len(),
            self.detection.peaks.len(),
            self.detection.periods.len(),
        )?;

        writeln!(f, "Saved:")?;
        for path in self.files.all() {
            writeln!(f, "- {}", path.display())?;
        }

        writeln!(f, "Peak counts by year:")?;
        if self.detection.counts.is_empty() {
            return writeln!(f, "  (no peaks)");
        }
        writeln!(f, "{:>6} {:>10}", "Year", "Peak Count")?;
        for count in &self.detection.counts {
            writeln!(f, "{:>6} {:>10}", count.year, count.peak_count)?;
        }
        Ok(())
    }
}

/// Smart peak detection: monthly trend-adjusted thresholds, windowed flagging
/// and run grouping over a directory of load archives.
pub struct SmartPeakPipeline {
    config: PeakConfig,
    show_progress: bool,
}

impl SmartPeakPipeline {
    pub fn new(config: PeakConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &PeakConfig {
        &self.config
    }

    pub fn run(&self) -> Result<PipelineReport> {
        self.config.validate()?;

        let ingest = self.ingest();
        let records_read = ingest.records.len();
        info!("Loaded {} load records", records_read);

        let detection = self.detect(&ingest.records);

        let files = TableExporter::new(&self.config).write_all(
            &detection.peaks,
            &detection.thresholds,
            &detection.periods,
            &detection.counts,
        )?;

        Ok(PipelineReport {
            stats: ingest.stats,
            records_read,
            detection,
            files,
        })
    }

    fn ingest(&self) -> IngestOutcome {
        let pb = if self.show_progress {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }

        ArchiveReader::new(&self.config).read_directory(&self.config.input_dir, &pb)
    }

    /// Run every in-memory stage over already-loaded records.
    pub fn detect(&self, records: &[LoadRecord]) -> Detection {
        let features = extract_features(records);

        let thresholds = ThresholdEstimator::from_config(&self.config).estimate(&features);
        info!("Computed thresholds for {} months", thresholds.len());

        let interval = self.config.sampling_interval();
        let mut peaks = flag_peaks(&features, &thresholds, &self.config.window);
        assign_groups(&mut peaks, interval);
        let periods = peak_periods(&peaks, interval);
        let counts = peak_counts_by_year(&peaks);
        info!("Flagged {} peak hours in {} periods", peaks.len(), periods.len());

        Detection {
            thresholds: thresholds.to_vec(),
            peaks,
            periods,
            counts,
        }
    }
}
