pub mod aggregation;
pub mod archive_reader;
pub mod config;
pub mod encoding;
pub mod error;
pub mod export;
pub mod features;
pub mod flagging;
pub mod grouping;
pub mod models;
pub mod pipeline;
pub mod thresholds;
pub mod timestamp;

pub use archive_reader::{ArchiveReader, IngestOutcome, IngestStats};
pub use config::{PeakConfig, PeakWindow, TextEncoding};
pub use error::{ConfigError, IngestError};
pub use export::{ExportedFiles, TableExporter};
pub use models::{FeatureRecord, LoadRecord, MonthKey, MonthlyThreshold, PeakPeriod, PeakRecord, YearlyPeakCount};
pub use pipeline::{Detection, PipelineReport, SmartPeakPipeline};
pub use thresholds::{ThresholdEstimator, ThresholdTable};
