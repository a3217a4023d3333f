use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading archives. These are recovered locally: the offending
/// archive or member is skipped and the run carries on.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read input directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open archive {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive {path:?}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read member {member} of {archive:?}: {reason}")]
    Member {
        archive: PathBuf,
        member: String,
        reason: String,
    },

    #[error("no encoding produced a table with columns '{timestamp_column}' and '{load_column}' in {member}")]
    NoUsableEncoding {
        member: String,
        timestamp_column: String,
        load_column: String,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("percentile must be within [0, 1], got {0}")]
    Percentile(f64),

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    #[error("invalid peak window {start_hour}..={end_hour}: hours must be 0-23 and start <= end")]
    Window { start_hour: u32, end_hour: u32 },

    #[error("sampling interval must be at least one minute")]
    ZeroInterval,

    #[error("at least one text encoding is required")]
    NoEncodings,

    #[error("timestamp and load column names must not be empty")]
    EmptyColumnName,
}
