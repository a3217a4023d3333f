use crate::config::{PeakConfig, TextEncoding};
use crate::encoding::decode;
use crate::error::IngestError;
use crate::models::LoadRecord;
use crate::timestamp::parse_timestamp;
use glob::glob;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Counters describing what an ingest pass read and what it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub archives_matched: usize,
    pub archives_failed: usize,
    pub members_parsed: usize,
    pub members_skipped: usize,
    pub rows_malformed: usize,
    pub rows_dropped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub records: Vec<LoadRecord>,
    pub stats: IngestStats,
}

impl IngestOutcome {
    pub fn merge(&mut self, other: IngestOutcome) {
        self.records.extend(other.records);
        self.stats.archives_matched += other.stats.archives_matched;
        self.stats.archives_failed += other.stats.archives_failed;
        self.stats.members_parsed += other.stats.members_parsed;
        self.stats.members_skipped += other.stats.members_skipped;
        self.stats.rows_malformed += other.stats.rows_malformed;
        self.stats.rows_dropped += other.stats.rows_dropped;
    }
}

/// Reads (timestamp, load) rows out of zipped CSV archives.
pub struct ArchiveReader {
    archive_suffix: String,
    member_extension: String,
    timestamp_column: String,
    load_column: String,
    encodings: Vec<TextEncoding>,
}

impl ArchiveReader {
    pub fn new(config: &PeakConfig) -> Self {
        Self {
            archive_suffix: config.archive_suffix.clone(),
            member_extension: config.member_extension.to_lowercase(),
            timestamp_column: config.timestamp_column.clone(),
            load_column: config.load_column.clone(),
            encodings: config.encodings.clone(),
        }
    }

    /// Archives directly inside `dir` whose file name ends with the configured
    /// suffix, in sorted path order.
    pub fn find_archives(&self, dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
        if let Err(source) = std::fs::read_dir(dir) {
            return Err(IngestError::Directory {
                path: dir.to_path_buf(),
                source,
            });
        }

        let pattern = dir.join("*");
        let mut archives: Vec<PathBuf> = glob(&pattern.to_string_lossy())
            .map_err(|e| IngestError::Directory {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| name.ends_with(&self.archive_suffix))
            })
            .collect();
        archives.sort();

        Ok(archives)
    }

    /// Read every matching archive in `dir`, advancing `pb` once per archive.
    /// Never fails: unreadable archives and members are logged, counted and skipped.
    pub fn read_directory(&self, dir: &Path, pb: &ProgressBar) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();

        let archives = match self.find_archives(dir) {
            Ok(archives) => archives,
            Err(e) => {
                warn!("{}", e);
                return outcome;
            }
        };

        info!("Found {} archives matching '*{}' in {:?}", archives.len(), self.archive_suffix, dir);

        pb.set_length(archives.len() as u64);
        for archive in &archives {
            pb.inc(1);
            outcome.merge(self.read_archive(archive));
        }
        pb.finish_and_clear();

        outcome
    }

    /// Read one archive. Failure to open it counts as a failed archive; member
    /// failures are counted as skipped members.
    pub fn read_archive(&self, path: &Path) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();
        outcome.stats.archives_matched = 1;

        if let Err(e) = self.read_archive_members(path, &mut outcome) {
            warn!("Skipping archive: {}", e);
            outcome.stats.archives_failed = 1;
        }

        outcome
    }

    fn read_archive_members(&self, path: &Path, outcome: &mut IngestOutcome) -> Result<(), IngestError> {
        let file = File::open(path).map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut archive = ZipArchive::new(file).map_err(|source| IngestError::Archive {
            path: path.to_path_buf(),
            source,
        })?;

        for i in 0..archive.len() {
            let mut member = match archive.by_index(i) {
                Ok(member) => member,
                Err(e) => {
                    warn!("Skipping member #{} of {:?}: {}", i, path, e);
                    outcome.stats.members_skipped += 1;
                    continue;
                }
            };

            let name = member.name().to_string();
            if member.is_dir() || !name.to_lowercase().ends_with(&self.member_extension) {
                continue;
            }

            let mut bytes = Vec::new();
            if let Err(e) = member.read_to_end(&mut bytes) {
                let err = IngestError::Member {
                    archive: path.to_path_buf(),
                    member: name,
                    reason: e.to_string(),
                };
                warn!("Skipping member: {}", err);
                outcome.stats.members_skipped += 1;
                continue;
            }

            match self.read_member(&bytes, &name, &mut outcome.stats) {
                Ok(records) => {
                    debug!("Parsed {} rows from {} in {:?}", records.len(), name, path);
                    outcome.records.extend(records);
                    outcome.stats.members_parsed += 1;
                }
                Err(e) => {
                    warn!("Skipping member: {}", e);
                    outcome.stats.members_skipped += 1;
                }
            }
        }

        Ok(())
    }

    /// Decode one member under each configured encoding in turn and parse the
    /// first decoding that yields both required columns.
    pub fn read_member(
        &self,
        bytes: &[u8],
        name: &str,
        stats: &mut IngestStats,
    ) -> Result<Vec<LoadRecord>, IngestError> {
        for &encoding in &self.encodings {
            let Some(text) = decode(bytes, encoding) else {
                debug!("{} is not valid {:?}", name, encoding);
                continue;
            };

            if let Some(records) = self.parse_table(&text, name, stats) {
                return Ok(records);
            }
        }

        Err(IngestError::NoUsableEncoding {
            member: name.to_string(),
            timestamp_column: self.timestamp_column.clone(),
            load_column: self.load_column.clone(),
        })
    }

    /// Returns `None` when the header lacks either required column.
    fn parse_table(&self, text: &str, name: &str, stats: &mut IngestStats) -> Option<Vec<LoadRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers().ok()?.clone();
        let position = |column: &str| headers.iter().position(|h| h.trim() == column);
        let ts_idx = position(self.timestamp_column.as_str())?;
        let load_idx = position(self.load_column.as_str())?;

        let mut records = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("{}: skipping malformed line {}: {}", name, line + 2, e);
                    stats.rows_malformed += 1;
                    continue;
                }
            };

            if record.len() > headers.len() {
                warn!(
                    "{}: skipping line {}: expected {} fields, saw {}",
                    name,
                    line + 2,
                    headers.len(),
                    record.len()
                );
                stats.rows_malformed += 1;
                continue;
            }

            let timestamp = record.get(ts_idx).and_then(parse_timestamp);
            let load = record.get(load_idx).and_then(parse_load);

            match (timestamp, load) {
                (Some(timestamp), Some(load)) => records.push(LoadRecord::new(timestamp, load)),
                _ => stats.rows_dropped += 1,
            }
        }

        Some(records)
    }
}

fn parse_load(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
