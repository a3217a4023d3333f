use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use peak_detector::{ArchiveReader, PeakConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub archives: usize,
    pub archives_failed: usize,
    pub csv_files: usize,
}

/// Unpacks the CSV members of matching load archives into one flat folder.
pub struct CsvExtractor {
    input_dir: PathBuf,
    output_dir: PathBuf,
    member_extension: String,
    reader: ArchiveReader,
}

impl CsvExtractor {
    pub fn new(config: &PeakConfig, output_dir: PathBuf) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            output_dir,
            member_extension: config.member_extension.to_lowercase(),
            reader: ArchiveReader::new(config),
        }
    }

    pub fn extract_all(&self) -> Result<ExtractSummary> {
        println!("Creating output directory: {:?}", self.output_dir);
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", self.output_dir))?;

        let archives = self.reader.find_archives(&self.input_dir)?;
        println!("Found {} archives to extract", archives.len());

        let pb = ProgressBar::new(archives.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }

        let mut summary = ExtractSummary {
            archives: archives.len(),
            ..ExtractSummary::default()
        };

        for archive in &archives {
            pb.inc(1);
            match self.extract_archive(archive) {
                Ok(count) => summary.csv_files += count,
                Err(e) => {
                    warn!("Error extracting {:?}: {:#}", archive, e);
                    summary.archives_failed += 1;
                }
            }
        }
        pb.finish_and_clear();

        println!("\n✅ Extraction complete!");
        println!("Processed {} archives ({} failed)", summary.archives, summary.archives_failed);
        println!("Extracted {} CSV files to {:?}", summary.csv_files, self.output_dir);

        Ok(summary)
    }

    fn extract_archive(&self, zip_path: &Path) -> Result<usize> {
        let file = fs::File::open(zip_path)
            .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path))?;
        let mut archive = ZipArchive::new(file)
            .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path))?;

        let mut extracted = 0;
        for i in 0..archive.len() {
            let mut member = archive.by_index(i)?;
            if member.is_dir() || !member.name().to_lowercase().ends_with(&self.member_extension) {
                continue;
            }

            // Flatten any folder structure inside the archive
            let Some(file_name) = Path::new(member.name()).file_name().map(|n| n.to_owned()) else {
                continue;
            };
            let dest_path = self.output_dir.join(file_name);

            let mut outfile = fs::File::create(&dest_path)
                .with_context(|| format!("Failed to create {:?}", dest_path))?;
            io::copy(&mut member, &mut outfile)?;
            extracted += 1;
        }

        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    #[test]
    fn test_extracts_only_csv_members_of_matching_archives() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let write = |name: &str, members: &[(&str, &str)]| {
            let mut zip = ZipWriter::new(fs::File::create(input.path().join(name)).unwrap());
            for (member, body) in members {
                zip.start_file(*member, FileOptions::default()).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        };
        write(
            "20230701palIntegrated_csv.zip",
            &[("nested/20230701palIntegrated.csv", "Time Stamp,Integrated Load\n"), ("readme.txt", "x")],
        );
        write("20230701isolf_csv.zip", &[("20230701isolf.csv", "a,b\n")]);
        fs::write(input.path().join("20230801palIntegrated_csv.zip"), b"broken").unwrap();

        let config = PeakConfig::new(input.path(), output.path());
        let summary = CsvExtractor::new(&config, output.path().to_path_buf())
            .extract_all()
            .unwrap();

        assert_eq!(summary.archives, 2);
        assert_eq!(summary.archives_failed, 1);
        assert_eq!(summary.csv_files, 1);
        assert!(output.path().join("20230701palIntegrated.csv").exists());
        assert!(!output.path().join("20230701isolf.csv").exists());
    }
}
