use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use peak_detector::{PeakConfig, SmartPeakPipeline};
use std::path::PathBuf;

mod csv_extractor;
mod verify;

#[derive(Parser)]
#[command(name = "nyiso_smart_peaks")]
#[command(about = "Detect smart peak hours from NYISO integrated load archives")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full peak detection pipeline and write the four output tables
    Detect(DetectArgs),

    /// Unpack the CSV members of matching archives into one folder
    ExtractCsv {
        #[arg(long)]
        input_dir: PathBuf,

        #[arg(long, default_value = "csv")]
        output_dir: PathBuf,

        /// Archive file name suffix filter
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Check the structure of previously exported tables
    Verify {
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(Args)]
struct DetectArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the zipped load archives
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory the output CSV files are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Archive file name suffix filter
    #[arg(long)]
    suffix: Option<String>,

    /// Quantile used for the monthly base threshold (0-1)
    #[arg(long)]
    percentile: Option<f64>,

    /// Weight applied to the year-over-year change
    #[arg(long)]
    damping: Option<f64>,

    /// Fixed margin added to trend-adjusted thresholds
    #[arg(long)]
    margin: Option<f64>,

    /// First hour of the peak window (inclusive)
    #[arg(long)]
    start_hour: Option<u32>,

    /// Last hour of the peak window (inclusive)
    #[arg(long)]
    end_hour: Option<u32>,

    /// Sampling interval of the source data in minutes
    #[arg(long)]
    interval_minutes: Option<u32>,

    /// Hide the archive progress bar
    #[arg(long)]
    quiet: bool,
}

impl DetectArgs {
    fn into_config(self) -> Result<PeakConfig> {
        let mut config = match &self.config {
            Some(path) => PeakConfig::from_json_file(path)?,
            None => PeakConfig::default(),
        };

        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(suffix) = self.suffix {
            config.archive_suffix = suffix;
        }
        if let Some(p) = self.percentile {
            config.percentile = p;
        }
        if let Some(d) = self.damping {
            config.trend_damping = d;
        }
        if let Some(m) = self.margin {
            config.margin = m;
        }
        if let Some(h) = self.start_hour {
            config.window.start_hour = h;
        }
        if let Some(h) = self.end_hour {
            config.window.end_hour = h;
        }
        if let Some(n) = self.interval_minutes {
            config.sampling_interval_minutes = n;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run_detect(args: DetectArgs) -> Result<()> {
    let quiet = args.quiet;
    let config = args.into_config()?;

    println!("🚀 NYISO Smart Peak Detection");
    println!("{}", "=".repeat(60));
    println!("Input: {:?} (*{})", config.input_dir, config.archive_suffix);
    println!(
        "Window: {:02}:00-{:02}:59, percentile {}, damping {}, margin {}",
        config.window.start_hour,
        config.window.end_hour,
        config.percentile,
        config.trend_damping,
        config.margin
    );

    let start = std::time::Instant::now();
    let report = SmartPeakPipeline::new(config).with_progress(!quiet).run()?;

    println!();
    print!("{}", report.summary());
    println!("\n✅ Processing complete in {:?}!", start.elapsed());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Detect(args) => run_detect(args)?,
        Command::ExtractCsv {
            input_dir,
            output_dir,
            suffix,
        } => {
            let mut config = PeakConfig::default();
            config.input_dir = input_dir;
            if let Some(suffix) = suffix {
                config.archive_suffix = suffix;
            }
            info!("Extracting CSV members from {:?}", config.input_dir);
            csv_extractor::CsvExtractor::new(&config, output_dir).extract_all()?;
        }
        Command::Verify { output_dir } => {
            let issues = verify::verify_outputs(&output_dir)?;
            if !issues.is_empty() {
                anyhow::bail!("{} issues found in {:?}", issues.len(), output_dir);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn detect_config(args: &[&str]) -> Result<PeakConfig> {
        let cli = Cli::try_parse_from(["nyiso_smart_peaks", "detect"].iter().chain(args).copied())?;
        match cli.command {
            Command::Detect(args) => args.into_config(),
            _ => anyhow::bail!("expected the detect subcommand"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = detect_config(&["--margin", "250", "--start-hour", "14"]).unwrap();

        assert_eq!(config.margin, 250.0);
        assert_eq!(config.window.start_hour, 14);
        assert_eq!(config.window.end_hour, 18);
        assert_eq!(config.percentile, 0.99);
        assert_eq!(config.archive_suffix, "palIntegrated_csv.zip");
    }

    #[test]
    fn test_flags_override_json_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("peaks.json");
        fs::write(
            &path,
            r#"{"percentile": 0.95, "margin": 500, "window": {"start_hour": 12, "end_hour": 20}}"#,
        )
        .unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = detect_config(&["--config", &path, "--margin", "250", "--input-dir", "data"]).unwrap();

        assert_eq!(config.percentile, 0.95);
        assert_eq!(config.margin, 250.0);
        assert_eq!(config.window.start_hour, 12);
        assert_eq!(config.window.end_hour, 20);
        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.sampling_interval_minutes, 60);
    }

    #[test]
    fn test_overrides_are_validated() {
        let err = detect_config(&["--start-hour", "19", "--end-hour", "16"]).unwrap_err();
        assert!(err.to_string().contains("19"));
        assert!(detect_config(&["--percentile", "1.5"]).is_err());
    }
}
