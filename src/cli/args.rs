//! Command-line argument definitions for the air-quality processor
//!
//! The CLI surface is a single command built with the clap derive API.

use crate::constants::report::{DEFAULT_OUTPUT_DIR, DEFAULT_WORKBOOK_NAME};
use crate::error::{PipelineError, Result};
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

/// CLI arguments for the air-quality report pipeline
///
/// Reads a pollution workbook (one sheet per monitoring station) and a census
/// workbook, and writes a per-district compliance report.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "airquality_processor",
    version,
    about = "Turn municipal air-quality workbooks and census tables into per-district compliance reports",
    long_about = "Aggregates per-station pollutant measurements, joins them with district \
                  populations from a census table, derives per-capita pollution, classifies \
                  every pollutant/district pair against its regulatory limit and writes an \
                  Excel report with charts (optionally CSV as well)."
)]
pub struct Args {
    /// Pollution workbook with one sheet per monitoring station
    #[arg(
        long = "pollution",
        value_name = "FILE",
        required_unless_present = "print_config"
    )]
    pub pollution: Option<PathBuf>,

    /// Census workbook with district populations
    #[arg(
        long = "population",
        value_name = "FILE",
        required_unless_present = "print_config"
    )]
    pub population: Option<PathBuf>,

    /// Directory the report files are written to (created if missing)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// TOML configuration overriding the built-in Thessaloniki defaults
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// File name of the Excel report
    #[arg(long = "workbook-name", value_name = "NAME", default_value = DEFAULT_WORKBOOK_NAME)]
    pub workbook_name: String,

    /// Also export the report tables as CSV
    #[arg(long)]
    pub csv: bool,

    /// Skip the per-year breakdown
    #[arg(long = "no-yearly")]
    pub no_yearly: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long = "print-config")]
    pub print_config: bool,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors, no progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    fn require_file(path: Option<&Path>, what: &str) -> Result<()> {
        let Some(path) = path else {
            return Err(PipelineError::configuration(format!("{what} is required")));
        };
        if !path.is_file() {
            return Err(PipelineError::configuration(format!(
                "{what} does not exist: {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Validate the arguments for a report run
    pub fn validate(&self) -> Result<()> {
        if let Some(config) = &self.config_file {
            Self::require_file(Some(config), "Configuration file")?;
        }

        if self.print_config {
            return Ok(());
        }

        Self::require_file(self.pollution.as_deref(), "Pollution workbook")?;
        Self::require_file(self.population.as_deref(), "Census workbook")?;

        if !self.workbook_name.to_lowercase().ends_with(".xlsx") {
            return Err(PipelineError::configuration(format!(
                "Workbook name must end in .xlsx: {}",
                self.workbook_name
            )));
        }

        Ok(())
    }

    /// Log level for the default filter
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bars are shown unless running quietly
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
