//! Command implementation for the air-quality processor
//!
//! Wires argument parsing, logging, configuration loading, the pipeline and
//! the report writer together, and prints a run summary.

use crate::cli::args::Args;
use crate::config::PipelineConfig;
use crate::models::PipelineStats;
use crate::pipeline::{AirQualityPipeline, PipelineOutput};
use crate::report::ReportWriter;
use crate::workbook::ExcelWorkbook;
use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Run the processor with the given arguments
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args)?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let pipeline = AirQualityPipeline::new(config)
        .context("Invalid pipeline configuration")?
        .with_progress(args.show_progress());

    // validate() guarantees both inputs are present
    let pollution_path = args.pollution.clone().unwrap_or_default();
    let population_path = args.population.clone().unwrap_or_default();

    let mut pollution = ExcelWorkbook::open(&pollution_path)
        .with_context(|| format!("Cannot open pollution workbook {}", pollution_path.display()))?;
    let mut census = ExcelWorkbook::open(&population_path)
        .with_context(|| format!("Cannot open census workbook {}", population_path.display()))?;

    info!("Starting air-quality pipeline");
    let output = pipeline.run(&mut pollution, &mut census)?;

    let writer = ReportWriter::new(&args.output_dir)
        .with_workbook_name(&args.workbook_name)
        .with_csv(args.csv);
    let written = writer
        .write(&output, &pipeline.config().limits)
        .with_context(|| format!("Cannot write report to {}", args.output_dir.display()))?;

    if !args.quiet {
        print_summary(&output, &written);
    }

    Ok(())
}

/// Set up structured logging on stderr
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("airquality_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Built-in defaults, overridden by the config file, then by flags
fn load_configuration(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config_file {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            PipelineConfig::from_toml_file(path)?
        }
        None => PipelineConfig::default(),
    };

    if args.no_yearly {
        config = config.without_yearly_means();
    }

    Ok(config)
}

fn print_summary(output: &PipelineOutput, written: &[PathBuf]) {
    let stats: &PipelineStats = &output.stats;

    println!("\n{}", "Air-quality report complete".bright_green().bold());

    println!("\n{}", "Stations".bright_yellow());
    println!(
        "  {} {}",
        "Loaded:".bright_cyan(),
        stats.stations_loaded.to_string().bright_white().bold()
    );
    if !stats.stations_without_pollutants.is_empty() {
        println!(
            "  {} {}",
            "Without pollutant columns:".bright_cyan(),
            stats.stations_without_pollutants.join(", ").yellow()
        );
    }
    println!(
        "  {} {} overall, {} yearly",
        "Means:".bright_cyan(),
        stats.overall_means.to_string().bright_white().bold(),
        stats.yearly_means.to_string().bright_white().bold()
    );

    println!("\n{}", "Census".bright_yellow());
    println!(
        "  {} {} from {} rows",
        "Districts:".bright_cyan(),
        stats.census.districts.to_string().bright_white().bold(),
        stats.census.rows_seen
    );
    if stats.census.rows_without_ordinal > 0 || stats.census.duplicate_districts > 0 {
        println!(
            "  {} {} marker rows without ordinal, {} duplicate districts",
            "Warnings:".bright_cyan(),
            stats.census.rows_without_ordinal.to_string().yellow(),
            stats.census.duplicate_districts.to_string().yellow()
        );
    }
    if stats.census.unparseable_population > 0 {
        println!(
            "  {} {}",
            "Unusable population values:".bright_cyan(),
            stats.census.unparseable_population.to_string().yellow()
        );
    }

    println!("\n{}", "Compliance".bright_yellow());
    println!(
        "  {} {}",
        "Records:".bright_cyan(),
        output.classified.len().to_string().bright_white().bold()
    );
    let exceedances = stats.exceedances.to_string();
    println!(
        "  {} {}",
        "Exceeding limit:".bright_cyan(),
        if stats.exceedances > 0 {
            exceedances.bright_red().bold()
        } else {
            exceedances.bright_green().bold()
        }
    );
    if stats.unknown_pollutants > 0 {
        println!(
            "  {} {}",
            "Without a limit:".bright_cyan(),
            stats.unknown_pollutants.to_string().yellow()
        );
    }
    if stats.rows_without_population > 0 {
        println!(
            "  {} {}",
            "Without population:".bright_cyan(),
            stats.rows_without_population.to_string().yellow()
        );
    }

    println!("\n{}", "Output".bright_yellow());
    for path in written {
        println!("  {} {}", "Wrote".bright_green(), path.display());
    }
    println!(
        "  {} {} ms",
        "Processing time:".bright_cyan(),
        stats.processing_time_ms
    );
}
