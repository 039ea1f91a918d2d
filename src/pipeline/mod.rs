//! Pipeline driver.
//!
//! Sequences the stages for one report run: station tables are loaded and
//! aggregated, the census is normalized, means are joined with districts and
//! population, and every record is classified against its limit. The run is
//! all-or-nothing: any configuration problem aborts it before a report exists.

use crate::aggregate::PollutantAggregator;
use crate::columns::PollutantSelector;
use crate::compliance::classify_all;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::loader::{SheetSource, StationTableLoader, sheet_to_frame};
use crate::merge::{attach_districts, merge_per_capita};
use crate::models::{
    ClassifiedRecord, ComplianceStatus, PipelineStats, PopulationTable, StationDistrict,
    YearlyRecord,
};
use crate::population::normalize_population;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{debug, info, warn};

#[cfg(test)]
pub mod tests;

/// Everything a report is assembled from
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Station → district rows in station-list order
    pub mapping: Vec<StationDistrict>,
    pub populations: PopulationTable,
    /// Overall means, station-list order then column order
    pub classified: Vec<ClassifiedRecord>,
    /// Per-year means; `None` when yearly aggregation is disabled
    pub yearly: Option<Vec<YearlyRecord>>,
    pub stats: PipelineStats,
}

/// Runs the air-quality pipeline for one configuration
#[derive(Debug, Clone)]
pub struct AirQualityPipeline {
    config: PipelineConfig,
    show_progress: bool,
}

impl AirQualityPipeline {
    /// Create a pipeline; the configuration is validated up front
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            show_progress: false,
        })
    }

    /// Show a per-station progress bar on stderr
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Run every stage against a pollution workbook and a census workbook
    pub fn run<P, C>(&self, pollution: &mut P, census: &mut C) -> Result<PipelineOutput>
    where
        P: SheetSource + ?Sized,
        C: SheetSource + ?Sized,
    {
        let start_time = Instant::now();
        let config = &self.config;
        let mut stats = PipelineStats::default();

        let mapping = config.station_mapping()?;

        // Station tables
        let loader = StationTableLoader::new(&config.columns.label_variants);
        let aggregator = PollutantAggregator::new(
            PollutantSelector::from_settings(&config.columns),
            config.columns.date_column_marker.clone(),
        )
        .with_yearly(config.yearly_means);

        let pb = self.progress_bar(config.stations.len());
        pb.set_message("Aggregating stations");

        let mut overall = Vec::new();
        let mut yearly = Vec::new();
        for station in &config.stations {
            pb.set_message(station.clone());
            let table = loader.load(pollution, station)?;
            stats.stations_loaded += 1;

            let means = aggregator.aggregate(&table)?;
            if means.is_empty() {
                warn!("Station '{}' has no pollutant columns, skipped", station);
                stats.stations_without_pollutants.push(station.clone());
            } else {
                debug!(
                    "Station '{}': {} overall means, {} yearly means",
                    station,
                    means.overall.len(),
                    means.yearly.len()
                );
            }
            overall.extend(means.overall);
            yearly.extend(means.yearly);
            pb.inc(1);
        }
        pb.finish_with_message("Stations aggregated");

        stats.overall_means = overall.len();
        stats.yearly_means = yearly.len();
        info!(
            "Aggregated {} stations: {} overall means, {} yearly means",
            stats.stations_loaded, stats.overall_means, stats.yearly_means
        );

        // Census
        let sheet_name = config.census.sheet.as_deref();
        let census_sheet = census.read_sheet_or_first(sheet_name)?.ok_or_else(|| {
            PipelineError::CensusSheetNotFound {
                sheet: sheet_name.unwrap_or("<first sheet>").to_string(),
            }
        })?;
        let census_frame = sheet_to_frame(&census_sheet, &config.columns.label_variants)?;
        let populations = normalize_population(&census_frame, &config.census)?;
        stats.census = populations.report.clone();

        // Join, per capita, limits
        let merged = merge_per_capita(&overall, &populations, &config.station_districts)?;
        stats.rows_without_population = merged.iter().filter(|r| r.population.is_none()).count();

        let classified = classify_all(merged, &config.limits);
        for record in &classified {
            match record.status {
                ComplianceStatus::ExceedsLimit => stats.exceedances += 1,
                ComplianceStatus::UnknownPollutant => stats.unknown_pollutants += 1,
                ComplianceStatus::WithinLimit => {}
            }
        }

        let yearly = if config.yearly_means {
            Some(attach_districts(&yearly, &config.station_districts)?)
        } else {
            None
        };

        stats.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            "Classified {} records: {} exceed their limit, {} without a limit",
            classified.len(),
            stats.exceedances,
            stats.unknown_pollutants
        );

        Ok(PipelineOutput {
            mapping,
            populations,
            classified,
            yearly,
            stats,
        })
    }
}
