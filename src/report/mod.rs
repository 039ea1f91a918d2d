//! Report assembly.
//!
//! Turns a finished pipeline run into report tables and writes them out as
//! an Excel workbook (with charts) and, optionally, CSV files. Nothing is
//! written unless the whole pipeline succeeded.

pub mod csv;
pub mod xlsx;

use crate::config::LimitTable;
use crate::constants::{columns, report};
use crate::error::Result;
use crate::models::{ClassifiedRecord, StationDistrict, YearlyRecord};
use crate::pipeline::PipelineOutput;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Station → district table in station-list order
pub fn mapping_frame(mapping: &[StationDistrict]) -> Result<DataFrame> {
    let stations: Vec<&str> = mapping.iter().map(|m| m.station.as_str()).collect();
    let districts: Vec<&str> = mapping.iter().map(|m| m.district.as_str()).collect();

    Ok(df!(
        columns::STATION => stations,
        columns::DISTRICT => districts
    )?)
}

/// Overall means with population, per-capita value and compliance status
pub fn results_frame(records: &[ClassifiedRecord]) -> Result<DataFrame> {
    let stations: Vec<&str> = records.iter().map(|r| r.record.station.as_str()).collect();
    let districts: Vec<&str> = records.iter().map(|r| r.record.district.as_str()).collect();
    let pollutants: Vec<&str> = records.iter().map(|r| r.record.pollutant.as_str()).collect();
    let means: Vec<Option<f64>> = records.iter().map(|r| r.record.mean).collect();
    let populations: Vec<Option<u64>> = records.iter().map(|r| r.record.population).collect();
    let per_capita: Vec<Option<f64>> = records.iter().map(|r| r.record.per_capita).collect();
    let statuses: Vec<&str> = records.iter().map(|r| r.status.as_str()).collect();

    Ok(df!(
        columns::STATION => stations,
        columns::DISTRICT => districts,
        columns::POLLUTANT => pollutants,
        columns::MEAN_VALUE => means,
        columns::POPULATION => populations,
        columns::PER_CAPITA => per_capita,
        columns::STATUS => statuses
    )?)
}

pub fn yearly_frame(records: &[YearlyRecord]) -> Result<DataFrame> {
    let stations: Vec<&str> = records.iter().map(|r| r.station.as_str()).collect();
    let districts: Vec<&str> = records.iter().map(|r| r.district.as_str()).collect();
    let years: Vec<i32> = records.iter().map(|r| r.year).collect();
    let pollutants: Vec<&str> = records.iter().map(|r| r.pollutant.as_str()).collect();
    let means: Vec<Option<f64>> = records.iter().map(|r| r.mean).collect();

    Ok(df!(
        columns::STATION => stations,
        columns::DISTRICT => districts,
        columns::YEAR => years,
        columns::POLLUTANT => pollutants,
        columns::MEAN_VALUE => means
    )?)
}

/// Writes the report files of a run into one output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    workbook_name: String,
    csv: bool,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            workbook_name: report::DEFAULT_WORKBOOK_NAME.to_string(),
            csv: false,
        }
    }

    pub fn with_workbook_name(mut self, name: impl Into<String>) -> Self {
        self.workbook_name = name.into();
        self
    }

    /// Also export the report tables as CSV files
    pub fn with_csv(mut self, csv: bool) -> Self {
        self.csv = csv;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.output_dir.join(&self.workbook_name)
    }

    /// Write every report file, returning the paths written
    pub fn write(&self, output: &PipelineOutput, limits: &LimitTable) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::new();

        let workbook = self.workbook_path();
        xlsx::write_workbook(&workbook, output, limits)?;
        info!("Wrote workbook {}", workbook.display());
        written.push(workbook);

        if self.csv {
            written.extend(csv::write_tables(&self.output_dir, output)?);
        }

        Ok(written)
    }
}
