//! Core data structures shared by the pipeline stages.
//!
//! Stages exchange plain owned values: station tables wrap a polars
//! `DataFrame`, everything downstream of aggregation is typed records.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw worksheet as delivered by a sheet source
///
/// Cells are kept as text; numeric coercion happens in the stages that need it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawSheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Convenience constructor from string slices; empty strings become missing cells
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Measurement table of one monitoring station after label normalization
#[derive(Debug, Clone)]
pub struct StationTable {
    pub station: String,
    pub frame: DataFrame,
}

/// Scope of an aggregated mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MeanScope {
    Overall,
    Year(i32),
}

/// Mean concentration of one pollutant at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantMean {
    pub station: String,
    pub pollutant: String,
    /// `None` when the column held no parseable value
    pub value: Option<f64>,
    pub scope: MeanScope,
}

/// Resident population of one municipal district
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictPopulation {
    pub ordinal: u32,
    pub district: String,
    pub population: Option<u64>,
}

/// Counters describing what the population normalizer kept and dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CensusReport {
    pub rows_seen: usize,
    pub rows_missing_values: usize,
    pub rows_without_marker: usize,
    /// Rows that carried the district marker but no ordinal numeral
    pub rows_without_ordinal: usize,
    pub unparseable_population: usize,
    pub duplicate_districts: usize,
    pub districts: usize,
}

/// Normalized census output, one entry per district ordered by ordinal
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    pub districts: Vec<DistrictPopulation>,
    pub report: CensusReport,
}

impl PopulationTable {
    pub fn population_of(&self, district: &str) -> Option<u64> {
        self.districts
            .iter()
            .find(|d| d.district == district)
            .and_then(|d| d.population)
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

/// Overall mean joined with its district and population
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub station: String,
    pub district: String,
    pub pollutant: String,
    pub mean: Option<f64>,
    pub population: Option<u64>,
    pub per_capita: Option<f64>,
}

/// Outcome of comparing a mean against its regulatory limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceStatus {
    WithinLimit,
    ExceedsLimit,
    UnknownPollutant,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::WithinLimit => "within-limit",
            ComplianceStatus::ExceedsLimit => "exceeds-limit",
            ComplianceStatus::UnknownPollutant => "unknown-pollutant",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merged record annotated with its compliance status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    pub record: MergedRecord,
    pub status: ComplianceStatus,
}

/// Per-year mean with its district attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyRecord {
    pub station: String,
    pub district: String,
    pub year: i32,
    pub pollutant: String,
    pub mean: Option<f64>,
}

/// One row of the station → district mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationDistrict {
    pub station: String,
    pub district: String,
}

/// Processing statistics
#[derive(Debug, Default, Clone)]
pub struct PipelineStats {
    pub stations_loaded: usize,
    /// Stations whose sheet had no recognizable pollutant column
    pub stations_without_pollutants: Vec<String>,
    pub overall_means: usize,
    pub yearly_means: usize,
    pub census: CensusReport,
    pub rows_without_population: usize,
    pub exceedances: usize,
    pub unknown_pollutants: usize,
    pub processing_time_ms: u128,
}
