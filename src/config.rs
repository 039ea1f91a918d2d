//! Configuration management and validation.
//!
//! All study-specific knowledge (station list, station → district map,
//! regulatory limits, column heuristics, census layout) lives in an explicit
//! `PipelineConfig` value handed to every stage. The default reproduces the
//! Thessaloniki 2010–2013 study; a TOML file can override any part of it.

use crate::constants::{self, census, limits};
use crate::error::{PipelineError, Result};
use crate::models::StationDistrict;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Unit a limit (and the matching measurements) is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    #[default]
    #[serde(rename = "ug/m3", alias = "μg/m³", alias = "μg/m3")]
    MicrogramsPerCubicMetre,
    #[serde(rename = "mg/m3", alias = "mg/m³")]
    MilligramsPerCubicMetre,
}

impl ConcentrationUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            ConcentrationUnit::MicrogramsPerCubicMetre => "μg/m³",
            ConcentrationUnit::MilligramsPerCubicMetre => "mg/m³",
        }
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Regulatory threshold for one pollutant
///
/// The unit is informational: comparisons assume the measured mean is
/// already on the same scale, nothing is converted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutantLimit {
    pub value: f64,
    #[serde(default)]
    pub unit: ConcentrationUnit,
}

impl PollutantLimit {
    pub fn micrograms(value: f64) -> Self {
        Self {
            value,
            unit: ConcentrationUnit::MicrogramsPerCubicMetre,
        }
    }

    pub fn milligrams(value: f64) -> Self {
        Self {
            value,
            unit: ConcentrationUnit::MilligramsPerCubicMetre,
        }
    }
}

/// Pollutant name → limit, keyed by the exact stripped column label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LimitTable(BTreeMap<String, PollutantLimit>);

impl LimitTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, pollutant: &str) -> Option<&PollutantLimit> {
        self.0.get(pollutant)
    }

    pub fn insert(&mut self, pollutant: impl Into<String>, limit: PollutantLimit) {
        self.0.insert(pollutant.into(), limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PollutantLimit)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LimitTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        for (name, value) in limits::MICROGRAM_LIMITS {
            table.insert(name.to_string(), PollutantLimit::micrograms(*value));
        }
        for (name, value) in limits::MILLIGRAM_LIMITS {
            table.insert(name.to_string(), PollutantLimit::milligrams(*value));
        }
        Self(table)
    }
}

/// Static station → district assignment (many stations may share a district)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationDistrictMap(BTreeMap<String, String>);

impl StationDistrictMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn district_of(&self, station: &str) -> Option<&str> {
        self.0.get(station).map(String::as_str)
    }

    /// District of a station, failing when the station is not mapped
    pub fn require(&self, station: &str) -> Result<&str> {
        self.district_of(station)
            .ok_or_else(|| PipelineError::StationNotMapped {
                station: station.to_string(),
            })
    }

    pub fn insert(&mut self, station: impl Into<String>, district: impl Into<String>) {
        self.0.insert(station.into(), district.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StationDistrictMap {
    fn default() -> Self {
        Self(
            constants::DEFAULT_STATION_DISTRICTS
                .iter()
                .map(|(station, district)| (station.to_string(), district.to_string()))
                .collect(),
        )
    }
}

/// A known typographic variant and its canonical spelling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelVariant {
    pub raw: String,
    pub canonical: String,
}

/// Column-label heuristics for station sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSettings {
    /// Ordered substring patterns selecting pollutant columns
    pub pollutant_patterns: Vec<String>,

    /// Unit tokens stripped from a pollutant label to get its name
    pub unit_tokens: Vec<String>,

    /// Substring identifying the date column
    pub date_column_marker: String,

    /// Variants replaced during label normalization, applied in order
    pub label_variants: Vec<LabelVariant>,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            label_variants: constants::DEFAULT_LABEL_VARIANTS
                .iter()
                .map(|(raw, canonical)| LabelVariant {
                    raw: raw.to_string(),
                    canonical: canonical.to_string(),
                })
                .collect(),
            pollutant_patterns: constants::DEFAULT_POLLUTANT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            unit_tokens: constants::DEFAULT_UNIT_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            date_column_marker: constants::DEFAULT_DATE_COLUMN_MARKER.to_string(),
        }
    }
}

/// Layout of the census workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusSettings {
    /// Sheet to read; the first sheet when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub name_column: String,
    pub population_column: String,
    pub name_column_index: usize,
    pub population_column_index: usize,
    pub district_marker: String,
}

impl Default for CensusSettings {
    fn default() -> Self {
        Self {
            sheet: None,
            name_column: census::NAME_COLUMN.to_string(),
            population_column: census::POPULATION_COLUMN.to_string(),
            name_column_index: census::NAME_COLUMN_INDEX,
            population_column_index: census::POPULATION_COLUMN_INDEX,
            district_marker: census::DISTRICT_MARKER.to_string(),
        }
    }
}

/// Global configuration for an air-quality report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Station sheet names, in report order
    pub stations: Vec<String>,

    /// Compute per-year means in addition to overall means
    pub yearly_means: bool,

    /// Station → district assignment; must cover every station
    pub station_districts: StationDistrictMap,

    /// Regulatory limits per pollutant
    pub limits: LimitTable,

    /// Station-sheet column heuristics
    pub columns: ColumnSettings,

    /// Census-sheet layout
    pub census: CensusSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stations: constants::DEFAULT_STATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            yearly_means: true,
            station_districts: StationDistrictMap::default(),
            limits: LimitTable::default(),
            columns: ColumnSettings::default(),
            census: CensusSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file; keys absent from the file keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Loaded configuration from {}: {} stations, {} limits",
            path.display(),
            config.stations.len(),
            config.limits.len()
        );
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::configuration(format!("Cannot serialize config: {e}")))
    }

    /// Replace the station list
    pub fn with_stations<I, S>(mut self, stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stations = stations.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the station → district map
    pub fn with_station_districts(mut self, map: StationDistrictMap) -> Self {
        self.station_districts = map;
        self
    }

    /// Replace the limit table
    pub fn with_limits(mut self, limits: LimitTable) -> Self {
        self.limits = limits;
        self
    }

    /// Disable per-year aggregation
    pub fn without_yearly_means(mut self) -> Self {
        self.yearly_means = false;
        self
    }

    /// Check the invariants every stage relies on
    pub fn validate(&self) -> Result<()> {
        if self.stations.is_empty() {
            return Err(PipelineError::configuration("Station list is empty"));
        }

        let mut seen = HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.as_str()) {
                return Err(PipelineError::configuration(format!(
                    "Station '{station}' is listed more than once"
                )));
            }
            self.station_districts.require(station)?;
        }

        for (pollutant, limit) in self.limits.iter() {
            if !limit.value.is_finite() || limit.value < 0.0 {
                return Err(PipelineError::configuration(format!(
                    "Limit for {pollutant} must be a non-negative number, got {}",
                    limit.value
                )));
            }
        }

        if self.columns.pollutant_patterns.iter().all(|p| p.trim().is_empty()) {
            return Err(PipelineError::configuration(
                "At least one pollutant column pattern is required",
            ));
        }

        if self.census.name_column_index == self.census.population_column_index {
            return Err(PipelineError::configuration(
                "Census name and population columns must differ",
            ));
        }

        Ok(())
    }

    /// Station → district rows in station-list order
    pub fn station_mapping(&self) -> Result<Vec<StationDistrict>> {
        self.stations
            .iter()
            .map(|station| {
                Ok(StationDistrict {
                    station: station.clone(),
                    district: self.station_districts.require(station)?.to_string(),
                })
            })
            .collect()
    }
}
