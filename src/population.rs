//! Census table normalization.
//!
//! The census workbook lists every administrative unit of the municipality;
//! only rows labelled with the district marker phrase ("Δημοτική Κοινότητα")
//! followed by an ordinal are kept, each reduced to a district key and its
//! resident population.

use crate::config::CensusSettings;
use crate::constants::district_key;
use crate::error::{PipelineError, Result};
use crate::models::{CensusReport, DistrictPopulation, PopulationTable};
use polars::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Reduces a census frame to one population row per district
#[derive(Debug, Clone)]
pub struct PopulationNormalizer<'a> {
    settings: &'a CensusSettings,
    ordinal: Regex,
}

impl<'a> PopulationNormalizer<'a> {
    pub fn new(settings: &'a CensusSettings) -> Result<Self> {
        let pattern = format!(r"^{}\s*(\d+)", regex::escape(&settings.district_marker));
        let ordinal = Regex::new(&pattern).map_err(|e| {
            PipelineError::configuration(format!("Invalid census district marker: {e}"))
        })?;
        Ok(Self { settings, ordinal })
    }

    /// Ordinal numeral following the marker, if the label carries one
    pub fn ordinal_of(&self, label: &str) -> Option<u32> {
        self.ordinal
            .captures(label)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Resolve a census column by label, falling back to its position
    fn locate_column(&self, frame: &DataFrame, label: &str, index: usize) -> Result<PlSmallStr> {
        let names = frame.get_column_names();

        let by_label = names
            .iter()
            .find(|name| name.as_str() == label)
            .or_else(|| names.iter().find(|name| name.contains(label)));

        match by_label.or_else(|| names.get(index)) {
            Some(name) => Ok((*name).clone()),
            None => Err(PipelineError::CensusColumnMissing {
                column: label.to_string(),
                index,
            }),
        }
    }

    fn text_column(frame: &DataFrame, name: &PlSmallStr) -> Result<Vec<Option<String>>> {
        let column = frame.column(name.as_str())?.cast(&DataType::String)?;
        Ok(column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|cell| cell.map(str::trim).filter(|c| !c.is_empty()).map(String::from))
            .collect())
    }

    pub fn normalize(&self, frame: &DataFrame) -> Result<PopulationTable> {
        let name_column = self.locate_column(
            frame,
            &self.settings.name_column,
            self.settings.name_column_index,
        )?;
        let population_column = self.locate_column(
            frame,
            &self.settings.population_column,
            self.settings.population_column_index,
        )?;
        debug!(
            "Census columns: names in '{}', population in '{}'",
            name_column, population_column
        );

        let names = Self::text_column(frame, &name_column)?;
        let populations = Self::text_column(frame, &population_column)?;

        let mut report = CensusReport::default();
        let mut districts: BTreeMap<u32, DistrictPopulation> = BTreeMap::new();

        for (name, population) in names.into_iter().zip(populations) {
            report.rows_seen += 1;

            let (Some(name), Some(population)) = (name, population) else {
                report.rows_missing_values += 1;
                continue;
            };

            if !name.starts_with(&self.settings.district_marker) {
                report.rows_without_marker += 1;
                continue;
            }

            let Some(ordinal) = self.ordinal_of(&name) else {
                warn!("Census row '{}' has the district marker but no ordinal", name);
                report.rows_without_ordinal += 1;
                continue;
            };

            let population = parse_population(&population);
            if population.is_none() {
                debug!("Census row '{}': population not a whole number", name);
                report.unparseable_population += 1;
            }

            let entry = DistrictPopulation {
                ordinal,
                district: district_key(ordinal),
                population,
            };
            if let Some(previous) = districts.insert(ordinal, entry) {
                warn!(
                    "District {} listed more than once, keeping the later row",
                    previous.district
                );
                report.duplicate_districts += 1;
            }
        }

        report.districts = districts.len();
        info!(
            "Census: {} districts from {} rows ({} without marker, {} without ordinal)",
            report.districts, report.rows_seen, report.rows_without_marker, report.rows_without_ordinal
        );

        Ok(PopulationTable {
            districts: districts.into_values().collect(),
            report,
        })
    }
}

/// Whole non-negative head count; anything else is unknown
pub fn parse_population(text: &str) -> Option<u64> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return None;
    }
    Some(value as u64)
}

/// Normalize a census frame with the given layout
pub fn normalize_population(frame: &DataFrame, settings: &CensusSettings) -> Result<PopulationTable> {
    PopulationNormalizer::new(settings)?.normalize(frame)
}
