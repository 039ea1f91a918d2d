//! Pollutant aggregation.
//!
//! Selects the pollutant columns of a station table, coerces them to
//! floating point and reduces them to overall and per-year means.

use crate::columns::PollutantSelector;
use crate::constants::{STATION_COLUMN, YEAR_COLUMN};
use crate::error::Result;
use crate::models::{MeanScope, PollutantMean, StationTable};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Year of a date cell, `None` when no known layout matches
pub fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.year());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.year())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.year())
        })
}

/// Overall and per-year means of one station
#[derive(Debug, Clone, Default)]
pub struct StationMeans {
    pub overall: Vec<PollutantMean>,
    pub yearly: Vec<PollutantMean>,
}

impl StationMeans {
    /// True when the station had no recognizable pollutant column
    pub fn is_empty(&self) -> bool {
        self.overall.is_empty()
    }
}

/// Reduces station tables to pollutant means
#[derive(Debug, Clone)]
pub struct PollutantAggregator {
    selector: PollutantSelector,
    date_marker: String,
    yearly: bool,
}

impl PollutantAggregator {
    pub fn new(selector: PollutantSelector, date_marker: impl Into<String>) -> Self {
        Self {
            selector,
            date_marker: date_marker.into(),
            yearly: true,
        }
    }

    pub fn with_yearly(mut self, yearly: bool) -> Self {
        self.yearly = yearly;
        self
    }

    /// Pollutant columns of a table as `(label, pollutant name)` pairs
    pub fn pollutant_columns(&self, table: &StationTable) -> Vec<(String, String)> {
        let names = table.frame.get_column_names();
        let labels = names
            .iter()
            .map(|name| name.as_str())
            .filter(|name| *name != STATION_COLUMN && *name != YEAR_COLUMN);
        self.selector.select(labels)
    }

    pub fn aggregate(&self, table: &StationTable) -> Result<StationMeans> {
        let columns = self.pollutant_columns(table);
        if columns.is_empty() {
            return Ok(StationMeans::default());
        }

        let overall = overall_means(table, &columns)?;
        let yearly = if self.yearly {
            yearly_means(table, &columns, &self.date_marker)?
        } else {
            Vec::new()
        };

        Ok(StationMeans { overall, yearly })
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Float view of a column, with unparseable and non-finite cells as nulls
///
/// The non-strict cast reads text such as `NaN` or `inf` as a float, so
/// those cells are nulled here along with everything the cast rejected.
fn coerce_numeric(raw: &Series) -> Result<Float64Chunked> {
    let numeric = raw.cast(&DataType::Float64)?;
    let cleaned: Float64Chunked = numeric
        .f64()?
        .into_iter()
        .map(finite)
        .collect();
    Ok(cleaned.with_name(raw.name().clone()))
}

/// One overall mean per selected column, in column order
///
/// Cells that do not parse as numbers are treated as missing. A column with
/// no numeric cell has no mean.
pub fn overall_means(
    table: &StationTable,
    columns: &[(String, String)],
) -> Result<Vec<PollutantMean>> {
    let mut means = Vec::with_capacity(columns.len());

    for (label, pollutant) in columns {
        let raw = table.frame.column(label.as_str())?.as_materialized_series();
        let numeric = coerce_numeric(raw)?;

        let coerced = numeric.null_count().saturating_sub(raw.null_count());
        if coerced > 0 {
            debug!(
                "{} / {}: {} non-numeric cells treated as missing",
                table.station, label, coerced
            );
        }

        means.push(PollutantMean {
            station: table.station.clone(),
            pollutant: pollutant.clone(),
            value: finite(numeric.mean()),
            scope: MeanScope::Overall,
        });
    }

    Ok(means)
}

/// Per-year means of the selected columns, ordered by year then column
///
/// Rows whose date does not parse are left out. A table without a date
/// column yields nothing.
pub fn yearly_means(
    table: &StationTable,
    columns: &[(String, String)],
    date_marker: &str,
) -> Result<Vec<PollutantMean>> {
    let date_label = table
        .frame
        .get_column_names()
        .into_iter()
        .find(|name| name.as_str() != STATION_COLUMN && name.contains(date_marker))
        .cloned();

    let Some(date_label) = date_label else {
        debug!("{}: no date column, skipping yearly means", table.station);
        return Ok(Vec::new());
    };

    let dates = table.frame.column(&date_label)?.cast(&DataType::String)?;
    let years: Vec<Option<i32>> = dates
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|d| d.and_then(parse_year))
        .collect();

    let unparsed = years.iter().filter(|y| y.is_none()).count();
    if unparsed > 0 {
        debug!(
            "{}: {} rows without a parseable date excluded from yearly means",
            table.station, unparsed
        );
    }

    let mut frame = DataFrame::new(vec![Column::new(YEAR_COLUMN.into(), years)])?;
    for (label, _) in columns {
        let raw = table.frame.column(label.as_str())?.as_materialized_series();
        frame.with_column(coerce_numeric(raw)?.into_series())?;
    }

    let aggs: Vec<Expr> = columns
        .iter()
        .map(|(label, pollutant)| col(label.as_str()).mean().alias(pollutant.as_str()))
        .collect();

    let grouped = frame
        .lazy()
        .filter(col(YEAR_COLUMN).is_not_null())
        .group_by([col(YEAR_COLUMN)])
        .agg(aggs)
        .collect()?;

    let years = grouped.column(YEAR_COLUMN)?.as_materialized_series().i32()?;
    let rows_by_year: BTreeMap<i32, usize> = years
        .into_iter()
        .enumerate()
        .filter_map(|(idx, year)| year.map(|y| (y, idx)))
        .collect();

    let mut means = Vec::with_capacity(rows_by_year.len() * columns.len());
    for (year, idx) in rows_by_year {
        for (_, pollutant) in columns {
            let value = grouped
                .column(pollutant)?
                .as_materialized_series()
                .f64()?
                .get(idx);
            means.push(PollutantMean {
                station: table.station.clone(),
                pollutant: pollutant.clone(),
                value: finite(value),
                scope: MeanScope::Year(year),
            });
        }
    }

    Ok(means)
}
